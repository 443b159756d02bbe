//! Per-file import bindings.
//!
//! Maps every local name introduced by an `import` declaration back to the
//! module it came from and the export it names. Re-exports are recorded
//! separately: they bind no local name but are still dependencies for
//! transitive tracing.

use oxc_ast::ast::{
    ImportDeclaration, ImportDeclarationSpecifier, ImportOrExportKind, Program, Statement,
};
use oxc_span::{GetSpan, Span};
use rustc_hash::FxHashMap;

/// Exported name recorded for `import * as ns`.
pub const NAMESPACE: &str = "*";

/// Exported name recorded for `import x from`.
pub const DEFAULT_EXPORT: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Value,
    /// `import type` or an inline `type` specifier. No runtime footprint.
    Type,
}

impl ImportKind {
    fn of(kind: ImportOrExportKind) -> Self {
        if kind.is_type() { Self::Type } else { Self::Value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local_name: String,
    pub source_module: String,
    /// Imported export name, [`DEFAULT_EXPORT`] or [`NAMESPACE`].
    pub exported_name: String,
    pub kind: ImportKind,
    pub span: Span,
}

impl ImportBinding {
    pub fn is_namespace(&self) -> bool {
        self.exported_name == NAMESPACE
    }

    pub fn is_default(&self) -> bool {
        self.exported_name == DEFAULT_EXPORT
    }

    /// Default and namespace bindings stand for a whole module object.
    pub fn is_module_object(&self) -> bool {
        self.is_namespace() || self.is_default()
    }

    pub fn is_type(&self) -> bool {
        self.kind == ImportKind::Type
    }
}

/// One `import ... from` declaration, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedModule {
    pub specifier: String,
    pub span: Span,
    /// Exported names of the value bindings the declaration introduces.
    pub value_exports: Vec<String>,
    /// `import 'module'` with no bindings at all.
    pub side_effect_only: bool,
    /// Every binding is type-only.
    pub type_only: bool,
}

/// `export * from` or `export { x } from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReExport {
    pub specifier: String,
    pub span: Span,
    /// `None` for `export *`.
    pub names: Option<Vec<String>>,
    pub type_only: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ImportMap {
    bindings: FxHashMap<String, ImportBinding>,
    modules: Vec<ImportedModule>,
    re_exports: Vec<ReExport>,
}

impl ImportMap {
    /// Collect imports and re-exports from the top-level statements.
    ///
    /// Unusual specifier shapes are skipped rather than reported.
    pub fn from_program(program: &Program<'_>) -> Self {
        let mut map = Self::default();

        for statement in &program.body {
            match statement {
                Statement::ImportDeclaration(decl) => map.add_import(decl),
                Statement::ExportAllDeclaration(decl) => map.re_exports.push(ReExport {
                    specifier: decl.source.value.to_string(),
                    span: decl.span,
                    names: None,
                    type_only: decl.export_kind.is_type(),
                }),
                Statement::ExportNamedDeclaration(decl) => {
                    if let Some(source) = &decl.source {
                        map.re_exports.push(ReExport {
                            specifier: source.value.to_string(),
                            span: decl.span,
                            names: Some(
                                decl.specifiers
                                    .iter()
                                    .map(|spec| spec.local.name().to_string())
                                    .collect(),
                            ),
                            type_only: decl.export_kind.is_type()
                                || (!decl.specifiers.is_empty()
                                    && decl
                                        .specifiers
                                        .iter()
                                        .all(|spec| spec.export_kind.is_type())),
                        });
                    }
                }
                _ => {}
            }
        }

        map
    }

    fn add_import(&mut self, decl: &ImportDeclaration<'_>) {
        let specifier = decl.source.value.to_string();
        let declaration_kind = ImportKind::of(decl.import_kind);
        let mut value_exports = Vec::new();
        let mut binding_count = 0usize;
        let mut type_count = 0usize;

        for spec in decl.specifiers.iter().flatten() {
            let (local, exported, kind) = match spec {
                ImportDeclarationSpecifier::ImportSpecifier(named) => {
                    let kind = if declaration_kind == ImportKind::Type {
                        ImportKind::Type
                    } else {
                        ImportKind::of(named.import_kind)
                    };
                    (&named.local, named.imported.name().to_string(), kind)
                }
                ImportDeclarationSpecifier::ImportDefaultSpecifier(default) => {
                    (&default.local, DEFAULT_EXPORT.to_string(), declaration_kind)
                }
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(namespace) => {
                    (&namespace.local, NAMESPACE.to_string(), declaration_kind)
                }
            };

            binding_count += 1;
            match kind {
                ImportKind::Type => type_count += 1,
                ImportKind::Value => value_exports.push(exported.clone()),
            }

            // Last declaration wins for a repeated local name
            self.bindings.insert(
                local.name.to_string(),
                ImportBinding {
                    local_name: local.name.to_string(),
                    source_module: specifier.clone(),
                    exported_name: exported,
                    kind,
                    span: spec.span(),
                },
            );
        }

        self.modules.push(ImportedModule {
            specifier,
            span: decl.span,
            value_exports,
            side_effect_only: decl.specifiers.is_none(),
            type_only: declaration_kind == ImportKind::Type
                || (binding_count > 0 && type_count == binding_count),
        });
    }

    pub fn get(&self, local_name: &str) -> Option<&ImportBinding> {
        self.bindings.get(local_name)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &ImportBinding> {
        self.bindings.values()
    }

    pub fn modules(&self) -> &[ImportedModule] {
        &self.modules
    }

    pub fn re_exports(&self) -> &[ReExport] {
        &self.re_exports
    }

    /// Whether the file imports `module` purely for its side effects.
    pub fn has_side_effect_import(&self, module: impl Fn(&str) -> bool) -> bool {
        self.modules
            .iter()
            .any(|imported| imported.side_effect_only && module(&imported.specifier))
    }

    /// Runtime dependency specifiers: value imports and value re-exports, in
    /// source order, without duplicates.
    pub fn dependency_specifiers(&self) -> Vec<String> {
        let mut specifiers: Vec<String> = Vec::new();
        let runtime_imports = self
            .modules
            .iter()
            .filter(|imported| !imported.type_only)
            .map(|imported| (imported.span.start, &imported.specifier));
        let runtime_re_exports = self
            .re_exports
            .iter()
            .filter(|re_export| !re_export.type_only)
            .map(|re_export| (re_export.span.start, &re_export.specifier));

        let mut ordered: Vec<_> = runtime_imports.chain(runtime_re_exports).collect();
        ordered.sort_by_key(|(start, _)| *start);

        for (_, specifier) in ordered {
            if !specifiers.contains(specifier) {
                specifiers.push(specifier.clone());
            }
        }
        specifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn imports(source: &str) -> ImportMap {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::tsx()).parse();
        assert!(ret.errors.is_empty(), "{:?}", ret.errors);
        ImportMap::from_program(&ret.program)
    }

    #[test]
    fn named_default_and_namespace_bindings() {
        let map = imports(
            "import React, { useState as useS } from 'react';\nimport * as fs from 'node:fs';",
        );

        let react = map.get("React").unwrap();
        assert_eq!(react.source_module, "react");
        assert!(react.is_default());

        let use_s = map.get("useS").unwrap();
        assert_eq!(use_s.exported_name, "useState");
        assert_eq!(use_s.kind, ImportKind::Value);

        let fs = map.get("fs").unwrap();
        assert!(fs.is_namespace());
        assert_eq!(fs.source_module, "node:fs");
    }

    #[test]
    fn type_only_imports_are_recorded_but_not_values() {
        let map = imports("import type { FC } from 'react';\nimport { type Ref, useRef } from 'react';");

        assert!(map.get("FC").unwrap().is_type());
        assert!(map.get("Ref").unwrap().is_type());
        assert!(!map.get("useRef").unwrap().is_type());
        assert!(map.modules()[0].type_only);
        assert!(!map.modules()[1].type_only);
        assert_eq!(map.modules()[1].value_exports, vec!["useRef".to_string()]);
    }

    #[test]
    fn re_exports_are_dependencies_not_bindings() {
        let map = imports(
            "export * from './a';\nexport { b } from './b';\nexport type { C } from './c';\nimport x from 'pkg';",
        );

        assert!(map.get("b").is_none());
        assert_eq!(map.re_exports().len(), 3);
        assert_eq!(
            map.dependency_specifiers(),
            vec!["./a".to_string(), "./b".to_string(), "pkg".to_string()]
        );
    }

    #[test]
    fn side_effect_imports() {
        let map = imports("import 'server-only';\nimport './globals.css';");
        assert!(map.has_side_effect_import(|m| m == "server-only"));
        assert!(!map.has_side_effect_import(|m| m == "react"));
        assert!(map.modules().iter().all(|m| m.side_effect_only));
    }

    #[test]
    fn last_declaration_wins() {
        let map = imports("import { a } from 'one';\nimport { a } from 'two';");
        assert_eq!(map.get("a").unwrap().source_module, "two");
    }
}
