//! Lint engine.
//!
//! [`Linter`] owns everything that outlives a single file: configuration,
//! classification tables, the allowlist, the runtime and the shared
//! [`AnalysisCache`]. Each `lint_*` call builds the per-file pieces (import
//! map, directive state, classifier, tracer) and folds them into a
//! [`FileReport`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cleft_config::{ConfigDiscovery, LintConfig, TableOverrides};
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use rayon::prelude::*;

use crate::aggregator::{
    Aggregator, AnalysisContext, Decision, DirectiveAction, TraceRequest, decide, file_role,
};
use crate::allowlist::Allowlist;
use crate::cache::{AnalysisCache, FileAnalysisRecord};
use crate::classifier::{Classifier, FileRole};
use crate::destructure::{NamedImportFinding, prefer_named_imports};
use crate::diagnostic::{DiagnosticKind, FileReport, LintDiagnostic};
use crate::directive::DirectiveState;
use crate::fix::{TextEdits, add_directive_edit};
use crate::imports::ImportMap;
use crate::runtime::{NativeRuntime, Runtime};
use crate::symbols::{ScopingResolver, SymbolResolver};
use crate::tables::ClassificationTables;
use crate::tracer::{Heuristics, Tracer};
use crate::utils::{LineIndex, source_type_for};
use crate::{Error, Result};

pub struct Linter {
    config: LintConfig,
    tables: ClassificationTables,
    allowlist: Allowlist,
    heuristics: Heuristics,
    cache: Arc<AnalysisCache>,
    runtime: Arc<dyn Runtime>,
}

impl fmt::Debug for Linter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Linter")
            .field("config", &self.config)
            .field("runtime", &self.runtime)
            .field("cached_files", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(LintConfig::default())
    }
}

impl Linter {
    /// A linter on the native filesystem with a fresh cache.
    ///
    /// Override tables named by `config.tables_path` are loaded here; a
    /// missing or malformed file leaves the built-in tables unchanged.
    pub fn new(config: LintConfig) -> Self {
        let overrides = config
            .tables_path
            .as_deref()
            .map(TableOverrides::load)
            .unwrap_or_default();
        let tables = ClassificationTables::with_overrides(&overrides);

        Self {
            allowlist: Allowlist::from_config(&config.allowlist),
            heuristics: Heuristics::new(&tables),
            tables,
            config,
            cache: Arc::new(AnalysisCache::new()),
            runtime: Arc::new(NativeRuntime::new()),
        }
    }

    /// Build from a JSON configuration value (editor or API hosts).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when the value does not deserialize
    /// or names an empty module.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let config = LintConfig::from_value(value)?;
        validate(&config)?;
        Ok(Self::new(config))
    }

    /// Build from `cleft.toml` / `package.json#cleft` under `root`, falling
    /// back to defaults when neither exists.
    pub fn discover(root: impl AsRef<Path>) -> Result<Self> {
        let config = ConfigDiscovery::new(root).load_or_default()?;
        validate(&config)?;
        Ok(Self::new(config))
    }

    pub fn with_runtime(mut self, runtime: Arc<dyn Runtime>) -> Self {
        self.runtime = runtime;
        self
    }

    /// Share a cache between linters (or keep one across runs).
    pub fn with_cache(mut self, cache: Arc<AnalysisCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Merge additional classification overrides.
    pub fn with_tables(mut self, overrides: &TableOverrides) -> Self {
        self.tables.merge(overrides);
        self.heuristics = Heuristics::new(&self.tables);
        self
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    pub fn tables(&self) -> &ClassificationTables {
        &self.tables
    }

    pub fn cache(&self) -> &Arc<AnalysisCache> {
        &self.cache
    }

    /// Lint many files in parallel.
    ///
    /// Each traced import owns its visited set; only the cache is shared.
    pub fn lint_files(&self, paths: &[PathBuf]) -> Vec<Result<FileReport>> {
        paths.par_iter().map(|path| self.lint_file(path)).collect()
    }

    /// Read `path` through the runtime and lint it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] when the file itself cannot be read. Failures
    /// while tracing its dependencies are not errors.
    pub fn lint_file(&self, path: impl AsRef<Path>) -> Result<FileReport> {
        let path = path.as_ref();
        let source = self.runtime.read_file(path).map_err(|source| {
            tracing::warn!("Cannot lint {}: {}", path.display(), source);
            Error::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(self.lint_source(path, &source))
    }

    /// Parse `source` and lint it.
    ///
    /// A file with parse errors yields an empty report with `parse_failed`
    /// set, and its cache entry is marked as an error.
    pub fn lint_source(&self, path: impl AsRef<Path>, source: &str) -> FileReport {
        let path = path.as_ref();
        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, source, source_type_for(path)).parse();

        if parsed.panicked || !parsed.errors.is_empty() {
            tracing::debug!(
                path = %path.display(),
                errors = parsed.errors.len(),
                "skipping file with parse errors"
            );
            self.remember_error(path);
            return FileReport {
                parse_failed: true,
                ..FileReport::empty(path)
            };
        }

        let semantic = SemanticBuilder::new().build(&parsed.program).semantic;
        let resolver = ScopingResolver::new(semantic.scoping());
        let symbols: &dyn SymbolResolver = &resolver;
        self.lint_program(path, source, &parsed.program, Some(symbols))
    }

    /// Lint an already parsed program.
    ///
    /// Without a resolver, identifiers are matched by name only.
    pub fn lint_program(
        &self,
        path: &Path,
        source: &str,
        program: &Program<'_>,
        symbols: Option<&dyn SymbolResolver>,
    ) -> FileReport {
        let rules = self.config.rules;
        let lines = LineIndex::new(source);
        let imports = ImportMap::from_program(program);
        let directive = DirectiveState::scan(program, source);
        let role = file_role(&directive, &imports, &self.tables);

        let context = if rules.require_use_client || rules.no_mixed_apis {
            self.analyze(path, program, &imports, symbols, role)
        } else {
            AnalysisContext::default()
        };
        let decision = decide(
            &context,
            &directive,
            self.config.report_unnecessary_directive,
        );

        let mut diagnostics = Vec::new();
        let mut edits = TextEdits::new();

        if rules.require_use_client {
            self.directive_diagnostics(
                &context,
                &directive,
                &decision,
                &lines,
                source,
                &mut diagnostics,
            );
            if decision.contains(DirectiveAction::AddDirective) {
                edits.push(add_directive_edit(&directive));
            }
        }

        if rules.no_mixed_apis {
            diagnostics.extend(
                context
                    .mixed_api_verdicts()
                    .map(|verdict| LintDiagnostic::from_verdict(verdict, &lines, source)),
            );
        }

        if rules.prefer_named_imports && !self.config.named_import_modules.is_empty() {
            let findings =
                prefer_named_imports(program, source, &self.config.named_import_modules, symbols);
            for finding in findings {
                diagnostics.push(named_import_diagnostic(&finding, &lines, source));
                if let Some(group) = finding.edits {
                    if !edits.push_all(group) {
                        tracing::debug!(
                            module = %finding.module,
                            "named import fix conflicts with another edit"
                        );
                    }
                }
            }
        }

        diagnostics.sort_by_key(|diagnostic| diagnostic.span.start);

        tracing::debug!(
            path = %path.display(),
            ?role,
            diagnostics = diagnostics.len(),
            edits = edits.len(),
            "linted file"
        );

        FileReport {
            path: path.to_path_buf(),
            role,
            diagnostics,
            edits: edits.into_sorted(),
            decision,
            parse_failed: false,
        }
    }

    fn analyze(
        &self,
        path: &Path,
        program: &Program<'_>,
        imports: &ImportMap,
        symbols: Option<&dyn SymbolResolver>,
        role: FileRole,
    ) -> AnalysisContext {
        let classifier = Classifier::new(imports, &self.allowlist, &self.tables, symbols, role);
        let tracer = Tracer::new(self.runtime.as_ref(), &self.cache, &self.heuristics);

        let depth = self.config.effective_trace_depth();
        let trace = (depth > 0).then_some(TraceRequest {
            tracer: &tracer,
            path,
            depth,
        });

        Aggregator::new(&classifier, imports).run(program, trace)
    }

    fn directive_diagnostics(
        &self,
        context: &AnalysisContext,
        directive: &DirectiveState,
        decision: &Decision,
        lines: &LineIndex,
        source: &str,
        diagnostics: &mut Vec<LintDiagnostic>,
    ) {
        if decision.contains(DirectiveAction::AddDirective) {
            diagnostics.extend(
                context
                    .client_dependencies()
                    .map(|verdict| LintDiagnostic::from_verdict(verdict, lines, source)),
            );
        }

        if decision.contains(DirectiveAction::MoveDirective) {
            if let Some(first) = directive.first() {
                diagnostics.push(
                    LintDiagnostic::new(
                        DiagnosticKind::MisplacedDirective,
                        "The \"use client\" directive must be the first statement in the file",
                        first.span,
                        lines,
                        source,
                    )
                    .with_help("Move it above every import and statement; comments may stay above it"),
                );
            }
        }

        if decision.contains(DirectiveAction::RemoveDuplicates) {
            diagnostics.extend(directive.duplicates().iter().map(|duplicate| {
                LintDiagnostic::new(
                    DiagnosticKind::DuplicateDirective,
                    "Duplicate \"use client\" directive",
                    duplicate.span,
                    lines,
                    source,
                )
                .with_help("Only the directive at the top of the file has any effect; remove this one")
            }));
        }

        if decision.contains(DirectiveAction::FlagSharedComponent) {
            if let Some(verdict) = context.client_dependencies().next() {
                diagnostics.push(
                    LintDiagnostic::new(
                        DiagnosticKind::SharedComponent,
                        format!(
                            "This file's exports only reach client code through '{}'",
                            verdict.source
                        ),
                        verdict.span,
                        lines,
                        source,
                    )
                    .with_help("Consider splitting it into a client module and a server module")
                    .with_data("source", verdict.source.as_str()),
                );
            }
        }

        if decision.contains(DirectiveAction::RemoveUnnecessary) {
            if let Some(first) = directive.first() {
                diagnostics.push(
                    LintDiagnostic::new(
                        DiagnosticKind::UnnecessaryDirective,
                        "Nothing in this file needs the \"use client\" directive",
                        first.span,
                        lines,
                        source,
                    )
                    .with_help("Remove it to let the file render on the server"),
                );
            }
        }
    }

    fn remember_error(&self, path: &Path) {
        let Some(modified) = self
            .runtime
            .metadata(path)
            .ok()
            .and_then(|metadata| metadata.modified)
        else {
            return;
        };
        self.cache.set(
            path,
            FileAnalysisRecord {
                is_error: true,
                modified,
                ..FileAnalysisRecord::default()
            },
        );
    }
}

fn named_import_diagnostic(
    finding: &NamedImportFinding,
    lines: &LineIndex,
    source: &str,
) -> LintDiagnostic {
    let module = finding.module.as_str();
    let binding = finding.binding.as_str();

    let diagnostic = if finding.members.is_empty() {
        LintDiagnostic::new(
            DiagnosticKind::PreferNamedImports,
            format!("`{binding}` is imported from '{module}' but never accessed"),
            finding.span,
            lines,
            source,
        )
        .with_help("Remove the import")
    } else {
        let names = finding.members.join(", ");
        LintDiagnostic::new(
            DiagnosticKind::PreferNamedImports,
            format!("Import {{ {names} }} from '{module}' instead of accessing them through `{binding}`"),
            finding.span,
            lines,
            source,
        )
        .with_help(format!("Use named imports and drop the `{binding}.` prefix"))
    };

    diagnostic
        .with_data("module", module)
        .with_data("binding", binding)
        .with_data("members", finding.members.join(","))
        .with_data("fixable", if finding.edits.is_some() { "true" } else { "false" })
}

fn validate(config: &LintConfig) -> Result<()> {
    if config.allowlist.keys().any(|module| module.trim().is_empty()) {
        return Err(Error::InvalidConfig(
            "allowlist contains an empty module name".to_string(),
        ));
    }
    if config
        .named_import_modules
        .iter()
        .any(|module| module.trim().is_empty())
    {
        return Err(Error::InvalidConfig(
            "named_import_modules contains an empty module name".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MemoryRuntime;
    use cleft_config::RuleToggles;
    use serde_json::json;

    fn memory_linter(config: LintConfig, files: &[(&str, &str)]) -> Linter {
        Linter::new(config).with_runtime(Arc::new(MemoryRuntime::with_files(files.iter().copied())))
    }

    #[test]
    fn linter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Linter>();
    }

    #[test]
    fn disabled_rules_produce_nothing() {
        let config = LintConfig {
            rules: RuleToggles {
                require_use_client: false,
                no_mixed_apis: false,
                prefer_named_imports: false,
            },
            ..LintConfig::default()
        };
        let report = Linter::new(config).lint_source(
            "a.tsx",
            "import React from 'react';\nexport const C = () => React.useState(window.x);",
        );
        assert!(report.is_clean());
        assert!(!report.has_fix());
    }

    #[test]
    fn mixed_api_rule_runs_without_directive_rule() {
        let config = LintConfig {
            rules: RuleToggles {
                require_use_client: false,
                ..RuleToggles::default()
            },
            ..LintConfig::default()
        };
        let report = Linter::new(config).lint_source(
            "a.tsx",
            "'use client';\nimport { cookies } from 'next/headers';\nexport const c = () => cookies();",
        );
        assert_eq!(report.count(DiagnosticKind::ServerOnlyInClient), 1);
        assert!(report.edits.is_empty());
    }

    #[test]
    fn directive_and_named_import_fixes_combine() {
        let source = "import React from 'react';\nexport function C() { return React.useState(0); }\n";
        let report = Linter::default().lint_source("c.tsx", source);

        assert_eq!(report.count(DiagnosticKind::MissingDirective), 1);
        assert_eq!(report.count(DiagnosticKind::PreferNamedImports), 1);
        assert_eq!(
            report.fixed_source(source),
            "'use client';\n\nimport { useState } from 'react';\nexport function C() { return useState(0); }\n"
        );
    }

    #[test]
    fn parse_failure_is_reported_and_cached_as_error() {
        let linter = memory_linter(LintConfig::default(), &[("/bad.tsx", "export const = ;")]);
        let report = linter.lint_file("/bad.tsx").unwrap();

        assert!(report.parse_failed);
        assert!(report.is_clean());
        assert_eq!(linter.cache().len(), 1);
    }

    #[test]
    fn unreadable_primary_file_is_an_error() {
        let linter = memory_linter(LintConfig::default(), &[]);
        let err = linter.lint_file("/missing.tsx").unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn tracing_uses_the_runtime() {
        let files = [
            ("/app/page.tsx", "import { Widget } from './widget';\nexport default function P() { return <Widget />; }"),
            ("/app/widget.tsx", "export function Widget() { return <div>{window.innerWidth}</div>; }"),
        ];
        let traced = memory_linter(
            LintConfig {
                trace_dependencies: true,
                ..LintConfig::default()
            },
            &files,
        );
        let report = traced.lint_file("/app/page.tsx").unwrap();
        assert!(report.decision.contains(DirectiveAction::AddDirective));
        assert!(report.decision.contains(DirectiveAction::FlagSharedComponent));
        assert_eq!(report.count(DiagnosticKind::SharedComponent), 1);

        let untraced = memory_linter(LintConfig::default(), &files);
        assert!(untraced.lint_file("/app/page.tsx").unwrap().is_clean());
    }

    #[test]
    fn from_value_validates_module_names() {
        assert!(Linter::from_value(json!({ "allowlist": { "swr": true } })).is_ok());
        assert!(matches!(
            Linter::from_value(json!({ "allowlist": { " ": true } })),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Linter::from_value(json!({ "trace_depth": "deep" })),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn extra_tables_extend_client_hooks() {
        let linter = Linter::default().with_tables(&TableOverrides {
            client_only_hooks: vec!["useWindowSize".into()],
            ..TableOverrides::default()
        });
        let report = linter.lint_source(
            "a.tsx",
            "import { useWindowSize } from '@acme/hooks';\nexport const C = () => useWindowSize();",
        );
        assert_eq!(report.count(DiagnosticKind::MissingDirective), 1);
    }
}
