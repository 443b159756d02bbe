//! Symbol resolution service.
//!
//! The classifier asks one question of the host: what does this identifier
//! reference actually bind to? Answering it lets `window` inside
//! `function f(window) { ... }` stay quiet, and keeps a local `useState`
//! helper from being mistaken for the imported hook.
//!
//! Hosts without scope information pass no resolver at all; the classifier
//! then falls back to name-only matching.

use oxc_ast::ast::IdentifierReference;
use oxc_semantic::{Scoping, SymbolFlags};

/// What an identifier reference binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTarget {
    /// No declaration in the file: a genuine global.
    Global,
    /// A binding introduced by an `import` declaration.
    Import,
    /// Any other local declaration (variable, parameter, function, class).
    Local,
}

pub trait SymbolResolver {
    /// `None` when the reference cannot be resolved.
    fn resolve(&self, ident: &IdentifierReference<'_>) -> Option<ReferenceTarget>;
}

/// [`SymbolResolver`] backed by `oxc_semantic` scoping data.
#[derive(Debug, Clone, Copy)]
pub struct ScopingResolver<'s> {
    scoping: &'s Scoping,
}

impl<'s> ScopingResolver<'s> {
    pub fn new(scoping: &'s Scoping) -> Self {
        Self { scoping }
    }
}

impl SymbolResolver for ScopingResolver<'_> {
    fn resolve(&self, ident: &IdentifierReference<'_>) -> Option<ReferenceTarget> {
        let reference_id = ident.reference_id.get()?;
        let reference = self.scoping.get_reference(reference_id);

        Some(match reference.symbol_id() {
            None => ReferenceTarget::Global,
            Some(symbol_id) => {
                if self
                    .scoping
                    .symbol_flags(symbol_id)
                    .contains(SymbolFlags::Import)
                {
                    ReferenceTarget::Import
                } else {
                    ReferenceTarget::Local
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_ast_visit::{Visit, walk};
    use oxc_parser::Parser;
    use oxc_semantic::SemanticBuilder;
    use oxc_span::SourceType;

    struct Collect<'r> {
        resolver: &'r dyn SymbolResolver,
        seen: Vec<(String, Option<ReferenceTarget>)>,
    }

    impl<'a> Visit<'a> for Collect<'_> {
        fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
            self.seen
                .push((ident.name.to_string(), self.resolver.resolve(ident)));
            walk::walk_identifier_reference(self, ident);
        }
    }

    fn targets(source: &str) -> Vec<(String, Option<ReferenceTarget>)> {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::tsx()).parse();
        let semantic = SemanticBuilder::new().build(&ret.program).semantic;
        let resolver = ScopingResolver::new(semantic.scoping());
        let mut collect = Collect {
            resolver: &resolver,
            seen: Vec::new(),
        };
        collect.visit_program(&ret.program);
        collect.seen
    }

    #[test]
    fn distinguishes_globals_imports_and_locals() {
        let seen = targets(
            "import { useState } from 'react';\nfunction f(document) { return [window, document, useState]; }",
        );

        assert_eq!(
            seen,
            vec![
                ("window".to_string(), Some(ReferenceTarget::Global)),
                ("document".to_string(), Some(ReferenceTarget::Local)),
                ("useState".to_string(), Some(ReferenceTarget::Import)),
            ]
        );
    }
}
