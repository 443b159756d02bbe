//! Named-import rewriting.
//!
//! `import React from 'react'` followed by `React.useState(...)` hides which
//! hooks a file uses from both readers and the classifier's import table.
//! This rule rewrites such default/namespace imports, and the equivalent
//! `const React = require('react')`, into named imports:
//!
//! ```text
//! import React from 'react';           import { useState } from 'react';
//! React.useState(0);             →     useState(0);
//! let c: React.FC<Props>;              let c: FC<Props>;
//! ```
//!
//! Accesses are rewritten by replacing only the `Binding.member` text, so
//! type arguments and everything around them stay byte-for-byte intact.
//! The rewrite is skipped (the finding is still reported) when the binding
//! is used other than through member access, is assigned through, or when a
//! member name would collide with another binding in the file.

use oxc_ast::ast::{
    BindingIdentifier, Expression, IdentifierReference, ImportDeclaration,
    ImportDeclarationSpecifier, JSXMemberExpression, JSXMemberExpressionObject, MemberExpression,
    Program, SimpleAssignmentTarget, Statement, TSTypeName, VariableDeclaration,
    VariableDeclarationKind,
};
use oxc_ast_visit::{Visit, walk};
use oxc_span::Span;
use rustc_hash::FxHashMap;

use crate::fix::TextEdit;
use crate::symbols::{ReferenceTarget, SymbolResolver};
use crate::utils::end_of_line_after;

/// One default/namespace import of a configured module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImportFinding {
    pub module: String,
    pub binding: String,
    /// The whole import declaration (or `require` statement).
    pub span: Span,
    /// Member names accessed off the binding, sorted.
    pub members: Vec<String>,
    /// `None` when the rewrite would not be safe.
    pub edits: Option<Vec<TextEdit>>,
}

#[derive(Debug)]
enum Form {
    Import,
    Require { keyword: &'static str },
}

#[derive(Debug)]
struct Candidate<'s> {
    module: String,
    binding: String,
    span: Span,
    form: Form,
    /// Raw source text of the module string, quotes included.
    quoted_module: &'s str,
    /// Raw text of existing named specifiers (`x`, `x as y`, `type T`).
    named: Vec<&'s str>,
    /// Names imported under their own name by the same declaration.
    same_name_locals: Vec<String>,
}

pub fn prefer_named_imports(
    program: &Program<'_>,
    source: &str,
    modules: &[String],
    symbols: Option<&dyn SymbolResolver>,
) -> Vec<NamedImportFinding> {
    let candidates: Vec<Candidate<'_>> = program
        .body
        .iter()
        .filter_map(|statement| match statement {
            Statement::ImportDeclaration(decl) => import_candidate(decl, source, modules),
            Statement::VariableDeclaration(decl) => require_candidate(decl, source, modules),
            _ => None,
        })
        .collect();

    if candidates.is_empty() {
        return Vec::new();
    }

    let mut bindings = BindingCounter::default();
    bindings.visit_program(program);

    candidates
        .into_iter()
        .map(|candidate| {
            let expected = match candidate.form {
                Form::Import => ReferenceTarget::Import,
                Form::Require { .. } => ReferenceTarget::Local,
            };
            let mut accesses = AccessCollector {
                binding: &candidate.binding,
                expected,
                symbols,
                accesses: Vec::new(),
                unsafe_use: false,
            };
            accesses.visit_program(program);

            let mut members: Vec<String> = accesses
                .accesses
                .iter()
                .map(|access| access.member.clone())
                .collect();
            members.sort();
            members.dedup();

            let collides = members.iter().any(|member| {
                let own = usize::from(candidate.same_name_locals.contains(member));
                member == "default" || bindings.count(member) > own
            });

            let edits = (!accesses.unsafe_use && !collides)
                .then(|| build_edits(&candidate, &members, &accesses.accesses, source));

            tracing::debug!(
                module = %candidate.module,
                binding = %candidate.binding,
                members = members.len(),
                fixable = edits.is_some(),
                "module object import"
            );

            NamedImportFinding {
                module: candidate.module,
                binding: candidate.binding,
                span: candidate.span,
                members,
                edits,
            }
        })
        .collect()
}

fn import_candidate<'s>(
    decl: &ImportDeclaration<'_>,
    source: &'s str,
    modules: &[String],
) -> Option<Candidate<'s>> {
    if decl.import_kind.is_type() || !modules.iter().any(|m| m == decl.source.value.as_str()) {
        return None;
    }

    let mut binding = None;
    let mut named = Vec::new();
    let mut same_name_locals = Vec::new();

    for spec in decl.specifiers.iter().flatten() {
        match spec {
            ImportDeclarationSpecifier::ImportDefaultSpecifier(default) => {
                if binding.replace(default.local.name.to_string()).is_some() {
                    return None;
                }
            }
            ImportDeclarationSpecifier::ImportNamespaceSpecifier(namespace) => {
                if binding.replace(namespace.local.name.to_string()).is_some() {
                    return None;
                }
            }
            ImportDeclarationSpecifier::ImportSpecifier(specifier) => {
                named.push(specifier.span.source_text(source));
                if specifier.imported.name() == specifier.local.name {
                    same_name_locals.push(specifier.local.name.to_string());
                }
            }
        }
    }

    Some(Candidate {
        module: decl.source.value.to_string(),
        binding: binding?,
        span: decl.span,
        form: Form::Import,
        quoted_module: decl.source.span.source_text(source),
        named,
        same_name_locals,
    })
}

fn require_candidate<'s>(
    decl: &VariableDeclaration<'_>,
    source: &'s str,
    modules: &[String],
) -> Option<Candidate<'s>> {
    if decl.declarations.len() != 1 {
        return None;
    }
    let declarator = &decl.declarations[0];
    let keyword = match decl.kind {
        VariableDeclarationKind::Const => "const",
        VariableDeclarationKind::Let => "let",
        VariableDeclarationKind::Var => "var",
        _ => return None,
    };
    let binding = declarator.id.get_binding_identifier()?;

    let Some(Expression::CallExpression(call)) = &declarator.init else {
        return None;
    };
    let Expression::Identifier(callee) = &call.callee else {
        return None;
    };
    if callee.name != "require" || call.arguments.len() != 1 {
        return None;
    }
    let Some(Expression::StringLiteral(module)) = call.arguments[0].as_expression() else {
        return None;
    };
    if !modules.iter().any(|m| m == module.value.as_str()) {
        return None;
    }

    Some(Candidate {
        module: module.value.to_string(),
        binding: binding.name.to_string(),
        span: decl.span,
        form: Form::Require { keyword },
        quoted_module: module.span.source_text(source),
        named: Vec::new(),
        same_name_locals: Vec::new(),
    })
}

fn build_edits(
    candidate: &Candidate<'_>,
    members: &[String],
    accesses: &[Access],
    source: &str,
) -> Vec<TextEdit> {
    let mut specifiers: Vec<&str> = candidate
        .named
        .iter()
        .copied()
        .chain(members.iter().map(String::as_str))
        .collect();
    specifiers.sort_by_key(|specifier| specifier.to_lowercase());
    specifiers.dedup();

    let mut edits = Vec::with_capacity(accesses.len() + 1);

    if specifiers.is_empty() {
        // Remove the statement together with the rest of its line
        let end = end_of_line_after(source, candidate.span.end as usize)
            .map_or(candidate.span.end, |end| end as u32);
        edits.push(TextEdit::delete(candidate.span.start, end));
    } else {
        let list = specifiers.join(", ");
        let semicolon = if candidate.span.source_text(source).ends_with(';') {
            ";"
        } else {
            ""
        };
        let statement = match candidate.form {
            Form::Import => format!("import {{ {list} }} from {}{semicolon}", candidate.quoted_module),
            Form::Require { keyword } => format!(
                "{keyword} {{ {list} }} = require({}){semicolon}",
                candidate.quoted_module
            ),
        };
        edits.push(TextEdit::replace(candidate.span, statement));
    }

    edits.extend(
        accesses
            .iter()
            .map(|access| TextEdit::replace(access.span, access.member.clone())),
    );
    edits
}

#[derive(Debug)]
struct Access {
    span: Span,
    member: String,
}

struct AccessCollector<'b, 'r> {
    binding: &'b str,
    expected: ReferenceTarget,
    symbols: Option<&'r dyn SymbolResolver>,
    accesses: Vec<Access>,
    unsafe_use: bool,
}

impl AccessCollector<'_, '_> {
    fn is_binding(&self, ident: &IdentifierReference<'_>) -> bool {
        ident.name == self.binding
            && self
                .symbols
                .and_then(|symbols| symbols.resolve(ident))
                .is_none_or(|target| target == self.expected)
    }
}

impl<'a> Visit<'a> for AccessCollector<'_, '_> {
    fn visit_import_declaration(&mut self, _decl: &ImportDeclaration<'a>) {}

    fn visit_member_expression(&mut self, member: &MemberExpression<'a>) {
        if let MemberExpression::StaticMemberExpression(access) = member {
            if let Expression::Identifier(object) = &access.object {
                if self.is_binding(object) {
                    self.accesses.push(Access {
                        span: access.span,
                        member: access.property.name.to_string(),
                    });
                    return;
                }
            }
        }
        walk::walk_member_expression(self, member);
    }

    fn visit_simple_assignment_target(&mut self, target: &SimpleAssignmentTarget<'a>) {
        if let Some(member) = target.as_member_expression() {
            if let Expression::Identifier(object) = member.object() {
                if self.is_binding(object) {
                    self.unsafe_use = true;
                    return;
                }
            }
        }
        walk::walk_simple_assignment_target(self, target);
    }

    fn visit_ts_type_name(&mut self, name: &TSTypeName<'a>) {
        if let TSTypeName::QualifiedName(qualified) = name {
            if let TSTypeName::IdentifierReference(left) = &qualified.left {
                if self.is_binding(left) {
                    self.accesses.push(Access {
                        span: qualified.span,
                        member: qualified.right.name.to_string(),
                    });
                    return;
                }
            }
        }
        walk::walk_ts_type_name(self, name);
    }

    fn visit_jsx_member_expression(&mut self, member: &JSXMemberExpression<'a>) {
        if let JSXMemberExpressionObject::IdentifierReference(object) = &member.object {
            if self.is_binding(object) {
                self.accesses.push(Access {
                    span: member.span,
                    member: member.property.name.to_string(),
                });
                return;
            }
        }
        walk::walk_jsx_member_expression(self, member);
    }

    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        if self.is_binding(ident) {
            self.unsafe_use = true;
        }
    }
}

/// How many times each name is declared anywhere in the file.
#[derive(Default)]
struct BindingCounter {
    counts: FxHashMap<String, usize>,
}

impl BindingCounter {
    fn count(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }
}

impl<'a> Visit<'a> for BindingCounter {
    fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
        *self.counts.entry(ident.name.to_string()).or_default() += 1;
    }
}
