//! `use client` directive detection.
//!
//! The directive is recognized as a string statement in any quote style
//! (`"use client";`, `'use client';`, or a template literal without
//! substitutions) and as a line or block comment whose whole text is
//! `use client`. The match is case-sensitive.
//!
//! Every occurrence is collected, including ones nested in function bodies.
//! The first occurrence decides placement, and every later occurrence is a
//! duplicate, so a file can be both misplaced and duplicated.

use oxc_ast::ast::{Directive, Expression, ExpressionStatement, Program};
use oxc_ast_visit::{Visit, walk};
use oxc_span::{GetSpan, Span};
use rustc_hash::FxHashSet;

pub const DIRECTIVE: &str = "use client";

pub const SERVER_DIRECTIVE: &str = "use server";

/// Canonical text inserted when the directive is missing.
pub const CANONICAL_DIRECTIVE: &str = "'use client';\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectivePosition {
    /// The very first top-level statement, or a comment before it.
    First,
    /// Anywhere else.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveForm {
    Statement,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveOccurrence {
    pub span: Span,
    pub form: DirectiveForm,
}

#[derive(Debug, Clone, Default)]
pub struct DirectiveState {
    occurrences: Vec<DirectiveOccurrence>,
    position: Option<DirectivePosition>,
    first_statement_start: Option<u32>,
    leading_directive: Option<String>,
}

impl DirectiveState {
    /// Scan statements (top-level and nested) and all comments.
    pub fn scan(program: &Program<'_>, source: &str) -> Self {
        let first_statement_start = program
            .directives
            .first()
            .map(|directive| directive.span.start)
            .or_else(|| program.body.first().map(|statement| statement.span().start));

        let mut collector = Collector::default();
        collector.visit_program(program);
        let mut occurrences = collector.occurrences;

        occurrences.extend(program.comments.iter().filter_map(|comment| {
            is_directive_comment(comment.span.source_text(source)).then_some(DirectiveOccurrence {
                span: comment.span,
                form: DirectiveForm::Comment,
            })
        }));
        occurrences.sort_by_key(|occurrence| occurrence.span.start);

        let position = occurrences.first().map(|first| {
            let is_first = match (first.form, first_statement_start) {
                (_, None) => true,
                (DirectiveForm::Statement, Some(start)) => first.span.start == start,
                (DirectiveForm::Comment, Some(start)) => first.span.end <= start,
            };
            if is_first {
                DirectivePosition::First
            } else {
                DirectivePosition::Other
            }
        });

        Self {
            occurrences,
            position,
            first_statement_start,
            leading_directive: program
                .directives
                .first()
                .map(|directive| directive.expression.value.to_string()),
        }
    }

    pub fn found(&self) -> bool {
        !self.occurrences.is_empty()
    }

    pub fn position(&self) -> Option<DirectivePosition> {
        self.position
    }

    pub fn is_misplaced(&self) -> bool {
        self.position == Some(DirectivePosition::Other)
    }

    pub fn duplicate_count(&self) -> usize {
        self.occurrences.len().saturating_sub(1)
    }

    pub fn is_duplicated(&self) -> bool {
        self.duplicate_count() > 0
    }

    pub fn first(&self) -> Option<&DirectiveOccurrence> {
        self.occurrences.first()
    }

    pub fn duplicates(&self) -> &[DirectiveOccurrence] {
        self.occurrences.get(1..).unwrap_or_default()
    }

    /// Whether the first prologue directive is `text` (e.g. `use server`).
    pub fn leading_directive_is(&self, text: &str) -> bool {
        self.leading_directive.as_deref() == Some(text)
    }

    /// Offset of the first top-level statement, where a missing directive goes.
    pub fn insertion_offset(&self) -> u32 {
        self.first_statement_start.unwrap_or(0)
    }
}

#[derive(Default)]
struct Collector {
    occurrences: Vec<DirectiveOccurrence>,
    // Directive prologue strings are visited as directives; skip them if a
    // statement walk reaches the same span.
    seen: FxHashSet<u32>,
}

impl Collector {
    fn record(&mut self, span: Span) {
        if self.seen.insert(span.start) {
            self.occurrences.push(DirectiveOccurrence {
                span,
                form: DirectiveForm::Statement,
            });
        }
    }
}

impl<'a> Visit<'a> for Collector {
    fn visit_directive(&mut self, directive: &Directive<'a>) {
        if directive.expression.value == DIRECTIVE {
            self.record(directive.span);
        }
    }

    fn visit_expression_statement(&mut self, statement: &ExpressionStatement<'a>) {
        let matches = match &statement.expression {
            Expression::StringLiteral(literal) => literal.value == DIRECTIVE,
            Expression::TemplateLiteral(template) => {
                template.expressions.is_empty()
                    && template.quasis.len() == 1
                    && template.quasis[0].value.raw == DIRECTIVE
            }
            _ => false,
        };
        if matches {
            self.record(statement.span);
        }
        walk::walk_expression_statement(self, statement);
    }
}

/// Comment text (with or without its delimiters) that is exactly the directive.
fn is_directive_comment(text: &str) -> bool {
    let body = if let Some(line) = text.strip_prefix("//") {
        line
    } else if let Some(block) = text.strip_prefix("/*") {
        block.strip_suffix("*/").unwrap_or(block)
    } else {
        text
    };

    let body = body.trim().trim_matches('*').trim();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();
    let unquoted = ['"', '\'', '`']
        .iter()
        .find_map(|quote| {
            body.strip_prefix(*quote)
                .and_then(|rest| rest.strip_suffix(*quote))
        })
        .unwrap_or(body);

    unquoted == DIRECTIVE
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn scan(source: &str) -> DirectiveState {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::tsx()).parse();
        assert!(ret.errors.is_empty(), "{:?}", ret.errors);
        DirectiveState::scan(&ret.program, source)
    }

    #[test]
    fn recognizes_every_quote_and_comment_form() {
        for source in [
            "\"use client\";\nexport const a = 1;",
            "'use client';\nexport const a = 1;",
            "`use client`;\nexport const a = 1;",
            "// use client\nexport const a = 1;",
            "/* use client */\nexport const a = 1;",
        ] {
            let state = scan(source);
            assert!(state.found(), "{source}");
            assert_eq!(state.position(), Some(DirectivePosition::First), "{source}");
            assert!(!state.is_duplicated(), "{source}");
        }
    }

    #[test]
    fn case_sensitive() {
        assert!(!scan("'Use Client';\nexport {};").found());
        assert!(!scan("// use clients\nexport {};").found());
    }

    #[test]
    fn absent_directive() {
        let state = scan("import a from 'a';\nexport default a;");
        assert!(!state.found());
        assert_eq!(state.position(), None);
        assert_eq!(state.insertion_offset(), 0);
    }

    #[test]
    fn directive_after_import_is_misplaced() {
        let state = scan("import a from 'a';\n'use client';\nexport default a;");
        assert!(state.found());
        assert!(state.is_misplaced());
        assert!(!state.is_duplicated());
    }

    #[test]
    fn comment_after_first_statement_is_misplaced() {
        let state = scan("import a from 'a';\n// use client\nexport default a;");
        assert!(state.is_misplaced());
    }

    #[test]
    fn nested_occurrence_is_a_duplicate() {
        let state = scan("'use client';\nexport function f() { 'use client'; return 1; }");
        assert_eq!(state.position(), Some(DirectivePosition::First));
        assert_eq!(state.duplicate_count(), 1);
        assert!(state.duplicates()[0].span.start > 0);
    }

    #[test]
    fn misplaced_and_duplicated_together() {
        let state = scan("import a from 'a';\n'use client';\n'use client';\nexport default a;");
        assert!(state.is_misplaced());
        assert_eq!(state.duplicate_count(), 1);
    }

    #[test]
    fn use_strict_before_directive_misplaces_it() {
        let state = scan("'use strict';\n'use client';\nexport {};");
        assert!(state.is_misplaced());
    }

    #[test]
    fn leading_server_directive() {
        let state = scan("'use server';\nexport async function act() {}");
        assert!(state.leading_directive_is(SERVER_DIRECTIVE));
        assert!(!state.found());
    }

    #[test]
    fn insertion_point_skips_leading_comments() {
        let source = "// license\nimport a from 'a';";
        let state = scan(source);
        assert_eq!(state.insertion_offset() as usize, source.find("import").unwrap());
    }

    #[test]
    fn comment_text_forms() {
        assert!(is_directive_comment("// use client"));
        assert!(is_directive_comment("//use client;"));
        assert!(is_directive_comment("/** use client */"));
        assert!(is_directive_comment("// 'use client'"));
        assert!(is_directive_comment("use client"));
        assert!(!is_directive_comment("// we use client components here"));
    }
}
