//! File aggregator.
//!
//! Walks a whole program once, hands every interesting node to the
//! [`Classifier`], and folds the verdicts into an [`AnalysisContext`]. The
//! context and the [`DirectiveState`] then compose into a [`Decision`].
//!
//! Member chains report once, at the outermost member expression: the chain
//! root is remembered and the inner members and the root identifier are not
//! classified again. `typeof x` operands and TypeScript types are not value
//! usages and are skipped.

use std::path::{Path, PathBuf};

use oxc_ast::ast::{
    CallExpression, ExportAllDeclaration, ExportDefaultDeclaration, ExportNamedDeclaration,
    Expression, IdentifierReference, IfStatement, ImportDeclaration, JSXAttribute,
    MemberExpression, Program, TSType, UnaryExpression, UnaryOperator,
};
use oxc_ast_visit::{Visit, walk};
use rustc_hash::FxHashSet;

use crate::classifier::{ClassifiedNode, Classifier, FileRole, member_chain_root};
use crate::directive::{DirectiveState, SERVER_DIRECTIVE};
use crate::imports::ImportMap;
use crate::tables::ClassificationTables;
use crate::tracer::Tracer;
use crate::verdict::Verdict;

/// What the file needs, as decided at the end of the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveAction {
    /// Client usage with no directive. The only action with an automatic fix.
    AddDirective,
    /// The directive is present but not the first statement.
    MoveDirective,
    /// The directive appears more than once.
    RemoveDuplicates,
    /// Exports plus client code reached only through imports: a candidate
    /// for splitting into client and server parts.
    FlagSharedComponent,
    /// The directive is present but nothing in the file needs it.
    RemoveUnnecessary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decision {
    actions: Vec<DirectiveAction>,
}

impl Decision {
    pub fn contains(&self, action: DirectiveAction) -> bool {
        self.actions.contains(&action)
    }

    pub fn actions(&self) -> &[DirectiveAction] {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn push(&mut self, action: DirectiveAction) {
        if !self.contains(action) {
            self.actions.push(action);
        }
    }
}

/// Verdicts and facts accumulated over one walk.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub verdicts: Vec<Verdict>,
    pub has_exports: bool,
}

impl AnalysisContext {
    /// Verdicts the directive would resolve.
    pub fn client_dependencies(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts
            .iter()
            .filter(|verdict| verdict.kind.needs_directive())
    }

    /// Logical errors: reported, never fixed.
    pub fn mixed_api_verdicts(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts
            .iter()
            .filter(|verdict| !verdict.kind.needs_directive())
    }

    /// Client dependencies exist, and every one of them comes from an import.
    pub fn only_indirect_client_dependencies(&self) -> bool {
        let mut dependencies = self.client_dependencies().peekable();
        dependencies.peek().is_some() && dependencies.all(|verdict| !verdict.is_direct())
    }

    fn record(&mut self, verdict: Option<Verdict>) -> bool {
        match verdict {
            Some(verdict) => {
                self.verdicts.push(verdict);
                true
            }
            None => false,
        }
    }
}

/// Decide a file's role from its markers.
pub fn file_role(
    directive: &DirectiveState,
    imports: &ImportMap,
    tables: &ClassificationTables,
) -> FileRole {
    if directive.found() {
        FileRole::Client
    } else if directive.leading_directive_is(SERVER_DIRECTIVE)
        || imports.has_side_effect_import(|module| tables.is_server_marker_module(module))
    {
        FileRole::Server
    } else {
        FileRole::Unmarked
    }
}

/// Compose the end-of-file decision.
pub fn decide(
    context: &AnalysisContext,
    directive: &DirectiveState,
    report_unnecessary: bool,
) -> Decision {
    let mut decision = Decision::default();
    let needs_client = context.client_dependencies().next().is_some();

    if needs_client && !directive.found() {
        decision.push(DirectiveAction::AddDirective);
    }
    if directive.is_misplaced() {
        decision.push(DirectiveAction::MoveDirective);
    }
    if directive.is_duplicated() {
        decision.push(DirectiveAction::RemoveDuplicates);
    }
    if context.has_exports && context.only_indirect_client_dependencies() {
        decision.push(DirectiveAction::FlagSharedComponent);
    }
    if report_unnecessary && directive.found() && !needs_client {
        decision.push(DirectiveAction::RemoveUnnecessary);
    }

    decision
}

/// Transitive tracing inputs for one top-level analysis.
pub struct TraceRequest<'t> {
    pub tracer: &'t Tracer<'t>,
    pub path: &'t Path,
    pub depth: u32,
}

pub struct Aggregator<'c> {
    classifier: &'c Classifier<'c>,
    imports: &'c ImportMap,
    context: AnalysisContext,
    // Span starts of member chain roots already reported
    reported_roots: FxHashSet<u32>,
}

impl<'c> Aggregator<'c> {
    pub fn new(classifier: &'c Classifier<'c>, imports: &'c ImportMap) -> Self {
        Self {
            classifier,
            imports,
            context: AnalysisContext::default(),
            reported_roots: FxHashSet::default(),
        }
    }

    /// Classify imports, trace local dependencies, then walk the program.
    pub fn run(mut self, program: &Program<'_>, trace: Option<TraceRequest<'_>>) -> AnalysisContext {
        for imported in self.imports.modules() {
            let verdict = self.classifier.classify_import(imported);
            self.context.record(verdict);
        }

        let mut bindings: Vec<_> = self.imports.bindings().collect();
        bindings.sort_by_key(|binding| binding.span.start);
        for binding in bindings {
            let verdict = self.classifier.classify_import_binding(binding);
            self.context.record(verdict);
        }

        if let Some(trace) = trace {
            self.trace_dependencies(&trace);
        }

        self.visit_program(program);
        self.context
    }

    fn trace_dependencies(&mut self, trace: &TraceRequest<'_>) {
        let import_map = self.imports;
        let imports = import_map
            .modules()
            .iter()
            .filter(|imported| !imported.type_only)
            .map(|imported| (imported.specifier.as_str(), imported.span));
        let re_exports = import_map
            .re_exports()
            .iter()
            .filter(|re_export| !re_export.type_only)
            .map(|re_export| (re_export.specifier.as_str(), re_export.span));

        let mut traced = FxHashSet::default();

        for (specifier, span) in imports.chain(re_exports) {
            if !traced.insert(specifier) {
                continue;
            }
            let Some(dependency) = trace.tracer.resolve(specifier, trace.path) else {
                continue;
            };
            // Each import gets the full depth budget; the file itself is
            // the only path already visited
            let mut visited = FxHashSet::default();
            visited.insert(PathBuf::from(trace.path));
            if trace
                .tracer
                .trace_module(&dependency, trace.depth, &mut visited)
            {
                let verdict = self.classifier.traced_import(specifier, span);
                self.context.record(verdict);
            }
        }
    }
}

impl<'a> Visit<'a> for Aggregator<'_> {
    fn visit_import_declaration(&mut self, _decl: &ImportDeclaration<'a>) {
        // Bindings only; the import map already covers them
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        self.context.has_exports = true;
        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_export_default_declaration(&mut self, decl: &ExportDefaultDeclaration<'a>) {
        self.context.has_exports = true;
        walk::walk_export_default_declaration(self, decl);
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'a>) {
        self.context.has_exports = true;
        walk::walk_export_all_declaration(self, decl);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        let verdict = self.classifier.classify(ClassifiedNode::Call(call));
        self.context.record(verdict);

        if let Some(options) = self.classifier.fetch_options(call) {
            let verdict = self
                .classifier
                .classify(ClassifiedNode::FetchOptions(options));
            self.context.record(verdict);
        }

        walk::walk_call_expression(self, call);
    }

    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        if self.reported_roots.contains(&ident.span.start) {
            return;
        }
        let verdict = self.classifier.classify(ClassifiedNode::Identifier(ident));
        self.context.record(verdict);
    }

    fn visit_member_expression(&mut self, member: &MemberExpression<'a>) {
        let root = member_chain_root(member);
        let already_reported = root.is_some_and(|root| self.reported_roots.contains(&root.start));

        if !already_reported {
            let verdict = self.classifier.classify(ClassifiedNode::Member(member));
            if self.context.record(verdict) {
                if let Some(root) = root {
                    self.reported_roots.insert(root.start);
                }
            }
        }

        walk::walk_member_expression(self, member);
    }

    fn visit_jsx_attribute(&mut self, attribute: &JSXAttribute<'a>) {
        let verdict = self
            .classifier
            .classify(ClassifiedNode::JsxAttribute(attribute));
        self.context.record(verdict);
        walk::walk_jsx_attribute(self, attribute);
    }

    fn visit_if_statement(&mut self, statement: &IfStatement<'a>) {
        let verdict = self.classifier.classify(ClassifiedNode::If(statement));
        self.context.record(verdict);
        walk::walk_if_statement(self, statement);
    }

    fn visit_unary_expression(&mut self, unary: &UnaryExpression<'a>) {
        // `typeof window` checks for the global without using it
        if unary.operator == UnaryOperator::Typeof
            && matches!(unary.argument.without_parentheses(), Expression::Identifier(_))
        {
            return;
        }
        walk::walk_unary_expression(self, unary);
    }

    fn visit_ts_type(&mut self, _ty: &TSType<'a>) {}
}
