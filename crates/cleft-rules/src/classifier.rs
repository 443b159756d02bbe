//! Node classifier.
//!
//! Given one syntax node, decide whether it ties the file to the browser, to
//! the server, or to neither. Decision order, first match wins:
//!
//! 1. a call whose callee is (or is imported as) a `useX` hook
//! 2. a bare browser global that is not shadowed by a local declaration
//! 3. a member chain rooted at a browser global or at a default or namespace
//!    import of a server-only or Node-only module
//! 4. an `onX` event-handler JSX attribute
//! 5. an `if` testing `typeof window` against `"undefined"`
//! 6. the options object of a `fetch` call with a cached `cache` mode
//!
//! Named imports of server-only or Node-only APIs, and imports of modules
//! that are restricted as a whole, are reported at the import itself rather
//! than where they are used.
//!
//! Allowlisted (module, export) pairs never produce a verdict.

use oxc_ast::ast::{
    BinaryExpression, CallExpression, Expression, IdentifierReference, IfStatement, JSXAttribute,
    JSXAttributeName, MemberExpression, ObjectExpression, ObjectPropertyKind, UnaryOperator,
};
use oxc_span::{GetSpan, Span};

use crate::allowlist::Allowlist;
use crate::imports::{ImportBinding, ImportMap, ImportedModule};
use crate::symbols::{ReferenceTarget, SymbolResolver};
use crate::tables::{ClassificationTables, HookClass, RestrictedApi, WILDCARD, is_hook_name};
use crate::verdict::{Reason, Verdict, VerdictKind};

/// Where a file runs, as declared by its directives and markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileRole {
    /// Marked with `use client`.
    Client,
    /// Marked with a leading `use server`, or imports `server-only`.
    Server,
    #[default]
    Unmarked,
}

/// The node kinds the classifier understands.
#[derive(Debug, Clone, Copy)]
pub enum ClassifiedNode<'n, 'a> {
    Call(&'n CallExpression<'a>),
    Identifier(&'n IdentifierReference<'a>),
    Member(&'n MemberExpression<'a>),
    JsxAttribute(&'n JSXAttribute<'a>),
    If(&'n IfStatement<'a>),
    /// An object literal passed as the second argument of `fetch`.
    FetchOptions(&'n ObjectExpression<'a>),
}

pub struct Classifier<'c> {
    imports: &'c ImportMap,
    allowlist: &'c Allowlist,
    tables: &'c ClassificationTables,
    symbols: Option<&'c dyn SymbolResolver>,
    role: FileRole,
}

impl<'c> Classifier<'c> {
    pub fn new(
        imports: &'c ImportMap,
        allowlist: &'c Allowlist,
        tables: &'c ClassificationTables,
        symbols: Option<&'c dyn SymbolResolver>,
        role: FileRole,
    ) -> Self {
        Self {
            imports,
            allowlist,
            tables,
            symbols,
            role,
        }
    }

    pub fn role(&self) -> FileRole {
        self.role
    }

    pub fn classify(&self, node: ClassifiedNode<'_, '_>) -> Option<Verdict> {
        let verdict = match node {
            ClassifiedNode::Call(call) => self.classify_call(call),
            ClassifiedNode::Identifier(ident) => self.classify_identifier(ident),
            ClassifiedNode::Member(member) => self.classify_member(member),
            ClassifiedNode::JsxAttribute(attribute) => self.classify_jsx_attribute(attribute),
            ClassifiedNode::If(statement) => self.classify_if(statement),
            ClassifiedNode::FetchOptions(object) => self.classify_fetch_options(object),
        };

        if let Some(verdict) = &verdict {
            tracing::trace!(
                kind = ?verdict.kind,
                api = %verdict.api,
                source = %verdict.source,
                "classified node"
            );
        }
        verdict
    }

    /// A value import of a known client-only package.
    ///
    /// Partially allowlisted modules still count unless every imported export
    /// is on the list.
    ///
    /// In client files, `import 'server-only'` and other side-effect imports
    /// of wholly restricted modules are reported here too.
    pub fn classify_import(&self, imported: &ImportedModule) -> Option<Verdict> {
        if imported.side_effect_only {
            return self.restricted_module(&imported.specifier, imported.span);
        }
        if imported.type_only {
            return None;
        }

        let specifier = imported.specifier.as_str();
        self.tables.client_package(specifier)?;

        if self.allowlist.is_module_allowed(specifier)
            || self.tables.is_shared(specifier)
            || (!imported.value_exports.is_empty()
                && imported
                    .value_exports
                    .iter()
                    .all(|export| self.allowlist.is_allowed(specifier, export)))
        {
            return None;
        }

        Some(
            self.client_signal(Reason::ClientPackage, specifier, specifier, imported.span)
                .imported(),
        )
    }

    /// A value binding of a server-only or Node-only API, at its specifier.
    ///
    /// Default and namespace bindings only report here when their whole
    /// module is restricted. Otherwise each `module.api` access reports.
    pub fn classify_import_binding(&self, binding: &ImportBinding) -> Option<Verdict> {
        if binding.is_type() {
            return None;
        }
        let module = binding.source_module.as_str();
        if binding.is_module_object() {
            return self.restricted_module(module, binding.span);
        }
        self.restricted_use(module, &binding.exported_name, binding.span)
    }

    /// A local import whose module was traced to client indicators.
    pub fn traced_import(&self, specifier: &str, span: Span) -> Option<Verdict> {
        if self.allowlist.is_module_allowed(specifier) || self.tables.is_shared(specifier) {
            return None;
        }
        Some(
            self.client_signal(Reason::TracedImport, specifier, specifier, span)
                .imported(),
        )
    }

    /// The options object of `fetch(url, { ... })`, when `fetch` is the global.
    pub fn fetch_options<'n, 'a>(
        &self,
        call: &'n CallExpression<'a>,
    ) -> Option<&'n ObjectExpression<'a>> {
        let Expression::Identifier(callee) = &call.callee else {
            return None;
        };
        if callee.name != "fetch" || !self.is_global(callee) {
            return None;
        }
        match call.arguments.get(1)?.as_expression()? {
            Expression::ObjectExpression(object) => Some(object),
            _ => None,
        }
    }

    fn target(&self, ident: &IdentifierReference<'_>) -> Option<ReferenceTarget> {
        self.symbols.and_then(|symbols| symbols.resolve(ident))
    }

    /// Without symbol information any name that is not imported counts.
    fn is_global(&self, ident: &IdentifierReference<'_>) -> bool {
        match self.target(ident) {
            Some(target) => target == ReferenceTarget::Global,
            None => self.imports.get(&ident.name).is_none(),
        }
    }

    fn import_binding(&self, ident: &IdentifierReference<'_>) -> Option<&'c ImportBinding> {
        match self.target(ident) {
            Some(ReferenceTarget::Import) | None => self.imports.get(&ident.name),
            Some(_) => None,
        }
    }

    fn client_signal(&self, reason: Reason, api: &str, source: &str, span: Span) -> Verdict {
        let kind = if self.role == FileRole::Server {
            VerdictKind::ClientInServer
        } else {
            VerdictKind::ClientDependency
        };
        Verdict::new(kind, reason, api, source, span)
    }

    /// Server-only and Node-only APIs only matter in client files.
    fn restricted_use(&self, module: &str, api: &str, span: Span) -> Option<Verdict> {
        if self.role != FileRole::Client {
            return None;
        }
        if self.allowlist.is_allowed(module, api) || self.tables.is_shared(module) {
            return None;
        }

        let (kind, reason) = match self.tables.restricted_api(module, api)? {
            RestrictedApi::ServerOnly => (VerdictKind::ServerOnlyInClient, Reason::ServerOnlyApi),
            RestrictedApi::NodeOnly => (VerdictKind::NodeApiInClient, Reason::NodeApi),
        };
        Some(Verdict::new(kind, reason, api, module, span))
    }

    /// A module restricted as a whole, such as `server-only`.
    fn restricted_module(&self, module: &str, span: Span) -> Option<Verdict> {
        if !self.is_wholly_restricted(module) || self.allowlist.is_module_allowed(module) {
            return None;
        }
        self.restricted_use(module, module, span)
    }

    fn is_wholly_restricted(&self, module: &str) -> bool {
        self.tables.restricted_api(module, WILDCARD).is_some()
    }

    fn classify_call(&self, call: &CallExpression<'_>) -> Option<Verdict> {
        // (hook name, module and export for allowlist lookups)
        let (hook, origin): (&str, Option<(&str, &str)>) = match &call.callee {
            Expression::Identifier(ident) => match self.import_binding(ident) {
                Some(binding) if binding.is_type() => return None,
                Some(binding) if binding.is_module_object() => (
                    ident.name.as_str(),
                    Some((binding.source_module.as_str(), binding.exported_name.as_str())),
                ),
                Some(binding) => (
                    binding.exported_name.as_str(),
                    Some((binding.source_module.as_str(), binding.exported_name.as_str())),
                ),
                None => (ident.name.as_str(), None),
            },
            callee => {
                let member = callee.as_member_expression()?;
                let Expression::Identifier(object) = member.object() else {
                    return None;
                };
                let binding = self
                    .import_binding(object)
                    .filter(|binding| binding.is_module_object() && !binding.is_type())?;
                let property = member.static_property_name()?;
                (property, Some((binding.source_module.as_str(), property)))
            }
        };

        if !is_hook_name(hook) {
            return None;
        }

        let source = match origin {
            Some((module, export)) => {
                if self.allowlist.is_allowed(module, export) || self.tables.is_shared(module) {
                    return None;
                }
                module
            }
            None => "local",
        };

        match self.tables.hook_class(hook) {
            HookClass::ClientOnly => {
                Some(self.client_signal(Reason::ClientHook, hook, source, call.span))
            }
            HookClass::ServerSafe => None,
            HookClass::Unknown => {
                Some(self.client_signal(Reason::UnknownHook, hook, source, call.span))
            }
        }
    }

    fn classify_identifier(&self, ident: &IdentifierReference<'_>) -> Option<Verdict> {
        // Restricted imports were reported at the import
        if self.import_binding(ident).is_some() {
            return None;
        }

        (self.tables.is_browser_global(&ident.name) && self.is_global(ident)).then(|| {
            self.client_signal(Reason::BrowserGlobal, &ident.name, "global", ident.span)
        })
    }

    fn classify_member(&self, member: &MemberExpression<'_>) -> Option<Verdict> {
        let chain = MemberChain::of(member)?;
        let first_property = chain.properties.first().copied().flatten();
        let chain_text = (chain.properties.len() > 1).then(|| chain.text());

        if let Some(binding) = self.import_binding(chain.root) {
            let module = binding.source_module.as_str();
            if binding.is_type()
                || !binding.is_module_object()
                || self.is_wholly_restricted(module)
            {
                return None;
            }
            return self
                .restricted_use(module, first_property?, member.span())
                .map(|verdict| verdict.with_chain(chain_text));
        }

        let root = chain.root;
        if self.tables.is_browser_global(&root.name) && self.is_global(root) {
            return Some(
                self.client_signal(Reason::BrowserGlobal, &root.name, "global", member.span())
                    .with_property(first_property.map(str::to_string))
                    .with_chain(chain_text),
            );
        }

        None
    }

    fn classify_jsx_attribute(&self, attribute: &JSXAttribute<'_>) -> Option<Verdict> {
        let JSXAttributeName::Identifier(name) = &attribute.name else {
            return None;
        };
        is_event_handler_name(&name.name).then(|| {
            self.client_signal(Reason::EventHandler, &name.name, "jsx", attribute.span)
        })
    }

    fn classify_if(&self, statement: &IfStatement<'_>) -> Option<Verdict> {
        let Expression::BinaryExpression(test) = statement.test.without_parentheses() else {
            return None;
        };
        is_window_detection(test).then(|| {
            self.client_signal(Reason::ClientDetection, "window", "global", test.span)
        })
    }

    fn classify_fetch_options(&self, object: &ObjectExpression<'_>) -> Option<Verdict> {
        if self.role != FileRole::Client {
            return None;
        }

        object.properties.iter().find_map(|property| {
            let ObjectPropertyKind::ObjectProperty(property) = property else {
                return None;
            };
            if !property.key.static_name().is_some_and(|name| name == "cache") {
                return None;
            }
            let Expression::StringLiteral(mode) = &property.value else {
                return None;
            };
            matches!(mode.value.as_str(), "force-cache" | "only-if-cached").then(|| {
                Verdict::new(
                    VerdictKind::DataFetchPattern,
                    Reason::ForceCacheFetch,
                    "fetch",
                    mode.value.as_str(),
                    property.span,
                )
            })
        })
    }
}

/// `onClick`, `onChange`, ...: `on` followed by an uppercase letter.
pub fn is_event_handler_name(name: &str) -> bool {
    name.strip_prefix("on")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// `typeof window === "undefined"` in either operand order, with any
/// (in)equality operator.
fn is_window_detection(test: &BinaryExpression<'_>) -> bool {
    if !test.operator.is_equality() {
        return false;
    }

    let is_typeof_window = |expr: &Expression<'_>| match expr.without_parentheses() {
        Expression::UnaryExpression(unary) => {
            unary.operator == UnaryOperator::Typeof
                && matches!(
                    unary.argument.without_parentheses(),
                    Expression::Identifier(ident) if ident.name == "window"
                )
        }
        _ => false,
    };
    let is_undefined_literal = |expr: &Expression<'_>| {
        matches!(
            expr.without_parentheses(),
            Expression::StringLiteral(literal) if literal.value == "undefined"
        )
    };

    (is_typeof_window(&test.left) && is_undefined_literal(&test.right))
        || (is_undefined_literal(&test.left) && is_typeof_window(&test.right))
}

/// A member chain such as `window.history.state`, split into its root
/// identifier and its properties, innermost first.
struct MemberChain<'n, 'a> {
    root: &'n IdentifierReference<'a>,
    /// `None` for computed properties with a non-literal key.
    properties: Vec<Option<&'a str>>,
}

impl<'n, 'a> MemberChain<'n, 'a> {
    fn of(member: &'n MemberExpression<'a>) -> Option<Self> {
        let mut properties = vec![member.static_property_name()];
        let mut object = member.object();

        let root = loop {
            if let Expression::Identifier(ident) = object {
                break ident;
            }
            let inner = object.as_member_expression()?;
            properties.push(inner.static_property_name());
            object = inner.object();
        };

        properties.reverse();
        Some(Self { root, properties })
    }

    fn text(&self) -> String {
        let mut text = self.root.name.to_string();
        for property in &self.properties {
            match property {
                Some(name) => {
                    text.push('.');
                    text.push_str(name);
                }
                None => text.push_str("[]"),
            }
        }
        text
    }
}

/// Root identifier span of a member chain, if the chain has one.
pub fn member_chain_root(member: &MemberExpression<'_>) -> Option<Span> {
    MemberChain::of(member).map(|chain| chain.root.span)
}
