//! Classification verdicts.
//!
//! A verdict is one finding about one node. "No finding" is `None` at the
//! classifier boundary, so an accumulated verdict list only ever holds real
//! findings.

use oxc_span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerdictKind {
    /// Needs a browser: requires the `use client` directive.
    ClientDependency,
    /// A server-only framework API used in a client file.
    ServerOnlyInClient,
    /// A Node runtime API used in a client file.
    NodeApiInClient,
    /// A cached server `fetch` pattern in a client file.
    DataFetchPattern,
    /// A client-only API in a file marked for the server.
    ClientInServer,
}

impl VerdictKind {
    /// Verdicts that the directive fixes, as opposed to logical errors.
    pub fn needs_directive(self) -> bool {
        self == Self::ClientDependency
    }
}

/// Whether the finding is in the file itself or comes from what it imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Direct,
    Imported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    ClientHook,
    /// A hook missing from both hook tables. Treated as client-only.
    UnknownHook,
    BrowserGlobal,
    EventHandler,
    ClientDetection,
    ClientPackage,
    /// A local import whose module (or one of its imports) has client indicators.
    TracedImport,
    ServerOnlyApi,
    NodeApi,
    ForceCacheFetch,
}

impl Reason {
    pub fn describe(self) -> &'static str {
        match self {
            Self::ClientHook => "client-only hook",
            Self::UnknownHook => "unknown hook, conservative",
            Self::BrowserGlobal => "browser global",
            Self::EventHandler => "event handler prop",
            Self::ClientDetection => "client detection condition",
            Self::ClientPackage => "client-only package",
            Self::TracedImport => "imported module uses client APIs",
            Self::ServerOnlyApi => "server-only API",
            Self::NodeApi => "Node.js API",
            Self::ForceCacheFetch => "cached fetch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub kind: VerdictKind,
    pub reason: Reason,
    pub origin: Origin,
    /// The API the finding is about (`useState`, `document`, `cookies`, ...).
    pub api: String,
    /// Where the API comes from: a module specifier, or `global`.
    pub source: String,
    /// First property accessed off `api`, for member chains.
    pub property: Option<String>,
    /// Full member chain text, for chains longer than one level.
    pub chain: Option<String>,
    pub span: Span,
}

impl Verdict {
    pub fn new(
        kind: VerdictKind,
        reason: Reason,
        api: impl Into<String>,
        source: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            kind,
            reason,
            origin: Origin::Direct,
            api: api.into(),
            source: source.into(),
            property: None,
            chain: None,
            span,
        }
    }

    pub fn imported(mut self) -> Self {
        self.origin = Origin::Imported;
        self
    }

    pub fn with_property(mut self, property: Option<String>) -> Self {
        self.property = property;
        self
    }

    pub fn with_chain(mut self, chain: Option<String>) -> Self {
        self.chain = chain;
        self
    }

    pub fn is_direct(&self) -> bool {
        self.origin == Origin::Direct
    }
}
