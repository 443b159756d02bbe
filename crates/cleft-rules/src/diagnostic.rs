//! Lint diagnostics and per-file reports.
//!
//! [`LintDiagnostic`] implements [`miette::Diagnostic`] so hosts can render
//! findings with miette's report handlers. The source text is not embedded;
//! attach it with `miette::Report::with_source_code` when rendering.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use miette::{Diagnostic, LabeledSpan};
use oxc_span::Span;

use crate::aggregator::Decision;
use crate::classifier::FileRole;
use crate::fix::{TextEdit, apply_edits};
use crate::utils::LineIndex;
use crate::verdict::{Origin, Verdict, VerdictKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleId {
    RequireUseClient,
    NoMixedApis,
    PreferNamedImports,
}

impl RuleId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequireUseClient => "require-use-client",
            Self::NoMixedApis => "no-mixed-apis",
            Self::PreferNamedImports => "prefer-named-imports",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    MissingDirective,
    MisplacedDirective,
    DuplicateDirective,
    UnnecessaryDirective,
    SharedComponent,
    ServerOnlyInClient,
    NodeApiInClient,
    ClientInServer,
    DataFetchPattern,
    PreferNamedImports,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingDirective => "missing-directive",
            Self::MisplacedDirective => "misplaced-directive",
            Self::DuplicateDirective => "duplicate-directive",
            Self::UnnecessaryDirective => "unnecessary-directive",
            Self::SharedComponent => "shared-component",
            Self::ServerOnlyInClient => "server-only-in-client",
            Self::NodeApiInClient => "node-api-in-client",
            Self::ClientInServer => "client-in-server",
            Self::DataFetchPattern => "data-fetch-pattern",
            Self::PreferNamedImports => "prefer-named-imports",
        }
    }

    pub fn rule(self) -> RuleId {
        match self {
            Self::MissingDirective
            | Self::MisplacedDirective
            | Self::DuplicateDirective
            | Self::UnnecessaryDirective
            | Self::SharedComponent => RuleId::RequireUseClient,
            Self::ServerOnlyInClient
            | Self::NodeApiInClient
            | Self::ClientInServer
            | Self::DataFetchPattern => RuleId::NoMixedApis,
            Self::PreferNamedImports => RuleId::PreferNamedImports,
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::MissingDirective
            | Self::MisplacedDirective
            | Self::ServerOnlyInClient
            | Self::NodeApiInClient
            | Self::ClientInServer => Severity::Error,
            Self::DuplicateDirective | Self::DataFetchPattern | Self::PreferNamedImports => {
                Severity::Warning
            }
            Self::UnnecessaryDirective | Self::SharedComponent => Severity::Advice,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::MissingDirective => "needs the client",
            Self::MisplacedDirective => "not the first statement",
            Self::DuplicateDirective => "duplicate",
            Self::UnnecessaryDirective => "unnecessary",
            Self::SharedComponent => "client code reached through imports",
            Self::ServerOnlyInClient => "server-only",
            Self::NodeApiInClient => "Node.js only",
            Self::ClientInServer => "client-only",
            Self::DataFetchPattern => "server data fetching",
            Self::PreferNamedImports => "module object access",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Advice,
    Warning,
    Error,
}

impl From<Severity> for miette::Severity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Advice => miette::Severity::Advice,
            Severity::Warning => miette::Severity::Warning,
            Severity::Error => miette::Severity::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintDiagnostic {
    pub rule: RuleId,
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub help: Option<String>,
    pub span: Span,
    /// 1-based.
    pub line: u32,
    /// 0-based, in characters.
    pub column: u32,
    /// Structured message data (`api`, `source`, `reason`, ...).
    pub data: BTreeMap<String, String>,
}

impl LintDiagnostic {
    pub fn new(
        kind: DiagnosticKind,
        message: impl Into<String>,
        span: Span,
        lines: &LineIndex,
        source: &str,
    ) -> Self {
        let (line, column) = lines.line_column(span.start, source);
        Self {
            rule: kind.rule(),
            kind,
            severity: kind.severity(),
            message: message.into(),
            help: None,
            span,
            line,
            column,
            data: BTreeMap::new(),
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    /// Diagnostic for one classifier verdict.
    pub fn from_verdict(verdict: &Verdict, lines: &LineIndex, source: &str) -> Self {
        let api = verdict.api.as_str();
        let from = verdict.source.as_str();
        let reason = verdict.reason.describe();

        let (kind, message, help) = match verdict.kind {
            VerdictKind::ClientDependency => match verdict.origin {
                Origin::Direct => (
                    DiagnosticKind::MissingDirective,
                    format!("`{api}` ({reason}) requires the \"use client\" directive"),
                    "Add 'use client'; at the top of the file",
                ),
                Origin::Imported => (
                    DiagnosticKind::MissingDirective,
                    format!("Import of '{from}' ({reason}) requires the \"use client\" directive"),
                    "Add 'use client'; at the top of the file, or allowlist the module",
                ),
            },
            // Whole-module imports such as `import 'server-only'`
            VerdictKind::ServerOnlyInClient if api == from => (
                DiagnosticKind::ServerOnlyInClient,
                format!("'{from}' is server-only and cannot be imported by a client component"),
                "Remove the import, or move this module out of the client bundle",
            ),
            VerdictKind::NodeApiInClient if api == from => (
                DiagnosticKind::NodeApiInClient,
                format!("Node.js module '{from}' is not available in the browser"),
                "Move this code into a server component or a route handler",
            ),
            VerdictKind::ServerOnlyInClient => (
                DiagnosticKind::ServerOnlyInClient,
                format!("Server-only API `{api}` from '{from}' cannot be used in a client component"),
                "Move this call into a server component and pass the result down as props",
            ),
            VerdictKind::NodeApiInClient => (
                DiagnosticKind::NodeApiInClient,
                format!("Node.js API `{api}` from '{from}' is not available in the browser"),
                "Move this code into a server component or a route handler",
            ),
            VerdictKind::ClientInServer => (
                DiagnosticKind::ClientInServer,
                format!("Client-only {reason} `{api}` used in a server file"),
                "Move this code into a separate file marked with 'use client'",
            ),
            VerdictKind::DataFetchPattern => (
                DiagnosticKind::DataFetchPattern,
                format!("`fetch` with cache: '{from}' is a server data-fetching pattern"),
                "Fetch this data in a server component",
            ),
        };

        let mut diagnostic = Self::new(kind, message, verdict.span, lines, source)
            .with_help(help)
            .with_data("api", api)
            .with_data("source", from)
            .with_data("reason", reason);
        if let Some(property) = &verdict.property {
            diagnostic = diagnostic.with_data("property", property.as_str());
        }
        if let Some(chain) = &verdict.chain {
            diagnostic = diagnostic.with_data("chain", chain.as_str());
        }
        diagnostic
    }

    /// miette-style code: `cleft::<rule>::<kind>`.
    pub fn error_code(&self) -> String {
        format!("cleft::{}::{}", self.rule, self.kind.as_str())
    }
}

impl fmt::Display for LintDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LintDiagnostic {}

impl Diagnostic for LintDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.error_code()))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(self.severity.into())
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help.clone()) as Box<dyn fmt::Display + 'a>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::new(
            Some(self.kind.label().to_string()),
            self.span.start as usize,
            self.span.size() as usize,
        ))))
    }
}

/// Everything the engine found in one file.
#[derive(Debug, Clone, Default)]
pub struct FileReport {
    pub path: PathBuf,
    pub role: FileRole,
    pub diagnostics: Vec<LintDiagnostic>,
    /// Non-overlapping edits, sorted by position.
    pub edits: Vec<TextEdit>,
    pub decision: Decision,
    /// The file could not be parsed; nothing was analyzed.
    pub parse_failed: bool,
}

impl FileReport {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_fix(&self) -> bool {
        !self.edits.is_empty()
    }

    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &LintDiagnostic> {
        self.diagnostics
            .iter()
            .filter(move |diagnostic| diagnostic.kind == kind)
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics_of(kind).count()
    }

    /// `source` with every edit applied.
    pub fn fixed_source(&self, source: &str) -> String {
        apply_edits(source, &self.edits)
    }
}
