//! # cleft-rules
//!
//! Client/server boundary analysis for React Server Components.
//!
//! A module marked with a `"use client"` directive is bundled for the browser;
//! everything else renders on the server. This crate inspects one file at a
//! time and decides whether the directive is missing, misplaced, duplicated or
//! unnecessary, whether the file mixes server-only and client-only APIs, and
//! which text edits fix what can be fixed automatically.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────┐     ┌──────────────┐
//!   │  ImportMap    │     │ Classification│
//!   │ (imports.rs)  │     │ Tables        │
//!   └──────┬────────┘     └──────┬───────┘
//!          │                     │
//!          ▼                     ▼
//!   ┌──────────────────────────────────┐      ┌───────────────┐
//!   │ Classifier (one node → verdict)  │◄────►│ Tracer + Cache│
//!   └──────────────┬───────────────────┘      └───────────────┘
//!                  │
//!                  ▼
//!   ┌──────────────────────────────────┐
//!   │ Aggregator + DirectiveState      │
//!   └──────────────┬───────────────────┘
//!                  ▼
//!   ┌──────────────────────────────────┐
//!   │ Fix synthesis (TextEdits)        │
//!   └──────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use cleft_rules::{DiagnosticKind, Linter, apply_edits};
//!
//! let linter = Linter::default();
//! let source = "export function C() { document.title = 'x'; return null; }";
//! let report = linter.lint_source("app/c.tsx", source);
//!
//! assert_eq!(report.diagnostics[0].kind, DiagnosticKind::MissingDirective);
//! assert!(apply_edits(source, &report.edits).starts_with("'use client';\n\n"));
//! ```
//!
//! ## Concurrency
//!
//! [`Linter`] is `Send + Sync`. Many files can be linted in parallel (see
//! [`Linter::lint_files`]); the only shared mutable state is the
//! [`AnalysisCache`], and every tracing call owns its own visited set.

pub mod aggregator;
pub mod allowlist;
pub mod cache;
pub mod classifier;
pub mod destructure;
pub mod diagnostic;
pub mod directive;
pub mod engine;
pub mod fix;
pub mod imports;
pub mod runtime;
pub mod symbols;
pub mod tables;
pub mod tracer;
pub mod utils;
pub mod verdict;

pub use aggregator::{Decision, DirectiveAction};
pub use allowlist::Allowlist;
pub use cache::{AnalysisCache, CacheStats, FileAnalysisRecord};
pub use classifier::{ClassifiedNode, Classifier, FileRole};
pub use destructure::{NamedImportFinding, prefer_named_imports};
pub use diagnostic::{DiagnosticKind, FileReport, LintDiagnostic, RuleId, Severity};
pub use directive::{DIRECTIVE, DirectivePosition, DirectiveState};
pub use engine::Linter;
pub use fix::{TextEdit, TextEdits, apply_edits};
pub use imports::{ImportBinding, ImportKind, ImportMap};
pub use runtime::{FileMetadata, MemoryRuntime, NativeRuntime, Runtime, RuntimeError, RuntimeResult};
pub use symbols::{ReferenceTarget, ScopingResolver, SymbolResolver};
pub use tables::ClassificationTables;
pub use tracer::Tracer;
pub use verdict::{Origin, Reason, Verdict, VerdictKind};

pub use cleft_config::{AllowlistValue, LintConfig, RuleToggles, TableOverrides};

// Re-export the OXC types that appear in this crate's public API so hosts can
// hand in their own parsed trees without pinning a second oxc version.
pub mod oxc {
    //! OXC foundation types re-exported for version consistency.
    //!
    //! # Example
    //!
    //! ```
    //! use cleft_rules::oxc::{Allocator, Parser, SourceType};
    //!
    //! let allocator = Allocator::default();
    //! let ret = Parser::new(&allocator, "'use client';", SourceType::tsx()).parse();
    //! assert_eq!(ret.program.directives.len(), 1);
    //! ```

    /// Arena allocator for AST nodes
    pub use oxc_allocator::Allocator;

    /// Span types for source location tracking
    pub use oxc_span::{GetSpan, SourceType, Span};

    /// AST node types
    pub use oxc_ast::ast;

    /// AST visitor trait
    pub use oxc_ast_visit::Visit;

    /// JavaScript/TypeScript parser
    pub use oxc_parser::{Parser, ParserReturn};

    /// Semantic analysis (scopes, symbols, references)
    pub use oxc_semantic::{Scoping, SemanticBuilder, SymbolFlags};
}

/// Error types for cleft operations.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    /// The file asked for could not be read.
    #[error("Failed to read {path}: {source}")]
    #[diagnostic(code(cleft::read))]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(cleft::config))]
    InvalidConfig(String),
}

impl From<cleft_config::ConfigError> for Error {
    fn from(err: cleft_config::ConfigError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

/// Result type alias for cleft operations.
pub type Result<T> = std::result::Result<T, Error>;
