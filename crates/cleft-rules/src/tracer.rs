//! Transitive dependency tracer.
//!
//! Follows local imports to find client indicators in the files a module
//! depends on. Each file is judged by cheap textual heuristics rather than a
//! full classification pass: the directive token, browser globals and
//! client-only hook names as whole words, and a few signatures of compiled
//! client bundles.
//!
//! Tracing is bounded by a depth budget and by a visited set owned by the
//! top-level call, so cycles terminate and concurrent analyses never share
//! state beyond the cache. Anything that goes wrong while reading or parsing
//! a dependency counts as a client indicator and is not cached.

use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use regex::Regex;
use rustc_hash::FxHashSet;

use crate::cache::{AnalysisCache, FileAnalysisRecord};
use crate::directive::DIRECTIVE;
use crate::imports::ImportMap;
use crate::runtime::{Runtime, is_in_node_modules, is_local_specifier};
use crate::tables::ClassificationTables;
use crate::utils::source_type_for;

/// Signatures left behind by bundlers in client code.
const COMPILED_CLIENT_SIGNATURES: &str = r#"window\s*=\s*this|typeof\s+window\s*[!=]==?\s*['"]undefined['"]|['"]undefined['"]\s*[!=]==?\s*typeof\s+window"#;

/// Textual client-indicator scan.
#[derive(Debug, Clone)]
pub struct Heuristics {
    browser_globals: Option<Regex>,
    client_hooks: Option<Regex>,
    compiled: Option<Regex>,
}

impl Heuristics {
    pub fn new(tables: &ClassificationTables) -> Self {
        Self {
            browser_globals: whole_word_pattern(tables.browser_global_names()),
            client_hooks: whole_word_pattern(tables.client_only_hook_names()),
            compiled: Regex::new(COMPILED_CLIENT_SIGNATURES).ok(),
        }
    }

    pub fn has_client_indicators(&self, content: &str) -> bool {
        [&self.browser_globals, &self.client_hooks, &self.compiled]
            .into_iter()
            .flatten()
            .any(|pattern| pattern.is_match(content))
    }
}

fn whole_word_pattern<'t>(names: impl Iterator<Item = &'t str>) -> Option<Regex> {
    let mut names: Vec<&str> = names.collect();
    if names.is_empty() {
        return None;
    }
    // Deterministic alternation order
    names.sort_unstable();
    let alternation = names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).ok()
}

pub struct Tracer<'t> {
    runtime: &'t dyn Runtime,
    cache: &'t AnalysisCache,
    heuristics: &'t Heuristics,
}

impl<'t> Tracer<'t> {
    pub fn new(
        runtime: &'t dyn Runtime,
        cache: &'t AnalysisCache,
        heuristics: &'t Heuristics,
    ) -> Self {
        Self {
            runtime,
            cache,
            heuristics,
        }
    }

    /// Resolve a local specifier imported by `from` to a traceable file.
    ///
    /// Package specifiers, resolution failures and files inside
    /// `node_modules` all yield `None`.
    pub fn resolve(&self, specifier: &str, from: &Path) -> Option<PathBuf> {
        if !is_local_specifier(specifier) {
            return None;
        }
        match self.runtime.resolve(specifier, from) {
            Ok(path) if !is_in_node_modules(&path) => Some(path),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(%specifier, from = %from.display(), "not tracing: {}", err);
                None
            }
        }
    }

    /// Whether `path`, or anything it imports within `remaining_depth`
    /// levels, has client indicators.
    pub fn trace_module(
        &self,
        path: &Path,
        remaining_depth: u32,
        visited: &mut FxHashSet<PathBuf>,
    ) -> bool {
        if remaining_depth == 0 {
            return false;
        }
        if !visited.insert(path.to_path_buf()) {
            tracing::trace!(path = %path.display(), "already visited");
            return false;
        }

        let modified = match self.runtime.metadata(path) {
            Ok(metadata) => metadata.modified,
            Err(err) => {
                tracing::debug!(path = %path.display(), "treating as client: {}", err);
                return true;
            }
        };

        let cached = modified
            .and_then(|modified| self.cache.get(path, modified))
            .filter(|record| !record.is_error);

        let record = match cached {
            Some(record) => record,
            None => match self.scan(path, modified) {
                Some(record) => record,
                None => return true,
            },
        };

        if record.indicates_client() {
            tracing::debug!(path = %path.display(), "client indicators found");
            return true;
        }

        record.dependencies.iter().any(|specifier| {
            self.resolve(specifier, path).is_some_and(|dependency| {
                self.trace_module(&dependency, remaining_depth - 1, visited)
            })
        })
    }

    /// Read and scan one file. `None` on read or parse failure.
    fn scan(&self, path: &Path, modified: Option<u64>) -> Option<FileAnalysisRecord> {
        let content = match self.runtime.read_file(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::debug!(path = %path.display(), "treating as client: {}", err);
                return None;
            }
        };

        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, &content, source_type_for(path)).parse();
        if parsed.panicked || !parsed.errors.is_empty() {
            tracing::debug!(path = %path.display(), "treating as client: parse errors");
            return None;
        }

        let record = FileAnalysisRecord {
            has_directive: content.contains(DIRECTIVE),
            has_client_indicators: self.heuristics.has_client_indicators(&content),
            is_error: false,
            modified: modified.unwrap_or_default(),
            dependencies: ImportMap::from_program(&parsed.program).dependency_specifiers(),
        };

        // Without a timestamp the record could never be validated
        if modified.is_some() {
            self.cache.set(path, record.clone());
        }
        Some(record)
    }
}
