//! Module/export allowlist.
//!
//! An allowlist entry exempts a module from classification:
//!
//! - `true` exempts every export of the module.
//! - a list exempts only the named exports; `"*"` in the list exempts all.
//! - `false`, or no entry at all, exempts nothing.
//!
//! List entries are partial trust: exports of the same module that are not
//! listed are still classified by the built-in tables.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};

use cleft_config::AllowlistValue;

use crate::tables::WILDCARD;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Module,
    Exports(FxHashSet<String>),
}

#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    entries: FxHashMap<String, Entry>,
}

impl Allowlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &BTreeMap<String, AllowlistValue>) -> Self {
        let mut allowlist = Self::new();
        for (module, value) in config {
            match value {
                AllowlistValue::All(true) => allowlist.allow_module(module),
                AllowlistValue::All(false) => {}
                AllowlistValue::Exports(exports) => {
                    for export in exports {
                        allowlist.allow_export(module, export);
                    }
                    // An empty list still records the module, but exempts nothing
                    allowlist
                        .entries
                        .entry(module.clone())
                        .or_insert_with(|| Entry::Exports(FxHashSet::default()));
                }
            }
        }
        allowlist
    }

    /// Exempt every export of `module`.
    pub fn allow_module(&mut self, module: &str) {
        self.entries.insert(module.to_string(), Entry::Module);
    }

    /// Exempt one export of `module`. No-op when the whole module is exempt.
    pub fn allow_export(&mut self, module: &str, export: &str) {
        let entry = self
            .entries
            .entry(module.to_string())
            .or_insert_with(|| Entry::Exports(FxHashSet::default()));
        if let Entry::Exports(exports) = entry {
            exports.insert(export.to_string());
        }
    }

    /// Whether every export of `module` is exempt.
    pub fn is_module_allowed(&self, module: &str) -> bool {
        match self.entries.get(module) {
            Some(Entry::Module) => true,
            Some(Entry::Exports(exports)) => exports.contains(WILDCARD),
            None => false,
        }
    }

    /// Whether `export` of `module` is exempt.
    pub fn is_allowed(&self, module: &str, export: &str) -> bool {
        match self.entries.get(module) {
            Some(Entry::Module) => true,
            Some(Entry::Exports(exports)) => {
                exports.contains(WILDCARD) || exports.contains(export)
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
