//! Classification override tables.
//!
//! Projects can extend the built-in hook and module tables with a JSON file:
//!
//! ```json
//! {
//!   "clientModules": ["@acme/charts"],
//!   "serverModules": ["@acme/db"],
//!   "sharedModules": ["@acme/utils"],
//!   "clientOnlyHooks": ["useWindowSize"],
//!   "serverSafeHooks": ["useTranslations"]
//! }
//! ```
//!
//! Every list is optional. A missing or malformed file is not an error: it
//! yields empty lists so the built-in tables apply unchanged.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableOverrides {
    pub client_modules: Vec<String>,
    pub server_modules: Vec<String>,
    pub shared_modules: Vec<String>,
    pub client_only_hooks: Vec<String>,
    pub server_safe_hooks: Vec<String>,
}

impl TableOverrides {
    /// Load overrides from disk, falling back to empty tables.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content).unwrap_or_else(|| {
                tracing::warn!(
                    "Ignoring malformed classification tables at {}",
                    path.display()
                );
                Self::default()
            }),
            Err(err) => {
                tracing::debug!(
                    "No classification tables at {}: {}",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Parse overrides from a JSON string. `None` when the JSON is malformed.
    pub fn from_json(content: &str) -> Option<Self> {
        serde_json::from_str(content).ok()
    }

    pub fn is_empty(&self) -> bool {
        self.client_modules.is_empty()
            && self.server_modules.is_empty()
            && self.shared_modules.is_empty()
            && self.client_only_hooks.is_empty()
            && self.server_safe_hooks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_partial_tables() {
        let tables = TableOverrides::from_json(r#"{ "clientOnlyHooks": ["useWindowSize"] }"#)
            .expect("valid json");
        assert_eq!(tables.client_only_hooks, vec!["useWindowSize".to_string()]);
        assert!(tables.server_modules.is_empty());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let tables = TableOverrides::load(&dir.path().join("nope.json"));
        assert!(tables.is_empty());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tables.json");
        fs::write(&path, "{ clientModules: [").unwrap();
        assert!(TableOverrides::load(&path).is_empty());
    }

    #[test]
    fn wrong_shape_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tables.json");
        fs::write(&path, r#"{ "clientModules": "not-a-list" }"#).unwrap();
        assert!(TableOverrides::load(&path).is_empty());
    }

    #[test]
    fn loads_all_lists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tables.json");
        fs::write(
            &path,
            r#"{
                "clientModules": ["@acme/charts"],
                "serverModules": ["@acme/db"],
                "sharedModules": ["@acme/utils"],
                "clientOnlyHooks": ["useWindowSize"],
                "serverSafeHooks": ["useTranslations"]
            }"#,
        )
        .unwrap();

        let tables = TableOverrides::load(&path);
        assert_eq!(tables.client_modules, vec!["@acme/charts".to_string()]);
        assert_eq!(tables.server_modules, vec!["@acme/db".to_string()]);
        assert_eq!(tables.shared_modules, vec!["@acme/utils".to_string()]);
        assert_eq!(tables.server_safe_hooks, vec!["useTranslations".to_string()]);
    }
}
