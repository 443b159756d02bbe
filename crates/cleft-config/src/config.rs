//! Top-level lint configuration.
//!
//! `LintConfig` is the whole configuration surface the analysis engine reads:
//! the allowlist, transitive tracing settings, rule toggles and the location of
//! the optional classification override tables. File discovery lives in the
//! `discovery` module; programmatic callers use [`LintConfig::from_value`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result as ConfigResult};

/// Default recursion depth for transitive dependency tracing.
pub const DEFAULT_TRACE_DEPTH: u32 = 3;

/// Modules whose default/namespace imports are rewritten to named imports.
pub const DEFAULT_NAMED_IMPORT_MODULES: &[&str] = &["react"];

/// Allowlist value for one module.
///
/// `true` exempts the whole module, `false` is the same as leaving the module
/// out, and a list exempts only the named exports (`"*"` meaning all of them).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowlistValue {
    All(bool),
    Exports(Vec<String>),
}

/// Rule on/off switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleToggles {
    /// Missing, misplaced and duplicated `use client` directives.
    pub require_use_client: bool,

    /// Server-only APIs in client files and client APIs in server files.
    pub no_mixed_apis: bool,

    /// Rewrite `React.useState` style access into named imports.
    pub prefer_named_imports: bool,
}

impl Default for RuleToggles {
    fn default() -> Self {
        Self {
            require_use_client: true,
            no_mixed_apis: true,
            prefer_named_imports: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    pub allowlist: BTreeMap<String, AllowlistValue>,

    /// Follow local imports and inspect them for client indicators.
    pub trace_dependencies: bool,

    /// Maximum tracing depth. `0` disables tracing even when
    /// `trace_dependencies` is set.
    pub trace_depth: u32,

    /// JSON file with classification override tables.
    pub tables_path: Option<PathBuf>,

    pub rules: RuleToggles,

    pub named_import_modules: Vec<String>,

    /// Report a `use client` directive in a file without any client usage.
    pub report_unnecessary_directive: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            allowlist: BTreeMap::new(),
            trace_dependencies: false,
            trace_depth: DEFAULT_TRACE_DEPTH,
            tables_path: None,
            rules: RuleToggles::default(),
            named_import_modules: DEFAULT_NAMED_IMPORT_MODULES
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
            report_unnecessary_directive: false,
        }
    }
}

impl LintConfig {
    /// Create from `serde_json::Value` (for programmatic config from an editor or API).
    ///
    /// # Example
    ///
    /// ```
    /// use cleft_config::{AllowlistValue, LintConfig};
    /// use serde_json::json;
    ///
    /// let config = LintConfig::from_value(json!({
    ///     "allowlist": { "@acme/ui": true, "swr": ["useSWRConfig"] },
    ///     "trace_dependencies": true,
    ///     "trace_depth": 2
    /// }))
    /// .unwrap();
    ///
    /// assert_eq!(config.trace_depth, 2);
    /// assert_eq!(config.allowlist["@acme/ui"], AllowlistValue::All(true));
    /// ```
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Convert to `serde_json::Value`.
    pub fn to_value(&self) -> ConfigResult<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Effective tracing depth: zero whenever tracing is switched off.
    pub fn effective_trace_depth(&self) -> u32 {
        if self.trace_dependencies {
            self.trace_depth
        } else {
            0
        }
    }

    /// Anchor relative paths at the directory the config was loaded from.
    pub fn resolve_paths(mut self, root: &Path) -> Self {
        if let Some(path) = self.tables_path.take() {
            self.tables_path = Some(if path.is_relative() {
                root.join(path)
            } else {
                path
            });
        }
        self
    }
}
