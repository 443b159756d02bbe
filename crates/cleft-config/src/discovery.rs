//! File-based config discovery
//!
//! Handles finding and loading cleft configuration files from the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml};
use serde_json::Value;

use crate::config::LintConfig;
use crate::error::{ConfigError, Result};

/// Prefix for environment variable overrides (`CLEFT_TRACE_DEPTH=2`,
/// `CLEFT_RULES__NO_MIXED_APIS=false`).
pub const ENV_PREFIX: &str = "CLEFT_";

/// File-based configuration discovery
///
/// Searches for cleft configuration in conventional locations and loads it.
/// Library users should use `LintConfig::from_value()` directly.
///
/// # Example
///
/// ```no_run
/// use cleft_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. TOML config: cleft.toml
    /// 2. package.json (cleft field)
    pub fn find(&self) -> Option<PathBuf> {
        let toml_path = self.root.join("cleft.toml");
        if toml_path.exists() {
            return Some(toml_path);
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.exists() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed.get("cleft").is_some_and(|v| !v.is_null()) {
                        return Some(pkg_path);
                    }
                }
            }
        }

        None
    }

    /// Load config from the discovered file, layered under env overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<LintConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        self.load_from(&path)
    }

    /// Like [`load`](Self::load), but a missing file yields defaults
    /// (still subject to env overrides).
    pub fn load_or_default(&self) -> Result<LintConfig> {
        match self.find() {
            Some(path) => self.load_from(&path),
            None => {
                let config: LintConfig = base_figment().merge(env_provider()).extract()?;
                Ok(config.resolve_paths(&self.root))
            }
        }
    }

    fn load_from(&self, path: &Path) -> Result<LintConfig> {
        tracing::debug!("Loading cleft config from {}", path.display());

        let figment = if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
            let section = self.package_json_section(path)?;
            base_figment().merge(Json::string(&section.to_string()))
        } else {
            base_figment().merge(Toml::file(path))
        };

        let config: LintConfig = figment.merge(env_provider()).extract()?;
        Ok(config.resolve_paths(&self.root))
    }

    fn package_json_section(&self, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;

        let parsed: Value =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
                field: "package.json".to_string(),
                hint: Some(format!("Invalid JSON: {}", e)),
            })?;

        match parsed.get("cleft") {
            Some(section) if !section.is_null() => Ok(section.clone()),
            _ => Err(ConfigError::InvalidValue {
                field: "cleft".to_string(),
                hint: Some("Add a 'cleft' field to your package.json".to_string()),
            }),
        }
    }
}

fn base_figment() -> Figment {
    Figment::from(Serialized::defaults(LintConfig::default()))
}

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).split("__")
}

/// Discover and load config from the current directory, falling back to defaults.
pub fn discover() -> Result<LintConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load_or_default()
}
