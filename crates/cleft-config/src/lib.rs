//! Configuration for the cleft client/server boundary linter.
//!
//! - [`LintConfig`]: allowlist, tracing settings and rule toggles
//! - [`TableOverrides`]: project-specific additions to the classification tables
//! - [`ConfigDiscovery`]: `cleft.toml` / `package.json#cleft` lookup with
//!   `CLEFT_*` environment overrides

pub mod config;
pub mod discovery;
pub mod error;
pub mod tables;

pub use config::*;
pub use discovery::{ConfigDiscovery, ENV_PREFIX, discover};
pub use error::*;
pub use tables::TableOverrides;
