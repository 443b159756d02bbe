//! Native Runtime Implementation
//!
//! Wraps `std::fs` for file access and `oxc_resolver` for Node-style module
//! resolution (extensions, index files, `package.json` fields, tsconfig paths).

// NativeRuntime is the one place that touches std::fs
#![allow(clippy::disallowed_methods)]

use std::path::{Path, PathBuf};

use oxc_resolver::{ResolveOptions, Resolver};

use super::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

/// Native filesystem Runtime implementation.
///
/// # Example
///
/// ```rust,no_run
/// use cleft_rules::runtime::{NativeRuntime, Runtime};
/// use std::path::Path;
///
/// let runtime = NativeRuntime::new();
/// let resolved = runtime.resolve("./button", Path::new("app/page.tsx"))?;
/// # Ok::<(), cleft_rules::runtime::RuntimeError>(())
/// ```
pub struct NativeRuntime {
    resolver: Resolver,
}

impl std::fmt::Debug for NativeRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeRuntime").finish_non_exhaustive()
    }
}

impl NativeRuntime {
    pub fn new() -> Self {
        let options = ResolveOptions {
            extensions: [".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs"]
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            condition_names: ["browser", "import", "default"]
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            ..ResolveOptions::default()
        };

        Self {
            resolver: Resolver::new(options),
        }
    }
}

impl Default for NativeRuntime {
    fn default() -> Self {
        Self::new()
    }
}

fn io_error(path: &Path, action: &str, err: std::io::Error) -> RuntimeError {
    if err.kind() == std::io::ErrorKind::NotFound {
        RuntimeError::FileNotFound(path.to_path_buf())
    } else {
        RuntimeError::Io(format!("Failed to {} {}: {}", action, path.display(), err))
    }
}

impl Runtime for NativeRuntime {
    fn read_file(&self, path: &Path) -> RuntimeResult<String> {
        std::fs::read_to_string(path).map_err(|e| io_error(path, "read", e))
    }

    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let metadata = std::fs::metadata(path).map_err(|e| io_error(path, "stat", e))?;

        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64);

        Ok(FileMetadata {
            size: metadata.len(),
            is_dir: metadata.is_dir(),
            is_file: metadata.is_file(),
            modified,
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn resolve(&self, specifier: &str, from: &Path) -> RuntimeResult<PathBuf> {
        let directory = from.parent().unwrap_or(Path::new("."));
        self.resolver
            .resolve(directory, specifier)
            .map(|resolution| resolution.into_path_buf())
            .map_err(|e| RuntimeError::ResolutionFailed {
                specifier: specifier.to_string(),
                from: from.to_path_buf(),
                reason: e.to_string(),
            })
    }
}
