//! Extension resolution for module files.
//!
//! Tries different file extensions (.ts, .tsx, .js, ...) and directory index
//! files when resolving a local import specifier to a file.

use std::path::{Path, PathBuf};

use super::Runtime;

/// Supported file extensions for module resolution.
pub const EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];

fn is_file(path: &Path, runtime: &dyn Runtime) -> bool {
    runtime.exists(path)
        && runtime
            .metadata(path)
            .map(|metadata| metadata.is_file)
            .unwrap_or(false)
}

/// Try to resolve a path with various extensions.
fn try_extensions(base_path: &Path, runtime: &dyn Runtime) -> Option<PathBuf> {
    // The path might already carry its extension
    if is_file(base_path, runtime) {
        return Some(base_path.to_path_buf());
    }

    EXTENSIONS.iter().find_map(|ext| {
        let mut with_ext = base_path.as_os_str().to_owned();
        with_ext.push(".");
        with_ext.push(ext);
        let with_ext = PathBuf::from(with_ext);
        is_file(&with_ext, runtime).then_some(with_ext)
    })
}

/// Try to resolve a directory with index files.
fn try_index_files(dir_path: &Path, runtime: &dyn Runtime) -> Option<PathBuf> {
    EXTENSIONS.iter().find_map(|ext| {
        let index = dir_path.join(format!("index.{}", ext));
        is_file(&index, runtime).then_some(index)
    })
}

/// Resolve a local file path with extension and index file fallbacks.
pub fn resolve_with_extensions(candidate: &Path, runtime: &dyn Runtime) -> Option<PathBuf> {
    try_extensions(candidate, runtime).or_else(|| try_index_files(candidate, runtime))
}
