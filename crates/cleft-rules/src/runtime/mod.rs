//! Platform runtime abstraction.
//!
//! The `Runtime` trait abstracts the file I/O and module resolution the
//! dependency tracer needs. Analysis of a single file is synchronous, so unlike
//! a bundler runtime these methods block and return directly.

pub mod memory;
pub mod native;
mod resolve;

pub use memory::MemoryRuntime;
pub use native::NativeRuntime;
pub use resolve::{EXTENSIONS, resolve_with_extensions};

use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Module resolution failed
    #[error("Failed to resolve module '{specifier}' from '{from}': {reason}")]
    ResolutionFailed {
        specifier: String,
        from: PathBuf,
        reason: String,
    },

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

/// File metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    /// File size in bytes
    pub size: u64,
    /// Whether this is a directory
    pub is_dir: bool,
    /// Whether this is a file
    pub is_file: bool,
    /// Last modified timestamp (milliseconds since epoch)
    pub modified: Option<u64>,
}

/// Platform runtime trait
///
/// Implementations must be shareable across threads: one runtime instance
/// serves every concurrent file analysis of a host.
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file as UTF-8 text.
    fn read_file(&self, path: &Path) -> RuntimeResult<String>;

    /// Get file metadata.
    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Resolve an import specifier relative to the importing file.
    fn resolve(&self, specifier: &str, from: &Path) -> RuntimeResult<PathBuf>;
}

/// Whether a specifier names a file in the project rather than a package.
pub fn is_local_specifier(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier == "."
        || specifier == ".."
        || specifier.starts_with('/')
}

/// Whether a resolved path points into installed packages.
pub fn is_in_node_modules(path: &Path) -> bool {
    path.components()
        .any(|component| component.as_os_str() == "node_modules")
}
