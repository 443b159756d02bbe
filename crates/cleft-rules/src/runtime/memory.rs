//! In-memory runtime.
//!
//! Holds file contents in a map instead of on disk. Editors use it to lint
//! unsaved buffers, and tests use it to control modification times exactly:
//! every write advances a logical clock, so a rewritten file always carries a
//! newer timestamp than the one the cache saw.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::resolve::resolve_with_extensions;
use super::{FileMetadata, Runtime, RuntimeError, RuntimeResult, is_local_specifier};

#[derive(Debug, Clone)]
struct MemoryFile {
    content: String,
    modified: u64,
}

#[derive(Debug, Default)]
pub struct MemoryRuntime {
    files: RwLock<FxHashMap<PathBuf, MemoryFile>>,
    clock: AtomicU64,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a runtime from `(path, content)` pairs.
    pub fn with_files<'a>(files: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let runtime = Self::new();
        for (path, content) in files {
            runtime.write(path, content);
        }
        runtime
    }

    /// Create or overwrite a file, bumping its modification time.
    pub fn write(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let modified = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        self.files.write().insert(
            path_clean::clean(path.as_ref()),
            MemoryFile {
                content: content.into(),
                modified,
            },
        );
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        self.files
            .write()
            .remove(&path_clean::clean(path.as_ref()))
            .is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .read()
            .keys()
            .any(|file| file != path && file.starts_with(path))
    }
}

impl Runtime for MemoryRuntime {
    fn read_file(&self, path: &Path) -> RuntimeResult<String> {
        self.files
            .read()
            .get(&path_clean::clean(path))
            .map(|file| file.content.clone())
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))
    }

    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let path = path_clean::clean(path);
        if let Some(file) = self.files.read().get(&path) {
            return Ok(FileMetadata {
                size: file.content.len() as u64,
                is_dir: false,
                is_file: true,
                modified: Some(file.modified),
            });
        }

        if self.is_dir(&path) {
            return Ok(FileMetadata {
                size: 0,
                is_dir: true,
                is_file: false,
                modified: None,
            });
        }

        Err(RuntimeError::FileNotFound(path))
    }

    fn exists(&self, path: &Path) -> bool {
        let path = path_clean::clean(path);
        self.files.read().contains_key(&path) || self.is_dir(&path)
    }

    fn resolve(&self, specifier: &str, from: &Path) -> RuntimeResult<PathBuf> {
        let failed = |reason: &str| RuntimeError::ResolutionFailed {
            specifier: specifier.to_string(),
            from: from.to_path_buf(),
            reason: reason.to_string(),
        };

        if !is_local_specifier(specifier) {
            return Err(failed("package specifiers are not resolved in memory"));
        }

        let base = if specifier.starts_with('/') {
            PathBuf::from(specifier)
        } else {
            from.parent().unwrap_or(Path::new("/")).join(specifier)
        };

        resolve_with_extensions(&path_clean::clean(base), self)
            .ok_or_else(|| failed("no matching file"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_advance_modification_time() {
        let runtime = MemoryRuntime::new();
        runtime.write("/a.ts", "one");
        let first = runtime.metadata(Path::new("/a.ts")).unwrap().modified;
        runtime.write("/a.ts", "two");
        let second = runtime.metadata(Path::new("/a.ts")).unwrap().modified;

        assert!(second > first);
        assert_eq!(runtime.read_file(Path::new("/a.ts")).unwrap(), "two");
    }

    #[test]
    fn resolves_relative_specifiers() {
        let runtime = MemoryRuntime::with_files([
            ("/app/page.tsx", ""),
            ("/app/components/button.tsx", ""),
        ]);

        let resolved = runtime
            .resolve("./components/button", Path::new("/app/page.tsx"))
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/app/components/button.tsx"));

        let parent = runtime
            .resolve("../page", Path::new("/app/components/button.tsx"))
            .unwrap();
        assert_eq!(parent, PathBuf::from("/app/page.tsx"));
    }

    #[test]
    fn package_specifiers_fail_to_resolve() {
        let runtime = MemoryRuntime::new();
        let err = runtime.resolve("react", Path::new("/app/page.tsx")).unwrap_err();
        assert!(matches!(err, RuntimeError::ResolutionFailed { .. }));
    }

    #[test]
    fn directories_exist_implicitly() {
        let runtime = MemoryRuntime::with_files([("/app/ui/index.ts", "")]);
        assert!(runtime.exists(Path::new("/app/ui")));
        assert!(runtime.metadata(Path::new("/app/ui")).unwrap().is_dir);
        assert!(!runtime.exists(Path::new("/app/other")));
    }

    #[test]
    fn missing_files_report_not_found() {
        let runtime = MemoryRuntime::new();
        assert!(matches!(
            runtime.read_file(Path::new("/nope.ts")),
            Err(RuntimeError::FileNotFound(_))
        ));
    }
}
