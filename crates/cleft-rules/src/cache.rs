//! Per-process analysis cache.
//!
//! Records what the tracer learned about each file, keyed by path and
//! validated against the file's modification time on every read. Entries are
//! shared by all analyses in the process; concurrent writers race with
//! last-writer-wins, which at worst costs a redundant re-scan.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAnalysisRecord {
    pub has_directive: bool,
    pub has_client_indicators: bool,
    /// The file failed to parse. Such records are never trusted for tracing.
    pub is_error: bool,
    /// Modification time the record was computed against.
    pub modified: u64,
    /// Runtime import and re-export specifiers, so a trace can continue from
    /// a cached record without re-reading the file.
    pub dependencies: Vec<String>,
}

impl FileAnalysisRecord {
    /// Whether the tracer should treat this file as needing the client.
    pub fn indicates_client(&self) -> bool {
        self.has_directive || self.has_client_indicators
    }
}

#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: DashMap<PathBuf, FileAnalysisRecord>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The record for `path`, if one exists for exactly `modified`.
    pub fn get(&self, path: &Path, modified: u64) -> Option<FileAnalysisRecord> {
        let record = self
            .entries
            .get(path)
            .filter(|record| record.modified == modified)
            .map(|record| record.clone());

        if record.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(path = %path.display(), "analysis cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(path = %path.display(), "analysis cache miss");
        }
        record
    }

    pub fn set(&self, path: impl Into<PathBuf>, record: FileAnalysisRecord) {
        self.entries.insert(path.into(), record);
    }

    /// Drop the record for `path`. Returns whether one existed.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats::new(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

impl CacheStats {
    pub fn new(hits: u64, misses: u64) -> Self {
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };
        Self {
            hits,
            misses,
            hit_rate,
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hits, {} misses ({:.1}% hit rate)",
            self.hits,
            self.misses,
            self.hit_rate * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(modified: u64) -> FileAnalysisRecord {
        FileAnalysisRecord {
            has_directive: false,
            has_client_indicators: true,
            is_error: false,
            modified,
            dependencies: vec!["./b".to_string()],
        }
    }

    #[test]
    fn stale_records_are_misses() {
        let cache = AnalysisCache::new();
        cache.set("/a.ts", record(1));

        assert_eq!(cache.get(Path::new("/a.ts"), 1), Some(record(1)));
        assert_eq!(cache.get(Path::new("/a.ts"), 2), None);
        assert_eq!(cache.get(Path::new("/b.ts"), 1), None);

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 2));
    }

    #[test]
    fn invalidate_and_clear() {
        let cache = AnalysisCache::new();
        cache.set("/a.ts", record(1));
        cache.set("/b.ts", record(1));

        assert!(cache.invalidate(Path::new("/a.ts")));
        assert!(!cache.invalidate(Path::new("/a.ts")));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn concurrent_writers_leave_a_whole_record() {
        let cache = Arc::new(AnalysisCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        cache.set("/shared.ts", record(i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 1);
        let winner = (0..8)
            .find_map(|i| cache.get(Path::new("/shared.ts"), i))
            .unwrap();
        assert_eq!(winner.dependencies, vec!["./b".to_string()]);
    }

    #[test]
    fn stats_display() {
        assert_eq!(
            CacheStats::new(3, 1).to_string(),
            "3 hits, 1 misses (75.0% hit rate)"
        );
    }
}
