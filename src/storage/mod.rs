//! Persistent summary cache
//!
//! Caches per-file summaries so a rescan only reads files that changed. An
//! entry is reused only when both size and modification time match exactly.
//!
//! Backends implement [`KeyValueStore`]:
//! - [`MemoryStore`]: process-local map
//! - [`JsonlStore`]: append-only JSON-lines log at
//!   `<cache_dir>/<root-hash>/summaries.jsonl`
//!
//! Cache location defaults to the platform cache directory
//! - macOS: `~/Library/Caches/convo-viewer/`
//! - Linux: `~/.cache/convo-viewer/`
//! - Windows: `%LOCALAPPDATA%\convo-viewer\`

pub mod entry;
pub mod persistence;
pub mod store;

use std::path::Path;

use tracing::{debug, warn};

pub use entry::{CacheEntry, Keyed};
pub use persistence::{JsonlStore, load_last_root, save_last_root, summary_store_path};
pub use store::{KeyValueStore, MemoryStore, StoreError};

/// Summary lookup keyed by path and validated by size + mtime.
///
/// Store failures are logged and treated as misses; they never reach callers.
pub struct SummaryCache {
    store: Box<dyn KeyValueStore<String, CacheEntry>>,
}

impl SummaryCache {
    pub fn new(store: impl KeyValueStore<String, CacheEntry> + 'static) -> Self {
        Self { store: Box::new(store) }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Open the durable cache at `path`, falling back to memory if it cannot be opened
    pub fn open(path: &Path) -> Self {
        match JsonlStore::open(path) {
            Ok(store) => Self::new(store),
            Err(e) => {
                warn!(error = %e, "summary cache unavailable, continuing without persistence");
                Self::in_memory()
            }
        }
    }

    /// Cached summary, only if the stored size and mtime equal the arguments
    pub fn get(&self, path: &str, size: u64, last_modified: i64) -> Option<String> {
        match self.store.get(&path.to_string()) {
            Ok(Some(entry)) if entry.is_fresh(size, last_modified) => Some(entry.summary),
            Ok(Some(_)) => {
                debug!(path, "cache entry stale");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(path, error = %e, "cache read failed");
                None
            }
        }
    }

    pub fn put(
        &self,
        path: &str,
        folder: &str,
        name: &str,
        size: u64,
        last_modified: i64,
        summary: &str,
    ) {
        let entry = CacheEntry {
            path: path.to_string(),
            folder: folder.to_string(),
            name: name.to_string(),
            size,
            last_modified,
            summary: summary.to_string(),
        };
        if let Err(e) = self.store.put(path.to_string(), entry) {
            warn!(path, error = %e, "cache write failed");
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "cache clear failed");
        }
    }
}

impl std::fmt::Debug for SummaryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryCache").finish_non_exhaustive()
    }
}
