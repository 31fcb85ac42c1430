//! Recursive transcript discovery over a directory handle tree

use std::io;
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use super::summary::{SUMMARY_SCAN_BYTES, extract_summary};
use crate::handles::{DirectoryHandle, EntryKind};
use crate::models::{FileDescriptor, ROOT_FOLDER, TRANSCRIPT_EXTENSION};
use crate::storage::SummaryCache;

/// Transcripts smaller than this are never listed or cached
pub const MIN_FILE_SIZE_BYTES: u64 = 5 * 1024;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to list directory {path}: {source}")]
    List {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("a scan is already in progress")]
    ScanInProgress,

    #[error("no root directory selected")]
    NoRootSelected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub skipped_small: usize,
}

impl ScanStats {
    fn absorb(&mut self, other: ScanStats) {
        self.cache_hits += other.cache_hits;
        self.cache_misses += other.cache_misses;
        self.skipped_small += other.skipped_small;
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    /// Descriptors in traversal order
    pub files: Vec<FileDescriptor>,
    pub stats: ScanStats,
}

impl ScanOutput {
    fn merge(mut self, other: ScanOutput) -> Self {
        self.files.extend(other.files);
        self.stats.absorb(other.stats);
        self
    }
}

/// Walk `root` and describe every `.jsonl` file of at least [`MIN_FILE_SIZE_BYTES`].
///
/// Summaries come from `cache` when size and mtime match, otherwise from the
/// first [`SUMMARY_SCAN_BYTES`] of the file, and are written back to the cache.
/// Sibling entries are processed in parallel and concatenated in enumeration
/// order.
///
/// # Errors
///
/// Any failure to list a directory, open an entry or read a chunk aborts the
/// whole scan; no partial result is returned.
pub fn scan_directory(
    root: &Arc<dyn DirectoryHandle>,
    cache: &SummaryCache,
) -> Result<ScanOutput, ScanError> {
    let output = scan_level(root, "", cache)?;
    info!(
        root = root.name(),
        files = output.files.len(),
        cache_hits = output.stats.cache_hits,
        cache_misses = output.stats.cache_misses,
        skipped_small = output.stats.skipped_small,
        "scan complete"
    );
    Ok(output)
}

fn scan_level(
    dir: &Arc<dyn DirectoryHandle>,
    parent_path: &str,
    cache: &SummaryCache,
) -> Result<ScanOutput, ScanError> {
    let entries = dir.list_children().map_err(|source| ScanError::List {
        path: if parent_path.is_empty() { ".".to_string() } else { parent_path.to_string() },
        source,
    })?;

    let parts = entries
        .par_iter()
        .map(|entry| {
            let current_path = if parent_path.is_empty() {
                entry.name.clone()
            } else {
                format!("{}/{}", parent_path, entry.name)
            };

            match entry.kind {
                EntryKind::Directory => {
                    let sub = dir
                        .open_directory(&entry.name)
                        .map_err(|source| ScanError::Open { path: current_path.clone(), source })?;
                    scan_level(&sub, &current_path, cache)
                }
                EntryKind::File if entry.name.ends_with(TRANSCRIPT_EXTENSION) => {
                    scan_file(dir, parent_path, &entry.name, current_path, cache)
                }
                EntryKind::File => Ok(ScanOutput::default()),
            }
        })
        .collect::<Result<Vec<ScanOutput>, ScanError>>()?;

    Ok(parts.into_iter().fold(ScanOutput::default(), ScanOutput::merge))
}

fn scan_file(
    dir: &Arc<dyn DirectoryHandle>,
    parent_path: &str,
    name: &str,
    path: String,
    cache: &SummaryCache,
) -> Result<ScanOutput, ScanError> {
    let file = dir
        .open_file(name)
        .map_err(|source| ScanError::Open { path: path.clone(), source })?;

    let size_bytes = file.size();
    if size_bytes < MIN_FILE_SIZE_BYTES {
        debug!(path, size_bytes, "skipping small file");
        return Ok(ScanOutput {
            files: Vec::new(),
            stats: ScanStats { skipped_small: 1, ..ScanStats::default() },
        });
    }

    let folder = if parent_path.is_empty() { ROOT_FOLDER } else { parent_path };
    let last_modified_ms = file.last_modified_ms();
    let mut stats = ScanStats::default();

    let summary = match cache.get(&path, size_bytes, last_modified_ms) {
        Some(summary) => {
            debug!(path, "summary cache hit");
            stats.cache_hits = 1;
            summary
        }
        None => {
            let chunk = file
                .read_chunk(SUMMARY_SCAN_BYTES)
                .map_err(|source| ScanError::Read { path: path.clone(), source })?;
            let summary = extract_summary(&String::from_utf8_lossy(&chunk));
            cache.put(&path, folder, name, size_bytes, last_modified_ms, &summary);
            debug!(path, "summary cache miss");
            stats.cache_misses = 1;
            summary
        }
    };

    let descriptor = FileDescriptor {
        name: name.to_string(),
        path,
        folder: folder.to_string(),
        size_bytes,
        last_modified_ms,
        summary,
        file,
        parent: Arc::clone(dir),
    };
    Ok(ScanOutput { files: vec![descriptor], stats })
}
