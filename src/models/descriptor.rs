use std::sync::Arc;

use serde::Serialize;

use crate::handles::{DirectoryHandle, FileHandle};

/// Folder label for files directly under the scanned root
pub const ROOT_FOLDER: &str = "(root)";

/// Only files with this suffix are scanned or deleted
pub const TRANSCRIPT_EXTENSION: &str = ".jsonl";

/// One transcript file discovered by a scan.
///
/// `path` is the slash-joined path relative to the scan root and is unique
/// within one scan. `file` and `parent` are the live handles the file was found
/// through; `parent` is what deletion goes through.
#[derive(Debug, Clone, Serialize)]
pub struct FileDescriptor {
    pub name: String,
    pub path: String,
    pub folder: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    #[serde(rename = "lastModified")]
    pub last_modified_ms: i64,
    pub summary: String,
    #[serde(skip)]
    pub file: Arc<dyn FileHandle>,
    #[serde(skip)]
    pub parent: Arc<dyn DirectoryHandle>,
}

impl FileDescriptor {
    pub fn is_transcript(&self) -> bool {
        self.name.ends_with(TRANSCRIPT_EXTENSION)
    }

    /// Text shown in lists: the summary, or the file stem when there is none
    pub fn label(&self) -> &str {
        if !self.summary.is_empty() {
            return &self.summary;
        }
        self.name.strip_suffix(TRANSCRIPT_EXTENSION).unwrap_or(&self.name)
    }
}
