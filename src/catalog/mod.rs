//! Catalog of discovered transcripts
//!
//! Ordering, search and grouping for the file list, plus guarded deletion.
//! A [`Catalog`] is always kept sorted by folder, then by modification time
//! (oldest first).

pub mod delete;
pub mod filter;
pub mod group;

pub use delete::DeleteError;
pub use filter::{filter_catalog, matches_query};
pub use group::{FolderGroup, group_by_folder};

use crate::models::FileDescriptor;

/// Sort by folder (ascending), then modification time (ascending).
/// Stable, so ties keep their incoming order.
pub fn sort_catalog(files: &mut [FileDescriptor]) {
    files.sort_by(|a, b| {
        a.folder.cmp(&b.folder).then_with(|| a.last_modified_ms.cmp(&b.last_modified_ms))
    });
}

/// The live set of descriptors from the latest successful scan
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    files: Vec<FileDescriptor>,
}

impl Catalog {
    /// Build a catalog from a scan result, sorting it
    pub fn new(mut files: Vec<FileDescriptor>) -> Self {
        sort_catalog(&mut files);
        Self { files }
    }

    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&FileDescriptor> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn filter(&self, query: &str) -> Vec<&FileDescriptor> {
        filter_catalog(&self.files, query)
    }

    /// Filter, then group what is left by folder
    pub fn grouped(&self, query: &str) -> Vec<FolderGroup<'_>> {
        group_by_folder(self.filter(query))
    }
}
