//! Guarded deletion of catalog entries

use std::io;

use thiserror::Error;
use tracing::info;

use super::Catalog;
use crate::models::{FileDescriptor, TRANSCRIPT_EXTENSION};

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("refusing to delete {0}: only .jsonl transcripts can be deleted")]
    NotTranscript(String),

    #[error("cannot delete while a scan is in progress")]
    ScanInProgress,

    #[error("failed to delete {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl Catalog {
    /// Remove the transcript behind `descriptor` and drop it from the catalog.
    ///
    /// Names not ending in `.jsonl` are rejected before any I/O. If removal
    /// fails the catalog is left as it was.
    pub fn delete(&mut self, descriptor: &FileDescriptor) -> Result<(), DeleteError> {
        if !descriptor.name.ends_with(TRANSCRIPT_EXTENSION) {
            return Err(DeleteError::NotTranscript(descriptor.name.clone()));
        }

        descriptor
            .parent
            .remove_child(&descriptor.name)
            .map_err(|source| DeleteError::Io { path: descriptor.path.clone(), source })?;

        self.files.retain(|file| file.path != descriptor.path);
        info!(path = %descriptor.path, "deleted transcript");
        Ok(())
    }
}
