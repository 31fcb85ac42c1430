//! Capability handles over a directory tree.
//!
//! Scanning and deletion never touch `std::fs` directly. They work against two
//! object-safe traits:
//!
//! - [`DirectoryHandle`] - enumerate children, open a child file or directory,
//!   remove a child, and report the permission granted for an access mode
//! - [`FileHandle`] - a snapshot of one file (size and modification time taken
//!   when it was opened) that can read a leading chunk or its full text
//!
//! Two backends are provided: [`LocalDirectory`] for the real filesystem and
//! [`MemoryDirectory`], an in-memory tree with read counters and failure
//! injection used by tests and benchmarks.

pub mod local;
pub mod memory;

use std::fmt;
use std::io;
use std::sync::Arc;

pub use local::{LocalDirectory, LocalFile};
pub use memory::{MemoryDirectory, MemoryFile};

/// Kind of a directory child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One child of a directory as reported by [`DirectoryHandle::list_children`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: EntryKind::File }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: EntryKind::Directory }
    }
}

/// Access mode a permission is queried for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    ReadWrite,
}

/// Result of a permission query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// The backend would have to ask the user before granting access
    Prompt,
}

/// A file opened through a [`DirectoryHandle`].
///
/// `size` and `last_modified_ms` are captured when the handle is opened and do
/// not change afterwards, even if the underlying file does.
pub trait FileHandle: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn size(&self) -> u64;

    /// Modification time in milliseconds since the Unix epoch
    fn last_modified_ms(&self) -> i64;

    /// Read at most `max_bytes` from the start of the file
    fn read_chunk(&self, max_bytes: usize) -> io::Result<Vec<u8>>;

    /// Read the whole file as text, replacing invalid UTF-8 with U+FFFD
    fn read_to_string(&self) -> io::Result<String>;
}

/// A directory in a handle-based tree
pub trait DirectoryHandle: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Enumerate immediate children. Order is backend-defined.
    fn list_children(&self) -> io::Result<Vec<DirEntry>>;

    fn open_file(&self, name: &str) -> io::Result<Arc<dyn FileHandle>>;

    fn open_directory(&self, name: &str) -> io::Result<Arc<dyn DirectoryHandle>>;

    /// Remove a child file
    fn remove_child(&self, name: &str) -> io::Result<()>;

    fn query_permission(&self, mode: AccessMode) -> Permission;
}

/// Reject child names that could escape the directory they are resolved in
pub(crate) fn validate_child_name(name: &str) -> io::Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid child name: {:?}", name),
        ));
    }
    Ok(())
}
