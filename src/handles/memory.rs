//! In-memory directory tree.
//!
//! Children keep their insertion order, so enumeration is deterministic. All
//! handles derived from one root share read counters, which lets tests observe
//! whether a scan actually read file contents. Listing, reading and removal can
//! be made to fail per node.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{
    AccessMode, DirEntry, DirectoryHandle, EntryKind, FileHandle, Permission, validate_child_name,
};

#[derive(Debug, Default)]
struct Counters {
    chunk_reads: AtomicUsize,
    full_reads: AtomicUsize,
}

#[derive(Debug, Clone)]
struct FileNode {
    contents: Arc<Vec<u8>>,
    last_modified_ms: i64,
    fail_reads: bool,
}

#[derive(Debug, Clone)]
enum Node {
    File(FileNode),
    Directory(Arc<Mutex<DirNode>>),
}

#[derive(Debug)]
struct DirNode {
    children: Vec<(String, Node)>,
    fail_listing: bool,
    fail_removal: bool,
    read_permission: Permission,
    write_permission: Permission,
}

impl Default for DirNode {
    fn default() -> Self {
        Self {
            children: Vec::new(),
            fail_listing: false,
            fail_removal: false,
            read_permission: Permission::Granted,
            write_permission: Permission::Granted,
        }
    }
}

impl DirNode {
    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|(n, _)| n == name).map(|(_, node)| node)
    }

    fn upsert(&mut self, name: &str, node: Node) {
        match self.children.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = node,
            None => self.children.push((name.to_string(), node)),
        }
    }
}

fn lock(node: &Mutex<DirNode>) -> MutexGuard<'_, DirNode> {
    node.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A directory in an in-memory tree
#[derive(Debug, Clone)]
pub struct MemoryDirectory {
    name: String,
    node: Arc<Mutex<DirNode>>,
    counters: Arc<Counters>,
}

impl MemoryDirectory {
    /// Create an empty root directory
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node: Arc::new(Mutex::new(DirNode::default())),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Add a file, or replace the contents and modification time of an existing one
    pub fn add_file(
        &self,
        name: &str,
        contents: impl Into<Vec<u8>>,
        last_modified_ms: i64,
    ) -> &Self {
        let file = FileNode { contents: Arc::new(contents.into()), last_modified_ms, fail_reads: false };
        lock(&self.node).upsert(name, Node::File(file));
        self
    }

    /// Get or create a subdirectory
    pub fn add_directory(&self, name: &str) -> MemoryDirectory {
        let mut guard = lock(&self.node);
        let node = match guard.child(name) {
            Some(Node::Directory(existing)) => Arc::clone(existing),
            _ => {
                let created = Arc::new(Mutex::new(DirNode::default()));
                guard.upsert(name, Node::Directory(Arc::clone(&created)));
                created
            }
        };
        MemoryDirectory { name: name.to_string(), node, counters: Arc::clone(&self.counters) }
    }

    pub fn contains(&self, name: &str) -> bool {
        lock(&self.node).child(name).is_some()
    }

    /// Make `list_children` on this directory fail
    pub fn fail_listing(&self, fail: bool) {
        lock(&self.node).fail_listing = fail;
    }

    /// Make `remove_child` on this directory fail
    pub fn fail_removal(&self, fail: bool) {
        lock(&self.node).fail_removal = fail;
    }

    /// Make reads of the named child file fail
    pub fn fail_reads(&self, name: &str, fail: bool) {
        let mut guard = lock(&self.node);
        if let Some((_, Node::File(file))) = guard.children.iter_mut().find(|(n, _)| n == name) {
            file.fail_reads = fail;
        }
    }

    pub fn set_permission(&self, mode: AccessMode, permission: Permission) {
        let mut guard = lock(&self.node);
        match mode {
            AccessMode::Read => guard.read_permission = permission,
            AccessMode::ReadWrite => guard.write_permission = permission,
        }
    }

    /// Number of leading-chunk reads across the whole tree
    pub fn chunk_reads(&self) -> usize {
        self.counters.chunk_reads.load(Ordering::SeqCst)
    }

    /// Number of full-text reads across the whole tree
    pub fn full_reads(&self) -> usize {
        self.counters.full_reads.load(Ordering::SeqCst)
    }
}

impl DirectoryHandle for MemoryDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_children(&self) -> io::Result<Vec<DirEntry>> {
        let guard = lock(&self.node);
        if guard.fail_listing {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "listing refused"));
        }
        Ok(guard
            .children
            .iter()
            .map(|(name, node)| DirEntry {
                name: name.clone(),
                kind: match node {
                    Node::File(_) => EntryKind::File,
                    Node::Directory(_) => EntryKind::Directory,
                },
            })
            .collect())
    }

    fn open_file(&self, name: &str) -> io::Result<Arc<dyn FileHandle>> {
        validate_child_name(name)?;
        match lock(&self.node).child(name) {
            Some(Node::File(file)) => Ok(Arc::new(MemoryFile {
                name: name.to_string(),
                contents: Arc::clone(&file.contents),
                last_modified_ms: file.last_modified_ms,
                fail_reads: file.fail_reads,
                counters: Arc::clone(&self.counters),
            })),
            Some(Node::Directory(_)) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", name),
            )),
            None => Err(io::Error::new(io::ErrorKind::NotFound, format!("{} not found", name))),
        }
    }

    fn open_directory(&self, name: &str) -> io::Result<Arc<dyn DirectoryHandle>> {
        validate_child_name(name)?;
        match lock(&self.node).child(name) {
            Some(Node::Directory(node)) => Ok(Arc::new(MemoryDirectory {
                name: name.to_string(),
                node: Arc::clone(node),
                counters: Arc::clone(&self.counters),
            })),
            Some(Node::File(_)) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is a file", name),
            )),
            None => Err(io::Error::new(io::ErrorKind::NotFound, format!("{} not found", name))),
        }
    }

    fn remove_child(&self, name: &str) -> io::Result<()> {
        validate_child_name(name)?;
        let mut guard = lock(&self.node);
        if guard.fail_removal || guard.write_permission != Permission::Granted {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "removal refused"));
        }
        let position = guard
            .children
            .iter()
            .position(|(n, node)| n == name && matches!(node, Node::File(_)))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{} not found", name)))?;
        guard.children.remove(position);
        Ok(())
    }

    fn query_permission(&self, mode: AccessMode) -> Permission {
        let guard = lock(&self.node);
        match mode {
            AccessMode::Read => guard.read_permission,
            AccessMode::ReadWrite => match (guard.read_permission, guard.write_permission) {
                (Permission::Granted, write) => write,
                (read, _) => read,
            },
        }
    }
}

/// Snapshot of an in-memory file
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    contents: Arc<Vec<u8>>,
    last_modified_ms: i64,
    fail_reads: bool,
    counters: Arc<Counters>,
}

impl MemoryFile {
    fn check_readable(&self) -> io::Result<()> {
        if self.fail_reads {
            return Err(io::Error::new(io::ErrorKind::Other, format!("read of {} failed", self.name)));
        }
        Ok(())
    }
}

impl FileHandle for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.contents.len() as u64
    }

    fn last_modified_ms(&self) -> i64 {
        self.last_modified_ms
    }

    fn read_chunk(&self, max_bytes: usize) -> io::Result<Vec<u8>> {
        self.check_readable()?;
        self.counters.chunk_reads.fetch_add(1, Ordering::SeqCst);
        let end = max_bytes.min(self.contents.len());
        Ok(self.contents[..end].to_vec())
    }

    fn read_to_string(&self) -> io::Result<String> {
        self.check_readable()?;
        self.counters.full_reads.fetch_add(1, Ordering::SeqCst);
        Ok(String::from_utf8_lossy(&self.contents).into_owned())
    }
}
