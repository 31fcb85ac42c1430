//! Filesystem-backed handles

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use super::{
    AccessMode, DirEntry, DirectoryHandle, FileHandle, Permission, validate_child_name,
};

/// A directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    path: PathBuf,
    name: String,
}

impl LocalDirectory {
    /// Open an existing directory
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let metadata = fs::metadata(&path)?;
        if !metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {}", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { path, name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn child_path(&self, name: &str) -> io::Result<PathBuf> {
        validate_child_name(name)?;
        Ok(self.path.join(name))
    }
}

impl DirectoryHandle for LocalDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_children(&self) -> io::Result<Vec<DirEntry>> {
        let mut children = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let name = entry.file_name().to_string_lossy().to_string();

            // Symlinks are never followed
            if file_type.is_symlink() {
                debug!(path = %entry.path().display(), "skipping symlink");
                continue;
            }

            if file_type.is_dir() {
                children.push(DirEntry::directory(name));
            } else if file_type.is_file() {
                children.push(DirEntry::file(name));
            }
        }
        Ok(children)
    }

    fn open_file(&self, name: &str) -> io::Result<Arc<dyn FileHandle>> {
        let path = self.child_path(name)?;
        Ok(Arc::new(LocalFile::open(path)?))
    }

    fn open_directory(&self, name: &str) -> io::Result<Arc<dyn DirectoryHandle>> {
        let path = self.child_path(name)?;
        Ok(Arc::new(LocalDirectory::open(path)?))
    }

    fn remove_child(&self, name: &str) -> io::Result<()> {
        let path = self.child_path(name)?;
        fs::remove_file(path)
    }

    fn query_permission(&self, mode: AccessMode) -> Permission {
        let Ok(metadata) = fs::metadata(&self.path) else {
            return Permission::Denied;
        };
        if !metadata.is_dir() || fs::read_dir(&self.path).is_err() {
            return Permission::Denied;
        }
        match mode {
            AccessMode::Read => Permission::Granted,
            AccessMode::ReadWrite if metadata.permissions().readonly() => Permission::Denied,
            AccessMode::ReadWrite => Permission::Granted,
        }
    }
}

/// Snapshot of a file on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    size: u64,
    last_modified_ms: i64,
}

impl LocalFile {
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let metadata = fs::metadata(&path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }
        let last_modified_ms = metadata.modified().map(system_time_to_unix_ms).unwrap_or(0);
        let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();

        Ok(Self { path, name, size: metadata.len(), last_modified_ms })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileHandle for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn last_modified_ms(&self) -> i64 {
        self.last_modified_ms
    }

    fn read_chunk(&self, max_bytes: usize) -> io::Result<Vec<u8>> {
        let file = File::open(&self.path)?;
        let mut buffer = Vec::with_capacity(max_bytes.min(self.size as usize));
        file.take(max_bytes as u64).read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Invalid UTF-8 becomes U+FFFD so one damaged line cannot hide the rest
    fn read_to_string(&self) -> io::Result<String> {
        let bytes = fs::read(&self.path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn system_time_to_unix_ms(value: SystemTime) -> i64 {
    match value.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(delta) => i64::try_from(delta.as_millis()).unwrap_or(i64::MAX),
        Err(before_epoch) => -i64::try_from(before_epoch.duration().as_millis()).unwrap_or(i64::MAX),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::handles::EntryKind;

    #[test]
    fn test_list_children_reports_files_and_directories() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(temp.path().join("project")).unwrap();
        fs::write(temp.path().join("a.jsonl"), "{}").unwrap();

        let dir = LocalDirectory::open(temp.path()).unwrap();
        let mut children = dir.list_children().unwrap();
        children.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(children.len(), 2);
        assert_eq!(children[0], DirEntry::file("a.jsonl"));
        assert_eq!(children[1].kind, EntryKind::Directory);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_children_skips_symlinks() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp.path().join("real.jsonl"), "{}").unwrap();
        std::os::unix::fs::symlink(temp.path().join("real.jsonl"), temp.path().join("link.jsonl"))
            .unwrap();

        let dir = LocalDirectory::open(temp.path()).unwrap();
        let children = dir.list_children().unwrap();

        assert_eq!(children, vec![DirEntry::file("real.jsonl")]);
    }

    #[test]
    fn test_open_file_snapshots_size_and_mtime() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("s.jsonl");
        fs::write(&path, "hello world").unwrap();
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        File::options().write(true).open(&path).unwrap().set_modified(mtime).unwrap();

        let dir = LocalDirectory::open(temp.path()).unwrap();
        let file = dir.open_file("s.jsonl").unwrap();

        assert_eq!(file.name(), "s.jsonl");
        assert_eq!(file.size(), 11);
        assert_eq!(file.last_modified_ms(), 1_700_000_000_123);
        assert_eq!(file.read_chunk(5).unwrap(), b"hello");
        assert_eq!(file.read_to_string().unwrap(), "hello world");
    }

    #[test]
    fn test_remove_child_deletes_file() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp.path().join("gone.jsonl"), "x").unwrap();

        let dir = LocalDirectory::open(temp.path()).unwrap();
        dir.remove_child("gone.jsonl").unwrap();

        assert!(!temp.path().join("gone.jsonl").exists());
        assert!(dir.remove_child("gone.jsonl").is_err());
    }

    #[test]
    fn test_remove_child_rejects_traversal() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let dir = LocalDirectory::open(temp.path()).unwrap();

        let err = dir.remove_child("../outside.jsonl").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_open_rejects_regular_file() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("file.txt");
        fs::write(&path, "x").unwrap();

        assert!(LocalDirectory::open(&path).is_err());
    }

    #[test]
    fn test_query_permission_on_existing_directory() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let dir = LocalDirectory::open(temp.path()).unwrap();

        assert_eq!(dir.query_permission(AccessMode::Read), Permission::Granted);
    }

    #[test]
    fn test_query_permission_on_vanished_directory() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let sub = temp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let dir = LocalDirectory::open(&sub).unwrap();
        fs::remove_dir(&sub).unwrap();

        assert_eq!(dir.query_permission(AccessMode::Read), Permission::Denied);
        assert_eq!(dir.query_permission(AccessMode::ReadWrite), Permission::Denied);
    }
}
