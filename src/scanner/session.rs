//! Scanner session: the selected root, the in-flight flag and the live catalog

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use super::directory::{ScanError, ScanOutput, ScanStats, scan_directory};
use crate::catalog::{Catalog, DeleteError};
use crate::handles::{AccessMode, DirectoryHandle, Permission};
use crate::models::FileDescriptor;
use crate::storage::SummaryCache;

/// State for scanning one root.
///
/// At most one scan runs at a time. A successful scan replaces the catalog; a
/// failed one keeps the previous catalog and records the error.
#[derive(Debug)]
pub struct ScannerSession {
    root: Option<Arc<dyn DirectoryHandle>>,
    cache: Arc<SummaryCache>,
    scanning: Arc<AtomicBool>,
    catalog: Catalog,
    last_error: Option<String>,
}

/// Clears the in-flight flag when dropped
#[derive(Debug)]
struct ScanGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ScanGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// A scan that has been admitted and can run on any thread
#[derive(Debug)]
pub struct ScanJob {
    root: Arc<dyn DirectoryHandle>,
    cache: Arc<SummaryCache>,
    guard: ScanGuard,
}

impl ScanJob {
    pub fn run(self) -> CompletedScan {
        let outcome = scan_directory(&self.root, &self.cache);
        CompletedScan { outcome, _guard: self.guard }
    }
}

/// Result of a [`ScanJob`]. The session stays busy until it is applied or dropped.
#[derive(Debug)]
pub struct CompletedScan {
    outcome: Result<ScanOutput, ScanError>,
    _guard: ScanGuard,
}

impl ScannerSession {
    pub fn new(cache: Arc<SummaryCache>) -> Self {
        Self {
            root: None,
            cache,
            scanning: Arc::new(AtomicBool::new(false)),
            catalog: Catalog::default(),
            last_error: None,
        }
    }

    pub fn root(&self) -> Option<&Arc<dyn DirectoryHandle>> {
        self.root.as_ref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cache(&self) -> &SummaryCache {
        &self.cache
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    /// Message of the most recent failed scan, cleared by a successful one
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Make `root` the current root without scanning it
    pub fn set_root(&mut self, root: Arc<dyn DirectoryHandle>) -> Result<(), ScanError> {
        if self.is_scanning() {
            return Err(ScanError::ScanInProgress);
        }
        self.root = Some(root);
        Ok(())
    }

    /// Select a new root and scan it
    pub fn select_root(&mut self, root: Arc<dyn DirectoryHandle>) -> Result<ScanStats, ScanError> {
        self.set_root(root)?;
        self.scan()
    }

    /// Select a previously used root, but only if access is still granted.
    ///
    /// Returns `Ok(None)` without scanning when neither read-write nor read
    /// access is granted.
    pub fn restore_root(
        &mut self,
        root: Arc<dyn DirectoryHandle>,
    ) -> Result<Option<ScanStats>, ScanError> {
        if !has_access(root.as_ref()) {
            warn!(root = root.name(), "remembered root is no longer accessible");
            return Ok(None);
        }
        self.select_root(root).map(Some)
    }

    /// Claim the in-flight flag and package a scan of the current root
    pub fn begin_scan(&self) -> Result<ScanJob, ScanError> {
        let root = self.root.clone().ok_or(ScanError::NoRootSelected)?;
        if self.scanning.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return Err(ScanError::ScanInProgress);
        }
        Ok(ScanJob {
            root,
            cache: Arc::clone(&self.cache),
            guard: ScanGuard { flag: Arc::clone(&self.scanning) },
        })
    }

    /// Like [`begin_scan`](Self::begin_scan), but empties the summary cache first
    pub fn begin_refresh(&self) -> Result<ScanJob, ScanError> {
        let job = self.begin_scan()?;
        self.cache.clear();
        info!("summary cache cleared for refresh");
        Ok(job)
    }

    /// Apply a finished scan
    pub fn finish_scan(&mut self, completed: CompletedScan) -> Result<ScanStats, ScanError> {
        let CompletedScan { outcome, _guard } = completed;
        match outcome {
            Ok(output) => {
                self.catalog = Catalog::new(output.files);
                self.last_error = None;
                Ok(output.stats)
            }
            Err(e) => {
                warn!(error = %e, "scan failed, keeping previous catalog");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Scan the current root on this thread
    pub fn scan(&mut self) -> Result<ScanStats, ScanError> {
        let job = self.begin_scan()?;
        self.finish_scan(job.run())
    }

    /// Clear the summary cache and rescan the current root
    pub fn refresh(&mut self) -> Result<ScanStats, ScanError> {
        let job = self.begin_refresh()?;
        self.finish_scan(job.run())
    }

    /// Delete a transcript. Rejected while a scan is running.
    pub fn delete(&mut self, descriptor: &FileDescriptor) -> Result<(), DeleteError> {
        if self.is_scanning() {
            return Err(DeleteError::ScanInProgress);
        }
        self.catalog.delete(descriptor)
    }
}

/// Read-write access, or failing that read access, is granted
pub fn has_access(root: &dyn DirectoryHandle) -> bool {
    root.query_permission(AccessMode::ReadWrite) == Permission::Granted
        || root.query_permission(AccessMode::Read) == Permission::Granted
}
