//! Transcript discovery with cached summaries
//!
//! # Error Handling Strategy
//!
//! Scanning is all-or-nothing:
//!
//! - **I/O failures**: a directory that cannot be listed or a file that cannot be
//!   opened or read aborts the whole scan with a [`ScanError`]. No partial catalog
//!   is produced.
//!
//! - **Previous state**: [`ScannerSession`] keeps the last good catalog when a
//!   rescan fails and exposes the failure through `last_error`.
//!
//! - **Cache failures**: never abort a scan. The summary cache logs them and the
//!   file is treated as a miss.

pub mod directory;
pub mod session;
pub mod summary;

pub use directory::{MIN_FILE_SIZE_BYTES, ScanError, ScanOutput, ScanStats, scan_directory};
pub use session::{CompletedScan, ScanJob, ScannerSession, has_access};
pub use summary::{SUMMARY_MAX_CHARS, SUMMARY_SCAN_BYTES, extract_summary};
