//! Convo Viewer - Browse conversation transcripts stored as JSONL files
//!
//! This library scans a directory tree for `.jsonl` transcripts and turns them
//! into something a person can read. It supports:
//!
//! - Recursive scanning through capability handles, with a persistent summary
//!   cache keyed by path and validated by size and modification time
//! - A catalog sorted and grouped by folder, with substring filtering and
//!   guarded deletion
//! - Lenient transcript parsing: a malformed line becomes an error record
//!   instead of failing the whole file
//! - Classification of records into the main thread and side-chains, with each
//!   tool invocation linked to its result
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use convo_viewer::handles::LocalDirectory;
//! use convo_viewer::scanner::ScannerSession;
//! use convo_viewer::storage::SummaryCache;
//!
//! let root = LocalDirectory::open("/Users/alice/.claude/projects")?;
//! let mut session = ScannerSession::new(Arc::new(SummaryCache::in_memory()));
//! session.select_root(Arc::new(root))?;
//! for group in session.catalog().grouped("parser") {
//!     println!("{}: {} transcripts", group.folder, group.files.len());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod catalog;
pub mod classifier;
pub mod cli;
pub mod handles;
pub mod models;
pub mod parsers;
pub mod scanner;
pub mod storage;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use catalog::Catalog;
pub use classifier::Thread;
pub use models::{ConversationRecord, FileDescriptor};
pub use parsers::{parse_line, parse_transcript};
pub use scanner::{ScannerSession, extract_summary, scan_directory};
pub use storage::SummaryCache;
