//! Data models for conversation transcripts and the file catalog.
//!
//! - [`FileDescriptor`] - one discovered transcript file with live handles
//! - [`ConversationRecord`] - one parsed JSONL line, tagged by `type`
//! - [`ContentBlock`] / [`ToolResultContent`] - typed message content
//!
//! Records use serde with a custom deserializer for timestamps in the
//! `parsers::deserializers` module.

pub mod descriptor;
pub mod record;

pub use descriptor::{FileDescriptor, ROOT_FOLDER, TRANSCRIPT_EXTENSION};
pub use record::{
    ContentBlock, ContentItem, ConversationRecord, FileHistorySnapshotEntry, Message,
    MessageContent, MessageEntry, ParseErrorEntry, QueueOperationEntry, Snapshot, SummaryEntry,
    SystemEntry, ToolResultContent,
};
