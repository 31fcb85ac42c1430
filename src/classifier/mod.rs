//! Classification of parsed transcript records
//!
//! - [`ToolResultIndex`] links each tool invocation to the result that answers it
//! - [`is_primary`] decides whether a record belongs to the main thread
//! - [`display_alignment`] is the rendering side for a record
//! - [`Thread`] bundles a loaded transcript with its index
//! - [`outline_record`] turns a record into presentation-neutral text lines

pub mod outline;

use std::collections::HashMap;
use std::io;

use serde::Serialize;

pub use outline::{RecordOutline, outline_record};

use crate::handles::FileHandle;
use crate::models::{ContentBlock, ConversationRecord, ToolResultContent};
use crate::parsers::{load_transcript, parse_transcript};

/// Tool-use id to the result block answering it
#[derive(Debug, Clone, Default)]
pub struct ToolResultIndex {
    results: HashMap<String, ToolResultContent>,
}

impl ToolResultIndex {
    /// Collect `tool_result` blocks from user records with block content.
    /// A later result for the same id replaces an earlier one.
    pub fn build(records: &[ConversationRecord]) -> Self {
        let mut results = HashMap::new();
        for record in records {
            let ConversationRecord::User(entry) = record else { continue };
            for block in entry.message.content.blocks() {
                if let ContentBlock::ToolResult(result) = block {
                    results.insert(result.tool_use_id.clone(), result.clone());
                }
            }
        }
        Self { results }
    }

    pub fn get(&self, tool_use_id: &str) -> Option<&ToolResultContent> {
        self.results.get(tool_use_id)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Whether a record is shown in the main thread.
///
/// Summaries, file-history snapshots and queue operations are always primary, as
/// are parse errors. Everything else is hidden when flagged as side-chain.
pub fn is_primary(record: &ConversationRecord) -> bool {
    match record {
        ConversationRecord::Summary(_)
        | ConversationRecord::FileHistorySnapshot(_)
        | ConversationRecord::QueueOperation(_)
        | ConversationRecord::ParseError(_) => true,
        ConversationRecord::User(entry) | ConversationRecord::Assistant(entry) => !entry.is_sidechain,
        ConversationRecord::System(entry) => !entry.is_sidechain,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Start,
    End,
}

/// Assistant, system, summary and side-chain records sit at the start; the rest at the end
pub fn display_alignment(record: &ConversationRecord) -> Alignment {
    match record {
        ConversationRecord::Assistant(_)
        | ConversationRecord::System(_)
        | ConversationRecord::Summary(_) => Alignment::Start,
        _ if !is_primary(record) => Alignment::Start,
        _ => Alignment::End,
    }
}

/// A loaded transcript and its tool-result index
#[derive(Debug, Clone, Default)]
pub struct Thread {
    records: Vec<ConversationRecord>,
    tool_results: ToolResultIndex,
}

impl Thread {
    pub fn new(records: Vec<ConversationRecord>) -> Self {
        let tool_results = ToolResultIndex::build(&records);
        Self { records, tool_results }
    }

    pub fn parse(text: &str) -> Self {
        Self::new(parse_transcript(text))
    }

    pub fn load(file: &dyn FileHandle) -> io::Result<Self> {
        Ok(Self::new(load_transcript(file)?))
    }

    pub fn records(&self) -> &[ConversationRecord] {
        &self.records
    }

    pub fn primary_records(&self) -> impl Iterator<Item = &ConversationRecord> {
        self.records.iter().filter(|r| is_primary(r))
    }

    /// Number of records that parsed successfully
    pub fn message_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_error()).count()
    }

    pub fn error_count(&self) -> usize {
        self.records.len() - self.message_count()
    }

    pub fn tool_result(&self, tool_use_id: &str) -> Option<&ToolResultContent> {
        self.tool_results.get(tool_use_id)
    }

    pub fn tool_results(&self) -> &ToolResultIndex {
        &self.tool_results
    }

    /// Outlines for display. Side-chain records are left out unless requested.
    pub fn outlines(&self, include_sidechains: bool) -> Vec<RecordOutline> {
        self.records
            .iter()
            .filter(|r| include_sidechains || is_primary(r))
            .map(|r| outline_record(r, &self.tool_results))
            .collect()
    }
}
