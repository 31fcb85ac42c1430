use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One line of a transcript, discriminated by its `type` field.
///
/// Lines that are not valid JSON or do not fit any known kind become
/// [`ConversationRecord::ParseError`], which only keeps the raw text. That
/// variant is never produced by deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConversationRecord {
    #[serde(rename = "user")]
    User(MessageEntry),
    #[serde(rename = "assistant")]
    Assistant(MessageEntry),
    #[serde(rename = "system")]
    System(SystemEntry),
    #[serde(rename = "summary")]
    Summary(SummaryEntry),
    #[serde(rename = "file-history-snapshot")]
    FileHistorySnapshot(FileHistorySnapshotEntry),
    #[serde(rename = "queue-operation")]
    QueueOperation(QueueOperationEntry),
    #[serde(rename = "x-error", skip_deserializing)]
    ParseError(ParseErrorEntry),
}

/// Shared shape of `user` and `assistant` lines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEntry {
    pub uuid: String,
    #[serde(default)]
    pub parent_uuid: Option<String>,
    #[serde(default)]
    pub is_sidechain: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(deserialize_with = "crate::parsers::deserializers::deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
    #[serde(default)]
    pub is_meta: Option<bool>,
    pub message: Message,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: MessageContent,
    #[serde(default)]
    pub model: Option<String>,
}

/// `message.content` is either plain text or an ordered list of blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentItem>),
}

/// Block lists may mix bare strings with typed blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentItem {
    Block(ContentBlock),
    Plain(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Thinking {
        thinking: String,
        #[serde(default)]
        signature: Option<String>,
    },
    RedactedThinking {
        data: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult(ToolResultContent),
    Image {
        source: Value,
    },
    Document {
        source: Value,
    },
}

/// The answer to one tool invocation, linked by `tool_use_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultContent {
    pub tool_use_id: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub is_error: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemEntry {
    pub uuid: String,
    #[serde(default)]
    pub parent_uuid: Option<String>,
    #[serde(default)]
    pub is_sidechain: bool,
    #[serde(deserialize_with = "crate::parsers::deserializers::deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryEntry {
    pub summary: String,
    pub leaf_uuid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHistorySnapshotEntry {
    pub message_id: String,
    pub snapshot: Snapshot,
    #[serde(default)]
    pub is_snapshot_update: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub message_id: String,
    #[serde(default)]
    pub tracked_file_backups: BTreeMap<String, Value>,
    pub timestamp: String,
}

/// Queue bookkeeping line. `timestamp` stays as written since it is part of the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueOperationEntry {
    pub operation: String,
    pub session_id: String,
    pub timestamp: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseErrorEntry {
    pub line: String,
}

impl ConversationRecord {
    pub fn parse_error(line: impl Into<String>) -> Self {
        Self::ParseError(ParseErrorEntry { line: line.into() })
    }

    /// Value of the `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Assistant(_) => "assistant",
            Self::System(_) => "system",
            Self::Summary(_) => "summary",
            Self::FileHistorySnapshot(_) => "file-history-snapshot",
            Self::QueueOperation(_) => "queue-operation",
            Self::ParseError(_) => "x-error",
        }
    }

    /// Stable identifier for keying rendered rows
    pub fn key(&self) -> String {
        match self {
            Self::User(entry) => format!("user_{}", entry.uuid),
            Self::Assistant(entry) => format!("assistant_{}", entry.uuid),
            Self::System(entry) => format!("system_{}", entry.uuid),
            Self::Summary(entry) => format!("summary_{}", entry.leaf_uuid),
            Self::FileHistorySnapshot(entry) => format!("file-history-snapshot_{}", entry.message_id),
            Self::QueueOperation(entry) => format!(
                "queue-operation_{}_{}_{}",
                entry.operation, entry.session_id, entry.timestamp
            ),
            Self::ParseError(entry) => format!("error_{}", entry.line),
        }
    }

    /// Raw side-chain flag. Kinds without the field report `false`.
    pub fn sidechain_flag(&self) -> bool {
        match self {
            Self::User(entry) | Self::Assistant(entry) => entry.is_sidechain,
            Self::System(entry) => entry.is_sidechain,
            Self::Summary(_)
            | Self::FileHistorySnapshot(_)
            | Self::QueueOperation(_)
            | Self::ParseError(_) => false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::ParseError(_))
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::User(entry) | Self::Assistant(entry) => Some(entry.timestamp),
            Self::System(entry) => Some(entry.timestamp),
            Self::FileHistorySnapshot(entry) => entry.snapshot.timestamp.parse().ok(),
            Self::QueueOperation(entry) => entry.timestamp.parse().ok(),
            Self::Summary(_) | Self::ParseError(_) => None,
        }
    }
}

impl MessageContent {
    /// Typed blocks, skipping bare strings. Empty for plain text content.
    pub fn blocks(&self) -> impl Iterator<Item = &ContentBlock> {
        let items: &[ContentItem] = match self {
            Self::Text(_) => &[],
            Self::Blocks(items) => items,
        };
        items.iter().filter_map(|item| match item {
            ContentItem::Block(block) => Some(block),
            ContentItem::Plain(_) => None,
        })
    }
}
