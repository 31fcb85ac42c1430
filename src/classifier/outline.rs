//! Presentation-neutral outline of one record

use serde::Serialize;
use serde_json::Value;

use super::{Alignment, ToolResultIndex, display_alignment};
use crate::models::{ContentBlock, ContentItem, ConversationRecord, MessageContent, ToolResultContent};

/// Longest preview of tool input or output, in characters
const PREVIEW_CHARS: usize = 200;

/// What a renderer needs to show one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordOutline {
    pub key: String,
    pub label: String,
    pub alignment: Alignment,
    pub is_error: bool,
    pub lines: Vec<String>,
}

pub fn outline_record(record: &ConversationRecord, tool_results: &ToolResultIndex) -> RecordOutline {
    let (label, lines) = match record {
        ConversationRecord::User(entry) => ("User".to_string(), content_lines(&entry.message.content, tool_results)),
        ConversationRecord::Assistant(entry) => {
            let label = match &entry.message.model {
                Some(model) => format!("Assistant ({})", model),
                None => "Assistant".to_string(),
            };
            (label, content_lines(&entry.message.content, tool_results))
        }
        ConversationRecord::System(entry) => {
            let label = match &entry.subtype {
                Some(subtype) => format!("System: {}", subtype),
                None => "System".to_string(),
            };
            (label, entry.content.as_deref().map(text_lines).unwrap_or_default())
        }
        ConversationRecord::Summary(entry) => ("Summary".to_string(), text_lines(&entry.summary)),
        ConversationRecord::FileHistorySnapshot(entry) => {
            let count = entry.snapshot.tracked_file_backups.len();
            let mut line = format!("{} {}", count, if count == 1 { "file" } else { "files" });
            if entry.is_snapshot_update {
                line.push_str(" (update)");
            }
            ("File History Snapshot".to_string(), vec![line])
        }
        ConversationRecord::QueueOperation(entry) => {
            let mut lines = vec![entry.operation.clone()];
            if let Some(content) = &entry.content {
                lines.extend(text_lines(content));
            }
            ("Queue".to_string(), lines)
        }
        ConversationRecord::ParseError(entry) => ("Schema Error".to_string(), vec![entry.line.clone()]),
    };

    RecordOutline {
        key: record.key(),
        label,
        alignment: display_alignment(record),
        is_error: record.is_error(),
        lines,
    }
}

fn text_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

fn content_lines(content: &MessageContent, tool_results: &ToolResultIndex) -> Vec<String> {
    let items = match content {
        MessageContent::Text(text) => return text_lines(text),
        MessageContent::Blocks(items) => items,
    };

    let mut lines = Vec::new();
    for item in items {
        match item {
            ContentItem::Plain(text) => lines.extend(text_lines(text)),
            ContentItem::Block(block) => lines.extend(block_lines(block, tool_results)),
        }
    }
    lines
}

fn block_lines(block: &ContentBlock, tool_results: &ToolResultIndex) -> Vec<String> {
    match block {
        ContentBlock::Text { text } => text_lines(text),
        ContentBlock::Thinking { thinking, .. } => {
            text_lines(thinking).into_iter().map(|l| format!("[thinking] {}", l)).collect()
        }
        ContentBlock::RedactedThinking { .. } => vec!["[redacted thinking]".to_string()],
        ContentBlock::ToolUse { id, name, input } => {
            let mut lines = vec![format!("→ {} {}", name, preview(&compact(input)))];
            match tool_results.get(id) {
                Some(result) => lines.push(format!("{} {}", result_marker(result), preview(&result_text(result)))),
                None => lines.push("← (no result)".to_string()),
            }
            lines
        }
        ContentBlock::ToolResult(result) => {
            vec![format!("[tool result {}] {}", result.tool_use_id, preview(&result_text(result)))]
        }
        ContentBlock::Image { .. } => vec!["[image]".to_string()],
        ContentBlock::Document { .. } => vec!["[document]".to_string()],
    }
}

fn result_marker(result: &ToolResultContent) -> &'static str {
    if result.is_error == Some(true) { "← error:" } else { "←" }
}

/// Text of a tool result: a string, the text blocks of an array, or compact JSON
fn result_text(result: &ToolResultContent) -> String {
    match &result.content {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => {
            let texts: Vec<&str> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.as_str()),
                    other => other.get("text").and_then(Value::as_str),
                })
                .collect();
            if texts.is_empty() { compact(&result.content) } else { texts.join(" ") }
        }
        other => compact(other),
    }
}

fn compact(value: &Value) -> String {
    value.to_string()
}

/// Single-line, length-limited preview
fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    cut.push('…');
    cut
}
