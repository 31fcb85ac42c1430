//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use convo_viewer::scanner::MIN_FILE_SIZE_BYTES;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Builder for a directory tree of transcripts on disk
pub struct ProjectsDirBuilder {
    temp_dir: TempDir,
}

impl ProjectsDirBuilder {
    /// Create a new builder with an empty root directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a transcript inside `folder` (a slash-separated relative path, or "" for the root)
    pub fn with_transcript(self, folder: &str, transcript: TranscriptBuilder) -> Self {
        let dir = self.temp_dir.path().join(folder);
        fs::create_dir_all(&dir).expect("Failed to create folder");
        transcript.create_in(&dir);
        self
    }

    /// Add an arbitrary file at a relative path
    pub fn with_file(self, relative: &str, contents: &str) -> Self {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, contents).expect("Failed to write file");
        self
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for ProjectsDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one `.jsonl` transcript file
pub struct TranscriptBuilder {
    filename: String,
    lines: Vec<String>,
    padded: bool,
    modified_secs: Option<u64>,
}

impl TranscriptBuilder {
    /// New transcript, padded past the minimum scan size
    pub fn new(filename: &str) -> Self {
        Self { filename: filename.to_string(), lines: Vec::new(), padded: true, modified_secs: None }
    }

    pub fn with_entry(mut self, entry: EntryBuilder) -> Self {
        self.lines.push(entry.to_json());
        self
    }

    /// Append a raw line verbatim (for malformed input)
    pub fn with_raw_line(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    /// Do not pad; the file stays below the minimum scan size
    pub fn unpadded(mut self) -> Self {
        self.padded = false;
        self
    }

    /// Set the modification time in seconds since the epoch
    pub fn modified_at(mut self, secs: u64) -> Self {
        self.modified_secs = Some(secs);
        self
    }

    /// File contents as written to disk
    pub fn contents(&self) -> String {
        let mut text = self.lines.join("\n");
        if self.padded {
            // Whitespace-only lines are ignored by the parser
            text.push('\n');
            text.push_str(&" ".repeat(MIN_FILE_SIZE_BYTES as usize));
        }
        text
    }

    /// Create the file in the given directory and return its path
    pub fn create_in(&self, dir: &Path) -> PathBuf {
        let path = dir.join(&self.filename);
        fs::write(&path, self.contents()).expect("Failed to write transcript");
        if let Some(secs) = self.modified_secs {
            set_modified(&path, secs);
        }
        path
    }
}

/// Set a file's modification time in seconds since the epoch
pub fn set_modified(path: &Path, secs: u64) {
    let file = fs::File::options().write(true).open(path).expect("Failed to open file");
    file.set_modified(UNIX_EPOCH + Duration::from_secs(secs)).expect("Failed to set mtime");
}

/// Builder for transcript records
pub struct EntryBuilder {
    value: Value,
}

impl EntryBuilder {
    fn message(kind: &str, text: &str) -> Self {
        Self {
            value: json!({
                "type": kind,
                "uuid": uuid::Uuid::new_v4().to_string(),
                "parentUuid": null,
                "isSidechain": false,
                "sessionId": "550e8400-e29b-41d4-a716-446655440000",
                "timestamp": "2025-01-15T10:30:00.000Z",
                "message": {"role": kind, "content": text},
            }),
        }
    }

    /// User message with plain string content
    pub fn user(text: &str) -> Self {
        Self::message("user", text)
    }

    /// Assistant message with plain string content
    pub fn assistant(text: &str) -> Self {
        Self::message("assistant", text)
    }

    pub fn summary(text: &str) -> Self {
        Self { value: json!({"type": "summary", "summary": text, "leafUuid": uuid::Uuid::new_v4().to_string()}) }
    }

    pub fn file_history_snapshot(files: &[&str], update: bool) -> Self {
        let backups: serde_json::Map<String, Value> =
            files.iter().map(|f| (f.to_string(), json!({"backupFileName": null, "version": 1}))).collect();
        let message_id = uuid::Uuid::new_v4().to_string();
        Self {
            value: json!({
                "type": "file-history-snapshot",
                "messageId": message_id,
                "isSnapshotUpdate": update,
                "snapshot": {"messageId": message_id, "trackedFileBackups": backups, "timestamp": "2025-01-15T10:30:00.000Z"},
            }),
        }
    }

    pub fn queue_operation(operation: &str) -> Self {
        Self {
            value: json!({
                "type": "queue-operation",
                "operation": operation,
                "sessionId": "550e8400-e29b-41d4-a716-446655440000",
                "timestamp": "2025-01-15T10:30:00.000Z",
            }),
        }
    }

    /// Replace the message content with content blocks
    pub fn blocks(mut self, blocks: Vec<Value>) -> Self {
        self.value["message"]["content"] = Value::Array(blocks);
        self
    }

    pub fn sidechain(mut self) -> Self {
        self.value["isSidechain"] = json!(true);
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.value["message"]["model"] = json!(model);
        self
    }

    pub fn uuid(mut self, uuid: &str) -> Self {
        self.value["uuid"] = json!(uuid);
        self
    }

    pub fn text_block(text: &str) -> Value {
        json!({"type": "text", "text": text})
    }

    pub fn thinking_block(text: &str) -> Value {
        json!({"type": "thinking", "thinking": text, "signature": "sig"})
    }

    pub fn tool_use_block(id: &str, name: &str, input: Value) -> Value {
        json!({"type": "tool_use", "id": id, "name": name, "input": input})
    }

    pub fn tool_result_block(tool_use_id: &str, content: Value, is_error: bool) -> Value {
        json!({"type": "tool_result", "tool_use_id": tool_use_id, "content": content, "is_error": is_error})
    }

    pub fn to_json(&self) -> String {
        self.value.to_string()
    }
}

/// A small realistic tree: two project folders and a root-level transcript
pub fn realistic_projects_dir() -> TempDir {
    ProjectsDirBuilder::new()
        .with_transcript(
            "-Users-test-api",
            TranscriptBuilder::new("first.jsonl")
                .with_entry(EntryBuilder::user("Fix the login handler"))
                .with_entry(EntryBuilder::assistant("Looking at it now").model("model-a"))
                .modified_at(1_700_000_000),
        )
        .with_transcript(
            "-Users-test-api",
            TranscriptBuilder::new("second.jsonl")
                .with_entry(EntryBuilder::user("Add rate limiting"))
                .modified_at(1_700_000_100),
        )
        .with_transcript(
            "-Users-test-web",
            TranscriptBuilder::new("third.jsonl")
                .with_entry(EntryBuilder::user("Style the navbar"))
                .modified_at(1_700_000_050),
        )
        .with_transcript(
            "",
            TranscriptBuilder::new("loose.jsonl")
                .with_entry(EntryBuilder::user("Loose notes"))
                .modified_at(1_700_000_200),
        )
        .with_file("-Users-test-api/notes.txt", &" ".repeat(8000))
        .with_transcript(
            "-Users-test-api",
            TranscriptBuilder::new("tiny.jsonl").with_entry(EntryBuilder::user("too small")).unpadded(),
        )
        .build()
}
