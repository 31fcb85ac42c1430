use std::io;

use tracing::{debug, warn};

use crate::handles::FileHandle;
use crate::models::ConversationRecord;

/// Parse one line into a record. Never fails: anything unusable becomes a
/// parse-error record holding `raw` verbatim.
pub fn parse_line(raw: &str) -> ConversationRecord {
    match serde_json::from_str::<ConversationRecord>(raw) {
        Ok(record) => record,
        Err(e) => {
            debug!(error = %e, "line did not match any record kind");
            ConversationRecord::parse_error(raw)
        }
    }
}

/// Parse a whole transcript. Lines are split on `\n`; blank lines are skipped.
pub fn parse_transcript(text: &str) -> Vec<ConversationRecord> {
    let records: Vec<ConversationRecord> =
        text.split('\n').filter(|line| !line.trim().is_empty()).map(parse_line).collect();

    let errors = records.iter().filter(|r| r.is_error()).count();
    if errors > 0 {
        warn!(errors, total = records.len(), "transcript contains unparseable lines");
    }

    records
}

/// Read a transcript through its handle and parse it
pub fn load_transcript(file: &dyn FileHandle) -> io::Result<Vec<ConversationRecord>> {
    let text = file.read_to_string()?;
    let records = parse_transcript(&text);
    debug!(file = file.name(), records = records.len(), "loaded transcript");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handles::{DirectoryHandle, MemoryDirectory};

    const USER_LINE: &str = r#"{"type":"user","uuid":"u1","timestamp":"2025-01-01T00:00:00Z","message":{"role":"user","content":"Hello"}}"#;

    #[test]
    fn test_parse_line_valid_user() {
        let record = parse_line(USER_LINE);
        assert_eq!(record.kind(), "user");
    }

    #[test]
    fn test_parse_line_syntax_and_schema_errors_keep_raw_text() {
        for raw in ["not json", r#"{"type":"unknown"}"#, r#"{"type":"user"}"#, "[1,2]"] {
            match parse_line(raw) {
                ConversationRecord::ParseError(entry) => assert_eq!(entry.line, raw),
                other => panic!("expected parse error for {:?}, got {:?}", raw, other.kind()),
            }
        }
    }

    #[test]
    fn test_parse_transcript_one_record_per_non_blank_line() {
        let text = format!("{}\n\n   \nnot json\n{}\n", USER_LINE, USER_LINE);
        let records = parse_transcript(&text);

        let kinds: Vec<&str> = records.iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, vec!["user", "x-error", "user"]);
    }

    #[test]
    fn test_parse_transcript_empty_input() {
        assert!(parse_transcript("").is_empty());
        assert!(parse_transcript("\n\n").is_empty());
    }

    #[test]
    fn test_load_transcript_reads_through_handle() {
        let dir = MemoryDirectory::new("root");
        dir.add_file("s.jsonl", format!("{}\n", USER_LINE), 0);

        let file = dir.open_file("s.jsonl").unwrap();
        let records = load_transcript(file.as_ref()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(dir.full_reads(), 1);
    }
}
