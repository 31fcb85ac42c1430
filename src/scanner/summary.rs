//! One-line summary of a transcript from its leading bytes

use serde_json::Value;

/// Maximum summary length in characters
pub const SUMMARY_MAX_CHARS: usize = 100;

/// Only this many leading bytes of a file are read for its summary
pub const SUMMARY_SCAN_BYTES: usize = 50 * 1024;

/// User lines starting with these are wrappers, not prompts
const SKIP_PREFIXES: &[&str] = &["<command", "<ide_opened_file>", "<local-", "[Tool Result]", "Caveat:"];

const SKIP_SUBSTRING: &str = "tool_use_id";

/// First usable user prompt in `text`, whitespace-collapsed and truncated.
///
/// Returns an empty string when no line qualifies, whether there were no user
/// lines at all or every candidate was filtered out.
pub fn extract_summary(text: &str) -> String {
    text.lines().filter(|line| !line.trim().is_empty()).find_map(summary_from_line).unwrap_or_default()
}

fn summary_from_line(line: &str) -> Option<String> {
    let entry: Value = serde_json::from_str(line).ok()?;
    if entry.get("type").and_then(Value::as_str) != Some("user") {
        return None;
    }

    let text = match entry.get("message").and_then(|m| m.get("content"))? {
        Value::String(s) => s.as_str(),
        Value::Array(blocks) => blocks.iter().find_map(text_block)?,
        _ => return None,
    };

    if text.is_empty()
        || SKIP_PREFIXES.iter().any(|prefix| text.starts_with(prefix))
        || text.contains(SKIP_SUBSTRING)
    {
        return None;
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed.chars().take(SUMMARY_MAX_CHARS).collect())
}

/// Non-empty text of a `text` block
fn text_block(block: &Value) -> Option<&str> {
    if block.get("type").and_then(Value::as_str) != Some("text") {
        return None;
    }
    block.get("text").and_then(Value::as_str).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_line(content: Value) -> String {
        serde_json::json!({"type": "user", "message": {"role": "user", "content": content}}).to_string()
    }

    #[test]
    fn test_plain_string_content() {
        let text = user_line(Value::from("  Fix the\n\n  flaky   test  "));
        assert_eq!(extract_summary(&text), "Fix the flaky test");
    }

    #[test]
    fn test_first_non_empty_text_block() {
        let content = serde_json::json!([
            {"type": "image", "source": {}},
            {"type": "text", "text": ""},
            {"type": "text", "text": "Second block wins"},
            {"type": "text", "text": "not this"}
        ]);
        assert_eq!(extract_summary(&user_line(content)), "Second block wins");
    }

    #[test]
    fn test_skips_non_user_and_malformed_lines() {
        let text = format!(
            "not json\n{}\n{}\n{}",
            r#"{"type":"assistant","message":{"content":"assistant text"}}"#,
            r#"{"type":"user","message":{"content":""}}"#,
            user_line(Value::from("real prompt"))
        );
        assert_eq!(extract_summary(&text), "real prompt");
    }

    #[test]
    fn test_skips_wrapper_prefixes() {
        let mut lines: Vec<String> = SKIP_PREFIXES
            .iter()
            .map(|prefix| user_line(Value::from(format!("{} something", prefix))))
            .collect();
        lines.push(user_line(Value::from("after the wrappers")));

        assert_eq!(extract_summary(&lines.join("\n")), "after the wrappers");
    }

    #[test]
    fn test_tool_use_id_anywhere_disqualifies() {
        let text = user_line(Value::from("tool_use_id: abc"));
        assert_eq!(extract_summary(&text), "");
    }

    #[test]
    fn test_truncates_to_100_chars() {
        let text = user_line(Value::from("x".repeat(250)));
        assert_eq!(extract_summary(&text).chars().count(), 100);
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let text = user_line(Value::from("é".repeat(150)));
        let summary = extract_summary(&text);
        assert_eq!(summary.chars().count(), 100);
        assert_eq!(summary.len(), 200);
    }

    #[test]
    fn test_whitespace_only_text_is_skipped() {
        let text = format!("{}\n{}", user_line(Value::from(" \n\t ")), user_line(Value::from("next")));
        assert_eq!(extract_summary(&text), "next");
    }

    #[test]
    fn test_no_candidates_yields_empty() {
        assert_eq!(extract_summary(""), "");
        assert_eq!(extract_summary("{\"type\":\"summary\"}"), "");
    }

    #[test]
    fn test_idempotent() {
        let text = user_line(Value::from("same input"));
        assert_eq!(extract_summary(&text), extract_summary(&text));
    }

    #[test]
    fn test_crlf_lines() {
        let text = format!("garbage\r\n{}\r\n", user_line(Value::from("windows line")));
        assert_eq!(extract_summary(&text), "windows line");
    }
}
