//! Field-level deserializers shared by record payloads

use chrono::{DateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer};

/// Timestamps appear either as epoch milliseconds or as RFC 3339 text
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
}

pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Millis(ms) => DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| D::Error::custom(format!("timestamp {} out of range", ms))),
        RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|e| D::Error::custom(format!("invalid timestamp {:?}: {}", text, e))),
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use crate::models::SystemEntry;

    #[test]
    fn test_system_entry_timestamp_integer() {
        let json = r#"{
            "uuid": "550e8400-e29b-41d4-a716-446655440000",
            "timestamp": 1762076480016,
            "content": "compacted"
        }"#;

        let entry: SystemEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.content.as_deref(), Some("compacted"));

        // Nov 2, 2025 09:41:20 UTC
        let expected_ts = DateTime::from_timestamp_millis(1762076480016).unwrap();
        assert_eq!(entry.timestamp, expected_ts);
    }

    #[test]
    fn test_system_entry_timestamp_rfc3339() {
        let json = r#"{
            "uuid": "550e8400-e29b-41d4-a716-446655440001",
            "timestamp": "2025-11-02T09:41:20.016Z"
        }"#;

        let entry: SystemEntry = serde_json::from_str(json).unwrap();
        let expected_ts = DateTime::from_timestamp_millis(1762076480016).unwrap();
        assert_eq!(entry.timestamp, expected_ts);
        assert!(!entry.is_sidechain);
    }

    #[test]
    fn test_timestamp_rejects_other_types() {
        let json = r#"{"uuid": "x", "timestamp": true}"#;
        assert!(serde_json::from_str::<SystemEntry>(json).is_err());

        let json = r#"{"uuid": "x", "timestamp": "yesterday"}"#;
        assert!(serde_json::from_str::<SystemEntry>(json).is_err());
    }
}
