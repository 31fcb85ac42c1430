//! Summary cache record

use serde::{Deserialize, Serialize};

/// Values that carry their own store key
pub trait Keyed {
    fn key(&self) -> &str;
}

/// One persisted summary, keyed by `path`.
///
/// Valid only while `size` and `last_modified` both match the file exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub path: String,
    pub folder: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "lastModified")]
    pub last_modified: i64,
    pub summary: String,
}

impl CacheEntry {
    /// Check if the entry still describes a file with this size and mtime
    pub fn is_fresh(&self, size: u64, last_modified: i64) -> bool {
        self.size == size && self.last_modified == last_modified
    }
}

impl Keyed for CacheEntry {
    fn key(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_fresh_requires_exact_match() {
        let entry = CacheEntry {
            path: "p/a.jsonl".to_string(),
            folder: "p".to_string(),
            name: "a.jsonl".to_string(),
            size: 6000,
            last_modified: 100,
            summary: "hi".to_string(),
        };

        assert!(entry.is_fresh(6000, 100));
        assert!(!entry.is_fresh(6000, 101));
        assert!(!entry.is_fresh(6001, 100));
    }

    #[test]
    fn test_wire_shape() {
        let json = r#"{"path":"a.jsonl","folder":"(root)","name":"a.jsonl","size":5120,"lastModified":7,"summary":""}"#;
        let entry: CacheEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.last_modified, 7);
        assert_eq!(serde_json::to_string(&entry).unwrap(), json);
    }
}
