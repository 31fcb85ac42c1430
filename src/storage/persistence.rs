//! Durable storage: JSONL append-log store and remembered root, with atomic rewrites

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::entry::Keyed;
use super::store::{KeyValueStore, StoreError};

const SUMMARIES_FILENAME: &str = "summaries.jsonl";
const LAST_ROOT_FILENAME: &str = "last-root";

/// Extra log lines tolerated before the log is rewritten
const COMPACTION_SLACK: usize = 64;

/// Compute hash of canonical path for cache subdirectory isolation
/// Returns first 12 hex characters
pub fn compute_path_hash(path: &Path) -> io::Result<String> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    // Canonicalize so relative paths and symlinks share a cache
    let canonical = path.canonicalize()?;

    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    let hash = hasher.finish();

    Ok(format!("{:016x}", hash)[..12].to_string())
}

/// Location of the summary log for one scan root
pub fn summary_store_path(cache_dir: &Path, root: &Path) -> io::Result<PathBuf> {
    Ok(cache_dir.join(compute_path_hash(root)?).join(SUMMARIES_FILENAME))
}

/// Write `contents` to `path` via a temp file + rename
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(StoreError::io(parent))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents).map_err(StoreError::io(&tmp))?;
    fs::rename(&tmp, path).map_err(StoreError::io(path))?;
    Ok(())
}

/// Remember the root of the last successful scan.
///
/// The root is stored as an absolute path (canonical when it exists), so a
/// relative `--root` still resolves from any working directory.
pub fn save_last_root(cache_dir: &Path, root: &Path) -> Result<(), StoreError> {
    let absolute = root
        .canonicalize()
        .or_else(|_| std::path::absolute(root))
        .map_err(StoreError::io(root))?;
    let path = cache_dir.join(LAST_ROOT_FILENAME);
    write_atomic(&path, absolute.to_string_lossy().as_bytes())
}

/// Root remembered by [`save_last_root`], if any
pub fn load_last_root(cache_dir: &Path) -> Result<Option<PathBuf>, StoreError> {
    let path = cache_dir.join(LAST_ROOT_FILENAME);
    match fs::read_to_string(&path) {
        Ok(raw) => {
            let trimmed = raw.trim();
            Ok((!trimmed.is_empty()).then(|| PathBuf::from(trimmed)))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::Io { path, source: e }),
    }
}

fn decode_record<V: DeserializeOwned>(line: &str) -> Result<V, StoreError> {
    serde_json::from_str(line).map_err(StoreError::Decode)
}

struct LogState<V> {
    entries: HashMap<String, V>,
    log_lines: usize,
}

/// Key-value store persisted as a JSON-lines append log.
///
/// Every `put` appends one record; on open the log is replayed and the last
/// record for a key wins. Lines that fail to decode are skipped. When the log
/// holds far more lines than live keys it is rewritten atomically.
pub struct JsonlStore<V> {
    path: PathBuf,
    state: Mutex<LogState<V>>,
    _marker: PhantomData<fn() -> V>,
}

impl<V> JsonlStore<V>
where
    V: Keyed + Serialize + DeserializeOwned + Clone,
{
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::io(parent))?;
        }

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(StoreError::Io { path, source: e }),
        };

        let mut entries = HashMap::new();
        let mut log_lines = 0;
        let mut skipped = 0;
        let mut last_error = None;
        for line in raw.lines().filter(|l| !l.trim().is_empty()) {
            log_lines += 1;
            match decode_record::<V>(line) {
                Ok(value) => {
                    entries.insert(value.key().to_string(), value);
                }
                Err(e) => {
                    skipped += 1;
                    last_error = Some(e);
                }
            }
        }
        if let Some(error) = last_error {
            warn!(path = %path.display(), skipped, %error, "skipped corrupt cache records");
        }
        debug!(path = %path.display(), entries = entries.len(), log_lines, "opened cache store");

        let store = Self { path, state: Mutex::new(LogState { entries, log_lines }), _marker: PhantomData };
        {
            let mut state = store.state.lock().map_err(|_| StoreError::Poisoned)?;
            store.compact_if_needed(&mut state)?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn compact_if_needed(&self, state: &mut LogState<V>) -> Result<(), StoreError> {
        if state.log_lines <= state.entries.len() * 2 + COMPACTION_SLACK {
            return Ok(());
        }

        let mut keys: Vec<&String> = state.entries.keys().collect();
        keys.sort();
        let mut buffer = Vec::new();
        for key in keys {
            serde_json::to_writer(&mut buffer, &state.entries[key]).map_err(StoreError::Encode)?;
            buffer.push(b'\n');
        }
        write_atomic(&self.path, &buffer)?;

        debug!(path = %self.path.display(), from = state.log_lines, to = state.entries.len(), "compacted cache log");
        state.log_lines = state.entries.len();
        Ok(())
    }
}

impl<V> KeyValueStore<String, V> for JsonlStore<V>
where
    V: Keyed + Serialize + DeserializeOwned + Clone + Send,
{
    fn get(&self, key: &String) -> Result<Option<V>, StoreError> {
        let state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(state.entries.get(key).cloned())
    }

    fn put(&self, key: String, value: V) -> Result<(), StoreError> {
        if value.key() != key {
            return Err(StoreError::KeyMismatch { expected: key, found: value.key().to_string() });
        }

        let mut line = serde_json::to_vec(&value).map_err(StoreError::Encode)?;
        line.push(b'\n');

        let mut state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(StoreError::io(&self.path))?;
        file.write_all(&line).map_err(StoreError::io(&self.path))?;

        state.entries.insert(key, value);
        state.log_lines += 1;
        self.compact_if_needed(&mut state)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        write_atomic(&self.path, b"")?;
        state.entries.clear();
        state.log_lines = 0;
        Ok(())
    }
}
