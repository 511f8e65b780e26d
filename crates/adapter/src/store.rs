//! JSON file score store
//!
//! Keeps every entry in one JSON object, each value wrapped as
//! `{"value": n}`:
//!
//! ```text
//! {"score":{"value":150}}
//! ```
//!
//! The whole file is rewritten through a temporary sibling on every change.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::ScoreStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct StoredValue {
    value: u32,
}

/// Score store backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, StoredValue>,
}

impl JsonFileStore {
    /// Load `path`, or start empty when it does not exist yet
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        debug!(path = %path.display(), entries = entries.len(), "score store opened");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> io::Result<()> {
        let json = serde_json::to_vec(&self.entries)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)
    }
}

impl ScoreStore for JsonFileStore {
    fn set(&mut self, key: &str, value: u32) -> io::Result<()> {
        self.entries.insert(key.to_string(), StoredValue { value });
        self.flush()
    }

    fn get(&self, key: &str) -> io::Result<Option<u32>> {
        Ok(self.entries.get(key).map(|v| v.value))
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.entries.clear();
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("none.json")).unwrap();
        assert_eq!(store.get("score").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("score.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("score", 150).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"{"score":{"value":150}}"#
        );

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("score").unwrap(), Some(150));
    }

    #[test]
    fn test_corrupt_file_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("score.json");
        fs::write(&path, "not json").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_remove_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path().join("s.json")).unwrap();
        store.set("score", 10).unwrap();
        store.set("other", 20).unwrap();

        store.remove("score").unwrap();
        assert_eq!(store.get("score").unwrap(), None);
        assert_eq!(store.get("other").unwrap(), Some(20));

        store.clear().unwrap();
        assert_eq!(store.get("other").unwrap(), None);
    }
}
