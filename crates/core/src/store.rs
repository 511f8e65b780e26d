//! Store module - external key/value score storage
//!
//! The session only ever writes one numeric entry (the score under
//! [`SCORE_STORE_KEY`](crate::types::SCORE_STORE_KEY)). Backends decide how
//! that is kept; [`MemoryStore`] is the in-process one.

use std::collections::HashMap;
use std::io;

/// Key/value storage for numeric entries
pub trait ScoreStore {
    fn set(&mut self, key: &str, value: u32) -> io::Result<()>;
    fn get(&self, key: &str) -> io::Result<Option<u32>>;
    fn remove(&mut self, key: &str) -> io::Result<()>;
    fn clear(&mut self) -> io::Result<()>;
}

/// In-memory store that also records every write, in order
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, u32>,
    writes: Vec<(String, u32)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `set` call so far
    pub fn writes(&self) -> &[(String, u32)] {
        &self.writes
    }
}

impl ScoreStore for MemoryStore {
    fn set(&mut self, key: &str, value: u32) -> io::Result<()> {
        self.entries.insert(key.to_string(), value);
        self.writes.push((key.to_string(), value));
        Ok(())
    }

    fn get(&self, key: &str) -> io::Result<Option<u32>> {
        Ok(self.entries.get(key).copied())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.entries.clear();
        Ok(())
    }
}

impl<S: ScoreStore + ?Sized> ScoreStore for &mut S {
    fn set(&mut self, key: &str, value: u32) -> io::Result<()> {
        (**self).set(key, value)
    }

    fn get(&self, key: &str) -> io::Result<Option<u32>> {
        (**self).get(key)
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        (**self).remove(key)
    }

    fn clear(&mut self) -> io::Result<()> {
        (**self).clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove_clear() {
        let mut store = MemoryStore::new();
        store.set("score", 150).unwrap();
        assert_eq!(store.get("score").unwrap(), Some(150));
        store.set("score", 300).unwrap();
        assert_eq!(store.get("score").unwrap(), Some(300));
        assert_eq!(store.writes().len(), 2);

        store.remove("score").unwrap();
        assert_eq!(store.get("score").unwrap(), None);

        store.set("a", 1).unwrap();
        store.clear().unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }
}
