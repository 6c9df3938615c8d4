/*!
# Character Persistence

Last known position per account. The zone reads it when a player connects
and writes it back when they leave; nothing else is stored.
*/

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;

/// A panic elsewhere while holding the map leaves it intact; keep using it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub trait CharacterStore: Send + Sync {
    fn find_character(&self, user_id: &str) -> Option<(f32, f32)>;

    fn upsert_character(&self, user_id: &str, x: f32, y: f32) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredPosition {
    pub x: f32,
    pub y: f32,
}

/// Process-local store. Also records every upsert, in order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    positions: Mutex<HashMap<String, StoredPosition>>,
    upserts: Mutex<Vec<(String, f32, f32)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_character(self, user_id: &str, x: f32, y: f32) -> Self {
        lock(&self.positions).insert(user_id.to_string(), StoredPosition { x, y });
        self
    }

    pub fn upserts(&self) -> Vec<(String, f32, f32)> {
        lock(&self.upserts).clone()
    }
}

impl CharacterStore for MemoryStore {
    fn find_character(&self, user_id: &str) -> Option<(f32, f32)> {
        lock(&self.positions)
            .get(user_id)
            .map(|stored| (stored.x, stored.y))
    }

    fn upsert_character(&self, user_id: &str, x: f32, y: f32) -> Result<(), StoreError> {
        lock(&self.positions).insert(user_id.to_string(), StoredPosition { x, y });
        lock(&self.upserts).push((user_id.to_string(), x, y));
        Ok(())
    }
}

/// A JSON object of `user_id -> {x, y}` on disk, loaded once and rewritten
/// on every upsert.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    positions: Mutex<HashMap<String, StoredPosition>>,
}

impl JsonFileStore {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let positions = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            HashMap::new()
        };
        info!(path = %path.display(), characters = positions.len(), "character store opened");
        Ok(Self {
            path,
            positions: Mutex::new(positions),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CharacterStore for JsonFileStore {
    fn find_character(&self, user_id: &str) -> Option<(f32, f32)> {
        lock(&self.positions)
            .get(user_id)
            .map(|stored| (stored.x, stored.y))
    }

    fn upsert_character(&self, user_id: &str, x: f32, y: f32) -> Result<(), StoreError> {
        let mut positions = lock(&self.positions);
        positions.insert(user_id.to_string(), StoredPosition { x, y });
        let content = serde_json::to_string_pretty(&*positions)?;
        fs::write(&self.path, content)?;
        debug!(user_id, x, y, "character position saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_records_upserts() {
        let store = MemoryStore::new().with_character("a", 1.0, 2.0);
        assert_eq!(store.find_character("a"), Some((1.0, 2.0)));
        assert_eq!(store.find_character("b"), None);

        store.upsert_character("a", 5.0, 7.0).unwrap();
        assert_eq!(store.find_character("a"), Some((5.0, 7.0)));
        assert_eq!(store.upserts(), vec![("a".to_string(), 5.0, 7.0)]);
    }

    #[test]
    fn memory_store_keeps_writing_after_a_panic_under_the_lock() {
        let store = MemoryStore::new().with_character("a", 1.0, 2.0);
        let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _positions = store.positions.lock().unwrap();
            let _upserts = store.upserts.lock().unwrap();
            panic!("handler blew up mid-save");
        }));
        assert!(panicked.is_err());
        assert!(store.positions.is_poisoned());

        store.upsert_character("a", 5.0, 7.0).unwrap();

        assert_eq!(store.find_character("a"), Some((5.0, 7.0)));
        assert_eq!(store.upserts(), vec![("a".to_string(), 5.0, 7.0)]);
    }

    #[test]
    fn json_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("characters.json");

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.find_character("u1"), None);
        store.upsert_character("u1", 3.5, -4.0).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.find_character("u1"), Some((3.5, -4.0)));
    }

    #[test]
    fn json_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("characters.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Json(_))));
    }

    #[test]
    fn json_store_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("missing").join("characters.json")).unwrap();

        assert!(matches!(store.upsert_character("u1", 0.0, 0.0), Err(StoreError::Io(_))));
    }
}
