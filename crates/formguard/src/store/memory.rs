//! In-process store, also used as the per-request snapshot of a session.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{KeyValueStore, SessionKey};
use crate::error::StoreResult;

/// A [`KeyValueStore`] held in memory.
///
/// Tracks whether anything was written since construction so a session bridge
/// can skip the write-back when a request only read from it.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, String>>,
    dirty: AtomicBool,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with raw entries (not marked dirty).
    pub fn from_entries(entries: HashMap<String, String>) -> Self {
        Self {
            entries: Mutex::new(entries),
            dirty: AtomicBool::new(false),
        }
    }

    /// Snapshot of all raw entries.
    pub fn entries(&self) -> HashMap<String, String> {
        self.entries.lock().clone()
    }

    /// Whether any entry changed since construction.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Relaxed);
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &SessionKey) -> StoreResult<Option<String>> {
        Ok(self.entries.lock().get(&key.to_string()).cloned())
    }

    fn set(&self, key: &SessionKey, value: String) -> StoreResult<()> {
        self.entries.lock().insert(key.to_string(), value);
        self.mark_dirty();
        Ok(())
    }

    fn consume(&self, key: &SessionKey) -> StoreResult<Option<String>> {
        let removed = self.entries.lock().remove(&key.to_string());
        if removed.is_some() {
            self.mark_dirty();
        }
        Ok(removed)
    }
}
