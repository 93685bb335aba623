//! In-memory key-value backend.
//!
//! # Responsibility
//! - Back tests and smoke probes with a process-local store.
//!
//! # Invariants
//! - `(key, scoped)` pairs are independent slots, mirroring the external
//!   service's isolation flag.

use super::{KeyValueStore, StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local store backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<(String, bool), String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str, scoped: bool) -> StoreResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        Ok(entries.get(&(key.to_string(), scoped)).cloned())
    }

    fn set(&self, key: &str, value: &str, scoped: bool) -> StoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        entries.insert((key.to_string(), scoped), value.to_string());
        Ok(())
    }
}
