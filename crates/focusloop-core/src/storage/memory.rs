use std::collections::HashMap;
use std::sync::Mutex;

use super::Store;
use crate::error::StorageError;

/// In-process store, used by tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let docs = self.documents.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(docs.get(key).cloned())
    }

    fn put(&self, key: &str, document: &serde_json::Value) -> Result<(), StorageError> {
        let mut docs = self.documents.lock().map_err(|_| StorageError::Poisoned)?;
        docs.insert(key.to_string(), document.clone());
        Ok(())
    }
}
