//! Key-value persistent store abstraction
//!
//! Values are JSON, the same shape the browser glue writes into LocalStorage:
//! byte buffers as arrays of integers, base64 SRAM as a string.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistent store unavailable: {0}")]
    Unavailable(String),

    #[error("stored value under {key} is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// External key-value store holding every persisted entry
pub trait PersistentStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Overwrites any existing value (last write wins)
    fn put(&mut self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Removing an absent key is not an error
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;

    /// Every key currently stored, in no particular order
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: PersistentStore + ?Sized> PersistentStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        (**self).keys()
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        (**self).contains(key)
    }
}

/// In-memory store, used natively and in tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Byte buffer as a JSON array of integers
pub fn bytes_to_value(bytes: &[u8]) -> Value {
    Value::Array(bytes.iter().map(|&b| Value::from(b)).collect())
}

/// Read a byte buffer back from a stored value
///
/// Accepts integer arrays and legacy binary strings (one char per byte).
/// Anything else, or an element outside `0..=255`, gives `None`.
pub fn value_to_bytes(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
            .collect(),
        Value::String(s) => s.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect(),
        _ => None,
    }
}
