//! In-memory storage.
//!
//! Used by tests and by front-ends that do not want the session to outlive
//! the process.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::{Result, StoreError};
use crate::SessionStorage;

/// A `SessionStorage` backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    fail_writes: Mutex<bool>,
}

impl MemoryStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-populated with `entries`.
    #[must_use]
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let storage = Self::new();
        {
            let mut values = storage.values.lock();
            for (key, value) in entries {
                values.insert((*key).to_string(), (*value).to_string());
            }
        }
        storage
    }

    /// Make every subsequent write fail, simulating a full or read-only disk.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }

    /// Returns `true` if `key` currently holds a value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.lock().contains_key(key)
    }

    fn check_writable(&self) -> Result<()> {
        if *self.fail_writes.lock() {
            return Err(StoreError::Database("storage is read-only".to_string()));
        }
        Ok(())
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn put_batch(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.check_writable()?;
        let mut values = self.values.lock();
        for (key, value) in entries {
            values.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_batch(&self, keys: &[&str]) -> Result<()> {
        self.check_writable()?;
        let mut values = self.values.lock();
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_writes_leave_values_intact() {
        let storage = MemoryStorage::with_entries(&[("token", "abc")]);
        storage.fail_writes(true);

        assert!(storage.put_batch(&[("token", "xyz")]).is_err());
        assert!(storage.remove_batch(&["token"]).is_err());
        assert_eq!(storage.get("token").unwrap().as_deref(), Some("abc"));

        storage.fail_writes(false);
        storage.remove_batch(&["token"]).unwrap();
        assert!(!storage.contains("token"));
    }
}
