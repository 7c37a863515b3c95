//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStorage` implementation of the
//! `SessionStorage` trait.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options,
    WriteBatch, WriteOptions,
};

use crate::error::{Result, StoreError};
use crate::keys::SESSION_CF;
use crate::SessionStorage;

/// RocksDB-backed session storage.
pub struct RocksStorage {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStorage {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(SESSION_CF, Options::default())];

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get the session column family handle.
    fn cf(&self) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(SESSION_CF)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {SESSION_CF}")))
    }

    /// Synchronous writes so every batch survives a process crash.
    fn write_options() -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(true);
        opts
    }
}

impl SessionStorage for RocksStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let cf = self.cf()?;

        self.db
            .get_cf(&cf, key.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| {
                String::from_utf8(data).map_err(|e| StoreError::Serialization(e.to_string()))
            })
            .transpose()
    }

    fn put_batch(&self, entries: &[(&str, &str)]) -> Result<()> {
        let cf = self.cf()?;

        let mut batch = WriteBatch::default();
        for (key, value) in entries {
            batch.put_cf(&cf, key.as_bytes(), value.as_bytes());
        }

        self.db
            .write_opt(batch, &Self::write_options())
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn remove_batch(&self, keys: &[&str]) -> Result<()> {
        let cf = self.cf()?;

        let mut batch = WriteBatch::default();
        for key in keys {
            batch.delete_cf(&cf, key.as_bytes());
        }

        self.db
            .write_opt(batch, &Self::write_options())
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{TOKEN, USER};
    use tempfile::TempDir;

    fn create_test_storage() -> (RocksStorage, TempDir) {
        let dir = TempDir::new().unwrap();
        let storage = RocksStorage::open(dir.path()).unwrap();
        (storage, dir)
    }

    #[test]
    fn batch_put_get_remove() {
        let (storage, _dir) = create_test_storage();
        assert!(storage.get(TOKEN).unwrap().is_none());

        storage
            .put_batch(&[(TOKEN, "abc"), (USER, r#"{"id":1}"#)])
            .unwrap();
        assert_eq!(storage.get(TOKEN).unwrap().as_deref(), Some("abc"));
        assert_eq!(storage.get(USER).unwrap().as_deref(), Some(r#"{"id":1}"#));

        storage.remove_batch(&[TOKEN, USER]).unwrap();
        assert!(storage.get(TOKEN).unwrap().is_none());
        assert!(storage.get(USER).unwrap().is_none());
    }

    #[test]
    fn remove_absent_keys_is_ok() {
        let (storage, _dir) = create_test_storage();
        storage.remove_batch(&[TOKEN, USER]).unwrap();
    }

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let storage = RocksStorage::open(dir.path()).unwrap();
            storage.put_batch(&[(TOKEN, "persisted")]).unwrap();
        }

        let reopened = RocksStorage::open(dir.path()).unwrap();
        assert_eq!(reopened.get(TOKEN).unwrap().as_deref(), Some("persisted"));
    }
}
