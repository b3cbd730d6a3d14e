use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use keyring::Entry;
use tracing::warn;

use super::{document, StorageError};

/// Local storage file name inside the data directory
const LOCAL_STORE_FILE: &str = "local_storage.json";

/// Durable string key/value storage. Removing a missing key is not an error.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// JSON file in the data directory holding every key.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join(LOCAL_STORE_FILE),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        document::read(&self.path)
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        document::write(&self.path, &entries)
    }

    /// An unreadable document cannot be edited, so it is dropped whole;
    /// removal must still succeed.
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(StorageError::Serialization(e)) => {
                warn!(key, error = %e, "Local storage unreadable, discarding it");
                return document::discard(&self.path);
            }
            Err(e) => return Err(e),
        };
        if entries.remove(key).is_some() {
            document::write(&self.path, &entries)?;
        }
        Ok(())
    }
}

/// OS keychain, one entry per key under a shared service name.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, StorageError> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl LocalStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileStore::new(dir.path().to_path_buf());
        first.set("token", "abc123").unwrap();

        // a second handle sees the write, like a page reload would
        let second = FileStore::new(dir.path().to_path_buf());
        assert_eq!(second.get("token").unwrap().as_deref(), Some("abc123"));

        second.remove("token").unwrap();
        assert_eq!(first.get("token").unwrap(), None);
    }

    #[test]
    fn test_file_store_remove_missing_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        store.remove("user").unwrap();
        // nothing was written for a no-op removal
        assert!(!store.path().exists());
    }

    #[test]
    fn test_remove_from_corrupt_file_drops_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.set("token", "abc123").unwrap();
        store.set("user", r#"{"id":7}"#).unwrap();

        // cut the document short, as an interrupted write would
        let contents = std::fs::read_to_string(store.path()).unwrap();
        std::fs::write(store.path(), &contents[..contents.len() - 2]).unwrap();
        assert!(store.get("token").is_err());

        store.remove("token").unwrap();
        assert!(!store.path().exists());
        assert_eq!(store.get("token").unwrap(), None);
        assert_eq!(store.get("user").unwrap(), None);
    }

    #[test]
    fn test_write_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.set("token", "abc123").unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![LOCAL_STORE_FILE.to_string()]);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("token").unwrap(), None);
        store.set("token", "t").unwrap();
        store.set("token", "u").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("u"));
        store.remove("token").unwrap();
        store.remove("token").unwrap();
        assert_eq!(store.get("token").unwrap(), None);
    }
}
