//! Stores whose every operation fails, for exercising error paths.

use std::io;

use super::{Cookie, CookieStore, LocalStore, StorageError};

fn disk_full() -> StorageError {
    StorageError::Io(io::Error::other("disk full"))
}

pub struct FailingStore;

impl LocalStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(disk_full())
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(disk_full())
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(disk_full())
    }
}

pub struct FailingCookieStore;

impl CookieStore for FailingCookieStore {
    fn set(&self, _cookie: Cookie) -> Result<(), StorageError> {
        Err(disk_full())
    }

    fn get(&self, _name: &str, _path: &str) -> Result<Option<Cookie>, StorageError> {
        Err(disk_full())
    }

    fn remove(&self, _name: &str, _path: &str) -> Result<(), StorageError> {
        Err(disk_full())
    }
}
