//! Whole-file JSON documents backing the file stores.
//!
//! Every mutation reads the current document, changes it and writes it back,
//! so two handles pointing at the same path always agree.

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use super::StorageError;

/// Read a document, returning the default value when the file does not exist yet.
pub fn read<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StorageError> {
    if !path.exists() {
        return Ok(T::default());
    }
    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(&contents)?)
}

/// Write a document by replacing the file, so a crash mid-write never leaves
/// a half-written document behind.
pub fn write<T: Serialize>(path: &Path, document: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(document)?;
    let staging = path.with_extension("json.tmp");
    std::fs::write(&staging, contents)?;
    std::fs::rename(&staging, path)?;
    Ok(())
}

/// Delete a document outright. Missing files are fine.
pub fn discard(path: &Path) -> Result<(), StorageError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
