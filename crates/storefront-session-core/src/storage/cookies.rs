use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{document, StorageError};

/// Cookie jar file name inside the data directory
const COOKIE_JAR_FILE: &str = "cookies.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    /// `None` means a cookie that lives until it is removed.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Cookie {
    /// Root-scoped cookie without an expiry
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            expires_at: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn expires_in(mut self, lifetime: Duration) -> Self {
        self.expires_at = Some(Utc::now() + lifetime);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|at| Utc::now() >= at).unwrap_or(false)
    }

    fn matches(&self, name: &str, path: &str) -> bool {
        self.name == name && self.path == path
    }
}

/// Cookie storage keyed by `(name, path)`. Expired cookies read as absent and
/// removing a cookie that was never set is not an error.
pub trait CookieStore: Send + Sync {
    fn set(&self, cookie: Cookie) -> Result<(), StorageError>;
    fn get(&self, name: &str, path: &str) -> Result<Option<Cookie>, StorageError>;
    fn remove(&self, name: &str, path: &str) -> Result<(), StorageError>;
}

fn upsert(jar: &mut Vec<Cookie>, cookie: Cookie) {
    jar.retain(|c| !c.matches(&cookie.name, &cookie.path));
    jar.push(cookie);
}

fn find(jar: &[Cookie], name: &str, path: &str) -> Option<Cookie> {
    jar.iter()
        .find(|c| c.matches(name, path) && !c.is_expired())
        .cloned()
}

pub struct FileCookieStore {
    path: PathBuf,
}

impl FileCookieStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join(COOKIE_JAR_FILE),
        }
    }

    fn load(&self) -> Result<Vec<Cookie>, StorageError> {
        document::read(&self.path)
    }
}

impl CookieStore for FileCookieStore {
    fn set(&self, cookie: Cookie) -> Result<(), StorageError> {
        let mut jar = self.load()?;
        upsert(&mut jar, cookie);
        document::write(&self.path, &jar)
    }

    fn get(&self, name: &str, path: &str) -> Result<Option<Cookie>, StorageError> {
        Ok(find(&self.load()?, name, path))
    }

    fn remove(&self, name: &str, path: &str) -> Result<(), StorageError> {
        let mut jar = match self.load() {
            Ok(jar) => jar,
            Err(StorageError::Serialization(e)) => {
                warn!(cookie = name, error = %e, "Cookie jar unreadable, discarding it");
                return document::discard(&self.path);
            }
            Err(e) => return Err(e),
        };
        let before = jar.len();
        jar.retain(|c| !c.matches(name, path));
        if jar.len() != before {
            document::write(&self.path, &jar)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCookieStore {
    jar: Mutex<Vec<Cookie>>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieStore for MemoryCookieStore {
    fn set(&self, cookie: Cookie) -> Result<(), StorageError> {
        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        upsert(&mut jar, cookie);
        Ok(())
    }

    fn get(&self, name: &str, path: &str) -> Result<Option<Cookie>, StorageError> {
        let jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(find(&jar, name, path))
    }

    fn remove(&self, name: &str, path: &str) -> Result<(), StorageError> {
        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        jar.retain(|c| !c.matches(name, path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_cookie_reads_as_absent() {
        let jar = MemoryCookieStore::new();
        jar.set(Cookie::new("access_token", "a").expires_in(Duration::minutes(-1)))
            .unwrap();
        jar.set(Cookie::new("refresh_token", "r").expires_in(Duration::days(7)))
            .unwrap();

        assert_eq!(jar.get("access_token", "/").unwrap(), None);
        assert_eq!(jar.get("refresh_token", "/").unwrap().unwrap().value, "r");
    }

    #[test]
    fn test_cookies_are_scoped_by_path() {
        let jar = MemoryCookieStore::new();
        jar.set(Cookie::new("user", "root")).unwrap();
        jar.set(Cookie::new("user", "admin").with_path("/admin")).unwrap();

        jar.remove("user", "/").unwrap();
        assert_eq!(jar.get("user", "/").unwrap(), None);
        assert_eq!(jar.get("user", "/admin").unwrap().unwrap().value, "admin");
    }

    #[test]
    fn test_set_replaces_existing_cookie() {
        let jar = MemoryCookieStore::new();
        jar.set(Cookie::new("user", "one")).unwrap();
        jar.set(Cookie::new("user", "two")).unwrap();
        assert_eq!(jar.get("user", "/").unwrap().unwrap().value, "two");
    }

    #[test]
    fn test_file_cookie_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        FileCookieStore::new(dir.path().to_path_buf())
            .set(Cookie::new("refresh_token", "r"))
            .unwrap();

        let reopened = FileCookieStore::new(dir.path().to_path_buf());
        assert!(reopened.get("refresh_token", "/").unwrap().is_some());
        reopened.remove("refresh_token", "/").unwrap();
        reopened.remove("never_set", "/").unwrap();
        assert!(reopened.get("refresh_token", "/").unwrap().is_none());
    }

    #[test]
    fn test_remove_from_corrupt_jar_drops_it() {
        let dir = tempfile::tempdir().unwrap();
        let jar = FileCookieStore::new(dir.path().to_path_buf());
        jar.set(Cookie::new("access_token", "a")).unwrap();
        std::fs::write(&jar.path, "[{\"name\": \"acc").unwrap();

        jar.remove("access_token", "/").unwrap();
        assert!(!jar.path.exists());
        assert!(jar.get("access_token", "/").unwrap().is_none());
    }
}
