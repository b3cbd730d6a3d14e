//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: where
//! the identity service lives, which storage backend holds the token, and
//! the routes the flows navigate to.
//!
//! Configuration is stored at `~/.config/storefront-session/config.json`.
//! `STOREFRONT_API_URL` and `STOREFRONT_DATA_DIR` override the file.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::HttpIdentityClient;
use crate::storage::{
    CookieStore, FileCookieStore, FileStore, KeyringStore, LocalStore, TokenStore,
};

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "storefront-session";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default identity service origin
const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// HTTP request timeout in seconds.
/// Identity calls otherwise have no timeout of their own.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const ENV_API_URL: &str = "STOREFRONT_API_URL";
const ENV_DATA_DIR: &str = "STOREFRONT_DATA_DIR";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
}

/// Destinations the flows navigate to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    pub login: String,
    pub home: String,
    pub root: String,
    pub account_settings: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            home: "/".to_string(),
            root: "/".to_string(),
            account_settings: "/account".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub storage_backend: StorageBackend,
    pub data_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub routes: Routes,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            storage_backend: StorageBackend::default(),
            data_dir: None,
            log_dir: None,
            routes: Routes::default(),
        }
    }
}

impl Config {
    /// Load the config file (defaults when absent) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api_base_url = url;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        self
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding local storage and the cookie jar.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn open_token_store(&self) -> Result<TokenStore> {
        let data_dir = self.data_dir()?;
        let local: Arc<dyn LocalStore> = match self.storage_backend {
            StorageBackend::File => Arc::new(FileStore::new(data_dir.clone())),
            StorageBackend::Keyring => Arc::new(KeyringStore::new(APP_NAME)),
        };
        let cookies: Arc<dyn CookieStore> = Arc::new(FileCookieStore::new(data_dir));
        Ok(TokenStore::new(local, cookies))
    }

    pub fn identity_client(&self) -> Result<HttpIdentityClient> {
        HttpIdentityClient::new(&self.api_base_url, self.request_timeout())
            .context("Failed to build HTTP client")
    }
}
