use std::sync::Arc;

use tracing::{debug, warn};

use super::{CookieStore, LocalStore, StorageError};
use crate::models::{CredentialToken, UserRecord};

/// Local storage key for the bearer credential
pub const TOKEN_KEY: &str = "token";

/// Local storage key for the JSON-serialized user record
pub const USER_KEY: &str = "user";

/// Cookies that belong to a session and are dropped on logout
pub const SESSION_COOKIES: [&str; 3] = ["access_token", "refresh_token", "user"];

/// Session cookies are always scoped to the root path
pub const COOKIE_PATH: &str = "/";

/// Facade over the two storage mediums a session lives in.
/// Clone is cheap; handles share the same underlying stores.
#[derive(Clone)]
pub struct TokenStore {
    local: Arc<dyn LocalStore>,
    cookies: Arc<dyn CookieStore>,
}

impl TokenStore {
    pub fn new(local: Arc<dyn LocalStore>, cookies: Arc<dyn CookieStore>) -> Self {
        Self { local, cookies }
    }

    // ===== Token =====

    pub fn save_token(&self, token: &CredentialToken) -> Result<(), StorageError> {
        self.local.set(TOKEN_KEY, token.as_str())
    }

    pub fn token(&self) -> Result<Option<CredentialToken>, StorageError> {
        Ok(self.local.get(TOKEN_KEY)?.and_then(CredentialToken::new))
    }

    pub fn remove_token(&self) -> Result<(), StorageError> {
        self.local.remove(TOKEN_KEY)
    }

    // ===== User =====

    pub fn save_user(&self, user: &UserRecord) -> Result<(), StorageError> {
        let json = serde_json::to_string(user)?;
        self.local.set(USER_KEY, &json)
    }

    /// Load the cached user record. A record that no longer parses is logged
    /// and treated as missing.
    pub fn load_user(&self) -> Result<Option<UserRecord>, StorageError> {
        let Some(json) = self.local.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable stored user record");
                Ok(None)
            }
        }
    }

    pub fn remove_user(&self) -> Result<(), StorageError> {
        self.local.remove(USER_KEY)
    }

    /// A token was saved by a callback that never got as far as storing a user.
    pub fn has_pending_callback(&self) -> Result<bool, StorageError> {
        Ok(self.token()?.is_some() && self.local.get(USER_KEY)?.is_none())
    }

    // ===== Teardown =====

    /// Remove every session cookie at the root path.
    pub fn clear_cookies(&self) {
        for name in SESSION_COOKIES {
            if let Err(e) = self.cookies.remove(name, COOKIE_PATH) {
                warn!(cookie = name, error = %e, "Failed to remove cookie");
            }
        }
    }

    /// Remove the token, the user record and the session cookies.
    ///
    /// Every removal is attempted even if an earlier one failed; missing keys
    /// are not errors and nothing is reported to the caller.
    pub fn clear(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.local.remove(key) {
                warn!(key, error = %e, "Failed to remove stored key");
            }
        }
        self.clear_cookies();
        debug!("Token store cleared");
    }
}
