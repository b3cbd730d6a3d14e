//! Client-side persistence for the credential token and cached user record.
//!
//! Two independent mediums are involved:
//! - `LocalStore`: durable key/value storage that survives restarts and never
//!   expires on its own (file, OS keychain, or in-memory for tests)
//! - `CookieStore`: cookie jar whose entries carry their own expiry
//!
//! `TokenStore` is the facade the flows use; it knows which keys belong to a
//! session and how to tear them all down.

pub mod cookies;
pub mod document;
pub mod error;
#[cfg(test)]
pub(crate) mod failing;
pub mod local;
pub mod token_store;

pub use cookies::{Cookie, CookieStore, FileCookieStore, MemoryCookieStore};
pub use error::StorageError;
pub use local::{FileStore, KeyringStore, LocalStore, MemoryStore};
pub use token_store::{TokenStore, COOKIE_PATH, SESSION_COOKIES, TOKEN_KEY, USER_KEY};
