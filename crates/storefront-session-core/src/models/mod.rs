//! Data models shared by the session store, storage and flows.
//!
//! - `UserRecord`: the opaque identity payload returned by the identity service
//! - `CredentialToken`: the bearer string carried in on verification and callback URLs

pub mod token;
pub mod user;

pub use token::CredentialToken;
pub use user::UserRecord;
