//! Client-side session and credential lifecycle for the storefront.
//!
//! Three entry points can change who is signed in: magic-link email
//! verification, the identity-provider callback, and explicit logout. They
//! all converge on one `SessionStore`, with the token and cached user kept
//! in `TokenStore` across restarts.

pub mod api;
pub mod config;
pub mod flows;
pub mod models;
pub mod session;
pub mod storage;

pub use api::{AuthError, HttpIdentityClient, IdentityClient};
pub use config::{Config, Routes};
pub use flows::{
    AuthContext, CallbackOutcome, LogoutFlow, OAuthCallbackFlow, PageScope, VerificationFlow,
    VerificationOutcome, VerificationPresentation,
};
pub use models::{CredentialToken, UserRecord};
pub use session::{Session, SessionAction, SessionStore};
pub use storage::{StorageError, TokenStore};
