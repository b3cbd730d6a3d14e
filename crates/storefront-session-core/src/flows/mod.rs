//! The three entry points that create or end a session.
//!
//! - `VerificationFlow`: magic-link email verification (message only)
//! - `OAuthCallbackFlow`: identity-provider redirect, the only sign-in path
//! - `LogoutFlow`: confirmed sign-out
//!
//! Each invocation is tied to a `PageScope`; results that arrive after the
//! page is torn down are dropped.

pub mod context;
pub mod logout;
pub mod navigation;
pub mod oauth_callback;
pub mod request;
pub mod scope;
pub mod verification;

pub use context::AuthContext;
pub use logout::LogoutFlow;
pub use navigation::{Alerts, Navigator, RecordingAlerts, RecordingNavigator};
pub use oauth_callback::{CallbackOutcome, OAuthCallbackFlow};
pub use request::{extract_token, request_url};
pub use scope::PageScope;
pub use verification::{VerificationFlow, VerificationOutcome, VerificationPresentation};
