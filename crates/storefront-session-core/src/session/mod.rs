//! Authoritative in-memory session.
//!
//! This module provides:
//! - `Session`: the `{ user, is_authenticated }` snapshot and its reducer
//! - `SessionStore`: the single owned handle that applies `SessionAction`s
//!   and hands out read-only snapshots and subscriptions
//!
//! Persistence is not handled here; the flows write storage themselves.

pub mod state;
pub mod store;

pub use state::{Session, SessionAction};
pub use store::SessionStore;
