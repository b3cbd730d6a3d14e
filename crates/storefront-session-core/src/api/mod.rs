//! Identity service client module.
//!
//! This module provides the `IdentityClient` seam the flows talk to and the
//! reqwest-backed `HttpIdentityClient` that implements it against
//! `/api/auth/verify` and `/api/auth/me`.
//!
//! Every failure is folded into `AuthError`, the taxonomy the flows surface
//! to the user.

pub mod client;
pub mod error;

pub use client::{HttpIdentityClient, IdentityClient, VerifyResponse};
pub use error::AuthError;
