//! Ovoz HTTP client
//!
//! Wraps the backend's `/api/v1` REST surface. Every request carries the
//! stored bearer token; a 401 triggers at most one token refresh and replay.

pub mod client;

pub use client::error::ClientError;
pub use client::{ApiClient, ApiClientBuilder, RequestAttempt, TokenListener};
