//! Authentication module

pub mod oauth;
pub mod store;

pub use oauth::parse_oauth_callback;
pub use store::{AuthState, AuthStore, FetchOutcome};
