//! Client-side state shared by Ovoz front-ends
//!
//! Stores are plain service objects built from injected ports
//! ([`ovoz_core::KeyValueStore`], [`ovoz_core::Navigator`],
//! [`ovoz_core::RootElement`]), so the same code drives the browser build and
//! the CLI. Each store keeps its state in one `tokio::sync::watch` cell that
//! views subscribe to.

pub mod app;
pub mod auth;
#[cfg(target_arch = "wasm32")]
pub mod browser;
pub mod query;
pub mod router;
pub mod theme;

pub use app::{AppContext, Ports};
pub use auth::{AuthState, AuthStore, FetchOutcome};
pub use query::{BalanceQuery, BalanceState};
pub use router::{Navigation, Route, RouteMeta, RouterGuard};
pub use theme::ThemeStore;
