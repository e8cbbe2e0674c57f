//! Ovoz core types and utilities

pub mod config;
pub mod error;
pub mod format;
pub mod navigation;
pub mod storage;
pub mod theme;
pub mod types;

#[cfg(any(test, feature = "tests"))]
pub mod testing;

pub use config::ClientConfig;
pub use error::{CoreError, CoreResult};
pub use format::{format_currency, user_initials};
pub use navigation::{Navigator, RootElement};
pub use storage::{KeyValueStore, MemoryStore};
pub use theme::Theme;
pub use types::{LoginCredentials, RegisterData, Session, SessionPhase, TokenPair, User};
