//! Theme preference

pub mod store;

pub use store::ThemeStore;
