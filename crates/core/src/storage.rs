//! Durable key-value storage
//!
//! The browser build backs this with `localStorage`; the CLI with a JSON
//! file. Tokens and the theme preference are the only values kept here.

use crate::{CoreResult, TokenPair};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Storage key of the access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Storage key of the theme preference
pub const THEME_KEY: &str = "theme";

/// String key-value store that survives process restarts
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write
    fn set(&self, key: &str, value: &str) -> CoreResult<()>;

    /// Delete a value; deleting a missing key is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the delete
    fn remove(&self, key: &str) -> CoreResult<()>;
}

/// Persist both tokens of a pair
///
/// # Errors
///
/// Returns the first storage error encountered
pub fn store_token_pair(store: &dyn KeyValueStore, tokens: &TokenPair) -> CoreResult<()> {
    store.set(ACCESS_TOKEN_KEY, &tokens.access_token)?;
    store.set(REFRESH_TOKEN_KEY, &tokens.refresh_token)
}

/// Remove both tokens, attempting the second delete even if the first fails
///
/// # Errors
///
/// Returns the first storage error encountered
pub fn clear_token_pair(store: &dyn KeyValueStore) -> CoreResult<()> {
    let access = store.remove(ACCESS_TOKEN_KEY);
    let refresh = store.remove(REFRESH_TOKEN_KEY);
    access.and(refresh)
}

/// In-memory store, for tests and for sessions that should not outlive the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }

    /// Whether the store holds a value for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
