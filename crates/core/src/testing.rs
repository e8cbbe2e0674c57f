//! Recording implementations of the environment ports, for tests
//!
//! Enabled with the `tests` feature so downstream crates can drive their
//! stores without a browser.

use crate::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::{KeyValueStore, Navigator, RootElement};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

/// A hard redirect as observed by [`RecordingNavigator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    /// Whether any token was still in storage when the redirect happened
    pub tokens_present: bool,
}

/// Navigator that records redirects instead of performing them
pub struct RecordingNavigator {
    store: Arc<dyn KeyValueStore>,
    redirects: Mutex<Vec<Redirect>>,
}

impl RecordingNavigator {
    /// Record redirects, inspecting `store` at the moment of each one
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            redirects: Mutex::new(Vec::new()),
        }
    }

    pub fn redirects(&self) -> Vec<Redirect> {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn hard_redirect(&self, path: &str) {
        let tokens_present = self.store.get(ACCESS_TOKEN_KEY).is_some()
            || self.store.get(REFRESH_TOKEN_KEY).is_some();
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Redirect {
                path: path.to_string(),
                tokens_present,
            });
    }
}

/// Root element that keeps its class list in memory
#[derive(Debug, Default)]
pub struct RecordingRoot {
    classes: Mutex<BTreeSet<String>>,
}

impl RecordingRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(class)
    }
}

impl RootElement for RecordingRoot {
    fn set_class(&self, class: &str, enabled: bool) {
        let mut classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
        if enabled {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }
}
