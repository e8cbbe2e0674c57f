//! Browser implementations of the environment ports

use crate::app::{AppContext, Ports};
use gloo::storage::{LocalStorage, Storage};
use ovoz_core::{ClientConfig, CoreError, CoreResult, KeyValueStore, Navigator, RootElement};
use ovoz_http::ClientError;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::prelude::*;
use tracing_web::MakeWebConsoleWriter;

/// `localStorage`, keys stored as raw strings
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| CoreError::storage(format!("localStorage.setItem({key}) failed: {e:?}")))
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        LocalStorage::raw()
            .remove_item(key)
            .map_err(|e| CoreError::storage(format!("localStorage.removeItem({key}) failed: {e:?}")))
    }
}

/// Full page navigation through `window.location`
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn hard_redirect(&self, path: &str) {
        let Some(window) = web_sys::window() else {
            warn!("No window, cannot redirect to {path}");
            return;
        };
        if let Err(e) = window.location().set_href(path) {
            warn!("Failed to redirect to {path}: {e:?}");
        }
    }
}

/// The document's `<html>` element
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserRoot;

impl RootElement for BrowserRoot {
    fn set_class(&self, class: &str, enabled: bool) {
        let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        else {
            return;
        };
        let classes = root.class_list();
        let result = if enabled {
            classes.add_1(class)
        } else {
            classes.remove_1(class)
        };
        if let Err(e) = result {
            warn!("Failed to update root class {class}: {e:?}");
        }
    }
}

/// Ports backed by the browser
pub fn browser_ports() -> Ports {
    Ports {
        storage: Arc::new(BrowserStorage),
        navigator: Arc::new(BrowserNavigator),
        root: Arc::new(BrowserRoot),
    }
}

/// Build the application context for the browser, using the backend baked
/// in at compile time
///
/// # Errors
///
/// Returns a configuration error if the HTTP client cannot be built.
pub fn browser_context() -> Result<AppContext, ClientError> {
    AppContext::new(&ClientConfig::from_build_env(), browser_ports())
}

/// Send tracing output to the browser console
pub fn init_logging() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new());

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        warn!("Logging already initialized");
    }
}
