//! Shared fixtures for the store tests

#![allow(dead_code)]

use ovoz_core::ClientConfig;
use ovoz_core::MemoryStore;
use ovoz_core::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use ovoz_core::testing::{RecordingNavigator, RecordingRoot};
use ovoz_frontend_common::{AppContext, Ports};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::MockServer;

pub fn user_body(balance: &str) -> Value {
    account_body(7, "bobur@example.uz", balance)
}

pub fn account_body(id: i64, email: &str, balance: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "full_name": "Bobur Toshmatov",
        "is_active": true,
        "is_verified": false,
        "balance": balance,
        "oauth_provider": null,
        "created_at": "2024-03-10T12:30:00"
    })
}

pub fn tokens_body(access: &str, refresh: &str) -> Value {
    json!({ "access_token": access, "refresh_token": refresh, "token_type": "bearer" })
}

pub fn signed_in() -> Vec<(&'static str, &'static str)> {
    vec![(ACCESS_TOKEN_KEY, "access-old"), (REFRESH_TOKEN_KEY, "refresh-old")]
}

pub struct App {
    pub ctx: AppContext,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub root: Arc<RecordingRoot>,
}

pub fn app(server: &MockServer, entries: &[(&str, &str)]) -> App {
    let store = Arc::new(MemoryStore::with_entries(entries.iter().copied()));
    let navigator = Arc::new(RecordingNavigator::new(store.clone()));
    let root = Arc::new(RecordingRoot::new());
    let config = ClientConfig {
        api_url: server.uri(),
        ..ClientConfig::default()
    };
    let ctx = AppContext::new(
        &config,
        Ports {
            storage: store.clone(),
            navigator: navigator.clone(),
            root: root.clone(),
        },
    )
    .unwrap();
    App {
        ctx,
        store,
        navigator,
        root,
    }
}
