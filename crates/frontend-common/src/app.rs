//! Application context wiring the stores together

use crate::auth::{AuthStore, FetchOutcome};
use crate::query::BalanceQuery;
use crate::router::RouterGuard;
use crate::theme::ThemeStore;
use ovoz_core::{ClientConfig, KeyValueStore, Navigator, RootElement};
use ovoz_http::{ApiClientBuilder, ClientError};
use std::sync::Arc;
use tracing::info;

/// Environment the front-end runs in
#[derive(Clone)]
pub struct Ports {
    pub storage: Arc<dyn KeyValueStore>,
    pub navigator: Arc<dyn Navigator>,
    pub root: Arc<dyn RootElement>,
}

/// Every store a front-end needs, sharing one client and one storage
#[derive(Clone)]
pub struct AppContext {
    pub auth: AuthStore,
    pub theme: ThemeStore,
    pub router: RouterGuard,
    pub balance: BalanceQuery,
}

impl AppContext {
    /// Build the client and stores from `config`.
    ///
    /// The theme is applied to the root element immediately.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, ports: Ports) -> Result<Self, ClientError> {
        let client = ApiClientBuilder::from_config(config)
            .storage(ports.storage.clone())
            .navigator(ports.navigator)
            .build()?;
        info!(base_url = client.base_url(), "Client configured");

        let auth = AuthStore::new(client);
        Ok(Self {
            theme: ThemeStore::new(ports.storage, ports.root),
            router: RouterGuard::new(auth.clone()),
            balance: BalanceQuery::new(auth.clone()),
            auth,
        })
    }

    /// Load the user for a stored token, if there is one
    pub async fn start(&self) -> FetchOutcome {
        self.auth.fetch_user().await
    }
}
