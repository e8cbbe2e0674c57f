//! Ovoz API client

pub mod attempt;
pub mod auth;
pub mod error;

pub use attempt::RequestAttempt;
use error::ClientError;
use ovoz_core::config::{API_PREFIX, DEFAULT_LOGIN_PATH};
use ovoz_core::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, clear_token_pair, store_token_pair};
use ovoz_core::{ClientConfig, KeyValueStore, Navigator, TokenPair};
use reqwest::{Client, ClientBuilder, header};
use serde::de::DeserializeOwned;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Called whenever the client rotates or drops the stored tokens.
///
/// `Some` carries a freshly refreshed pair; `None` means the refresh failed
/// and both tokens were removed.
pub type TokenListener = Arc<dyn Fn(Option<&TokenPair>) + Send + Sync>;

/// Ovoz API client
///
/// Requests made through [`send`](Self::send) carry the stored bearer token
/// and replay once after a refresh on 401. Login, registration and the
/// refresh call itself are the exception: they go out without a bearer
/// header and a 401 from them is returned as is.
///
/// Clones share the HTTP connection pool, the token store and the listener list.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    storage: Arc<dyn KeyValueStore>,
    navigator: Option<Arc<dyn Navigator>>,
    login_path: String,
    listeners: Arc<RwLock<Vec<TokenListener>>>,
}

impl ApiClient {
    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL, including the `/api/v1` prefix
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The durable store tokens are read from and written to
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Register a listener for token rotation
    pub fn on_tokens_changed(&self, listener: TokenListener) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Send a request, refreshing the session once if the server answers 401.
    ///
    /// On a first attempt that fails with 401 and a stored refresh token, the
    /// token pair is refreshed and the request replayed once with the new
    /// access token. If the refresh itself fails, the stored tokens are
    /// cleared, the navigator is sent to the login page and the original 401
    /// is returned.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt made
    pub async fn send<T: DeserializeOwned>(&self, attempt: RequestAttempt) -> Result<T, ClientError> {
        let bearer = self.storage.get(ACCESS_TOKEN_KEY);
        let err = match self.dispatch(&attempt, bearer.as_deref()).await {
            Err(err) if err.is_auth_failure() && !attempt.is_retry() => err,
            other => return other,
        };

        let Some(refresh_token) = self.storage.get(REFRESH_TOKEN_KEY) else {
            debug!(path = attempt.path(), "401 with no refresh token stored");
            return Err(err);
        };

        match self.refresh_tokens(&refresh_token).await {
            Ok(tokens) => {
                self.persist_tokens(&tokens);
                let retry = attempt.retry();
                debug!(
                    path = retry.path(),
                    attempt = retry.attempt(),
                    "Replaying request after token refresh"
                );
                self.dispatch(&retry, Some(&tokens.access_token)).await
            }
            Err(refresh_err) => {
                warn!("Token refresh failed: {refresh_err}");
                self.expire_session();
                Err(err)
            }
        }
    }

    /// Perform one attempt without any refresh handling
    async fn dispatch<T: DeserializeOwned>(
        &self,
        attempt: &RequestAttempt,
        bearer: Option<&str>,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, attempt.path());
        let mut request = self.client.request(attempt.method().clone(), url);

        if let Some(token) = bearer {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = attempt.body() {
            request = request.json(body);
        }

        Self::execute(request).await
    }

    /// Execute a request and handle common errors
    async fn execute<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }

    /// Request builder with no bearer token and no refresh handling
    fn bare_request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    fn persist_tokens(&self, tokens: &TokenPair) {
        if let Err(e) = store_token_pair(self.storage.as_ref(), tokens) {
            error!("Failed to persist refreshed tokens: {e}");
        }
        self.notify(Some(tokens));
    }

    /// Drop the stored tokens, then leave for the login page.
    fn expire_session(&self) {
        if let Err(e) = clear_token_pair(self.storage.as_ref()) {
            error!("Failed to clear stored tokens: {e}");
        }
        self.notify(None);

        match &self.navigator {
            Some(navigator) => {
                info!("Session expired, redirecting to {}", self.login_path);
                navigator.hard_redirect(&self.login_path);
            }
            None => warn!("Session expired and no navigator is configured"),
        }
    }

    fn notify(&self, tokens: Option<&TokenPair>) {
        // Listeners may register further listeners; don't call them under the lock.
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener(tokens);
        }
    }
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    storage: Option<Arc<dyn KeyValueStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    login_path: Option<String>,
}

impl ApiClientBuilder {
    /// Start from a [`ClientConfig`]
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut builder = Self::default()
            .base_url(&config.api_url)
            .login_path(&config.login_path);
        builder.timeout = config.timeout();
        builder
    }

    /// Set the backend origin; `/api/v1` is appended unless already present
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout (ignored on wasm)
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the durable token store
    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the navigator used for the hard redirect on session expiry
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Set the login entry point (defaults to `/login`)
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = Some(path.into());
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL or storage is missing,
    /// or if the underlying HTTP client cannot be created
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
        let storage = self
            .storage
            .ok_or_else(|| ClientError::Configuration("storage is required".into()))?;

        let base_url = base_url.trim_end_matches('/');
        let base_url = if base_url.ends_with(API_PREFIX) {
            base_url.to_string()
        } else {
            format!("{base_url}{API_PREFIX}")
        };

        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| concat!("ovoz-client/", env!("CARGO_PKG_VERSION")).to_string()),
        );

        let client = client_builder.build()?;

        Ok(ApiClient {
            client,
            base_url,
            storage,
            navigator: self.navigator,
            login_path: self
                .login_path
                .unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string()),
            listeners: Arc::new(RwLock::new(Vec::new())),
        })
    }
}
