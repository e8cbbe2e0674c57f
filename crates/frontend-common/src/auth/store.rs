//! Session state and the operations that move it between phases

use ovoz_core::storage::{clear_token_pair, store_token_pair};
use ovoz_core::{
    KeyValueStore, LoginCredentials, RegisterData, Session, SessionPhase, TokenPair, User,
};
use ovoz_http::{ApiClient, ClientError};
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Authentication state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub session: Session,
    pub is_loading: bool,
}

/// Result of [`AuthStore::fetch_user`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// No access token, nothing was requested
    NoToken,
    /// The user was loaded and the session is authenticated
    Authenticated,
    /// The request failed and the session was logged out
    Invalidated,
}

/// Holds the current session and runs login, registration and logout.
///
/// Clones share the same state cell.
#[derive(Clone)]
pub struct AuthStore {
    client: ApiClient,
    storage: Arc<dyn KeyValueStore>,
    state: Arc<watch::Sender<AuthState>>,
}

impl AuthStore {
    /// Create the store, seeding tokens from the client's durable storage.
    ///
    /// The store follows token rotation done by the client, and drops the
    /// whole session when the client gives up on refreshing.
    pub fn new(client: ApiClient) -> Self {
        let storage = client.storage().clone();
        let (state, _) = watch::channel(AuthState {
            session: Session::from_store(storage.as_ref()),
            is_loading: false,
        });
        let state = Arc::new(state);

        let weak = Arc::downgrade(&state);
        client.on_tokens_changed(Arc::new(move |tokens: Option<&TokenPair>| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.send_modify(|s| match tokens {
                Some(tokens) => s.session.set_tokens(tokens),
                None => s.session.clear(),
            });
        }));

        Self {
            client,
            storage,
            state,
        }
    }

    /// Log in with email and password, then load the user.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the credentials are rejected; the
    /// session is left as it was.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<FetchOutcome, ClientError> {
        let _loading = self.begin_loading();
        match self.client.login(credentials).await {
            Ok(tokens) => {
                debug!(email = %credentials.email, "Credentials accepted");
                info!("Logged in");
                self.set_tokens(&tokens);
                Ok(self.fetch_user().await)
            }
            Err(e) => {
                error!("Login failed: {e}");
                Err(e)
            }
        }
    }

    /// Create an account, then load the user.
    ///
    /// # Errors
    ///
    /// Returns the backend error if registration is rejected; the session
    /// is left as it was.
    pub async fn register(&self, data: &RegisterData) -> Result<FetchOutcome, ClientError> {
        let _loading = self.begin_loading();
        match self.client.register(data).await {
            Ok(tokens) => {
                debug!(email = %data.email, "Account created");
                info!("Registered");
                self.set_tokens(&tokens);
                Ok(self.fetch_user().await)
            }
            Err(e) => {
                error!("Registration failed: {e}");
                Err(e)
            }
        }
    }

    /// Load the user behind the current access token.
    ///
    /// A failure for any reason logs the session out. Concurrent calls are
    /// not deduplicated; whichever response arrives last wins.
    pub async fn fetch_user(&self) -> FetchOutcome {
        let has_token = self.state.borrow().session.access_token.is_some();
        if !has_token {
            return FetchOutcome::NoToken;
        }

        let _loading = self.begin_loading();
        match self.client.current_user().await {
            Ok(user) => {
                debug!(user_id = %user.id, "Fetched current user");
                self.state.send_modify(|s| s.session.user = Some(user));
                FetchOutcome::Authenticated
            }
            Err(e) => {
                warn!("Failed to fetch user: {e}");
                self.logout();
                FetchOutcome::Invalidated
            }
        }
    }

    /// Forget the user and both tokens, in memory and in storage.
    pub fn logout(&self) {
        self.state.send_modify(|s| s.session.clear());
        if let Err(e) = clear_token_pair(self.storage.as_ref()) {
            error!("Failed to clear stored tokens: {e}");
        }
    }

    /// Adopt tokens handed over by the OAuth callback page.
    ///
    /// Tokens are stored before this returns; the returned future loads the
    /// user and may be awaited, spawned, or dropped.
    pub fn handle_oauth_callback(&self, tokens: TokenPair) -> impl Future<Output = FetchOutcome> + use<> {
        self.set_tokens(&tokens);
        let store = self.clone();
        async move { store.fetch_user().await }
    }

    /// Overwrite the cached user with a fresher copy
    pub fn replace_user(&self, user: User) {
        self.state.send_modify(|s| s.session.user = Some(user));
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Session {
        self.state.borrow().session.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().session.user.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().session.access_token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().session.is_authenticated()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().session.phase()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Balance of the cached user, if one is loaded
    pub fn cached_balance(&self) -> Option<Decimal> {
        self.state
            .borrow()
            .session
            .user
            .as_ref()
            .map(|user| user.balance)
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn set_tokens(&self, tokens: &TokenPair) {
        self.state.send_modify(|s| s.session.set_tokens(tokens));
        if let Err(e) = store_token_pair(self.storage.as_ref(), tokens) {
            error!("Failed to persist tokens: {e}");
        }
    }

    fn begin_loading(&self) -> LoadingGuard {
        self.state.send_modify(|s| s.is_loading = true);
        LoadingGuard {
            state: self.state.clone(),
        }
    }
}

/// Clears the loading flag when the operation ends, including when its
/// future is dropped mid-flight.
struct LoadingGuard {
    state: Arc<watch::Sender<AuthState>>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.is_loading = false);
    }
}
