//! Account balance query

use crate::auth::AuthStore;
use chrono::{DateTime, Utc};
use ovoz_http::ClientError;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

/// Balance query state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BalanceState {
    /// Last balance known to the query
    pub data: Option<Decimal>,
    pub is_fetching: bool,
    /// Message of the last failed fetch, cleared on success
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fetches the balance from `GET /auth/me` and keeps the auth store's user in step.
#[derive(Clone)]
pub struct BalanceQuery {
    auth: AuthStore,
    state: Arc<watch::Sender<BalanceState>>,
}

impl BalanceQuery {
    /// Create the query, seeded with the balance of the cached user.
    ///
    /// The user is often still loading at this point; until the first fetch,
    /// [`state`](Self::state) and [`subscribe`](Self::subscribe) pick up the
    /// cached balance once it appears.
    pub fn new(auth: AuthStore) -> Self {
        let (state, _) = watch::channel(BalanceState {
            data: auth.cached_balance(),
            ..BalanceState::default()
        });
        Self {
            auth,
            state: Arc::new(state),
        }
    }

    /// Fetch the balance now.
    ///
    /// The fetched user also replaces the auth store's cached user. Like
    /// the auth store, overlapping refetches are not deduplicated.
    ///
    /// # Errors
    ///
    /// Returns the client error; the previous balance is kept.
    pub async fn refetch(&self) -> Result<Decimal, ClientError> {
        self.state.send_modify(|s| s.is_fetching = true);

        match self.auth.client().current_user().await {
            Ok(user) => {
                let balance = user.balance;
                self.auth.replace_user(user);
                self.state.send_modify(|s| {
                    s.data = Some(balance);
                    s.is_fetching = false;
                    s.error = None;
                    s.updated_at = Some(Utc::now());
                });
                Ok(balance)
            }
            Err(e) => {
                warn!("Failed to fetch balance: {e}");
                self.state.send_modify(|s| {
                    s.is_fetching = false;
                    s.error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    /// Balance to display: fetched value, else the cached user's, else zero
    pub fn current_balance(&self) -> Decimal {
        self.state
            .borrow()
            .data
            .or_else(|| self.auth.cached_balance())
            .unwrap_or(Decimal::ZERO)
    }

    pub fn state(&self) -> BalanceState {
        self.seed_from_cache();
        self.state.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<BalanceState> {
        self.seed_from_cache();
        self.state.subscribe()
    }

    fn seed_from_cache(&self) {
        let Some(cached) = self.auth.cached_balance() else {
            return;
        };
        self.state.send_if_modified(|s| {
            if s.data.is_some() {
                return false;
            }
            s.data = Some(cached);
            true
        });
    }
}
