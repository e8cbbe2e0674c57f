//! Navigation guard

use super::Route;
use crate::auth::AuthStore;
use tracing::debug;
use url::form_urlencoded;

/// What the router should do with a navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Render the route
    Allow(Route),
    /// Go to this location instead
    Redirect(String),
}

/// Runs before every navigation and decides where it ends up
#[derive(Clone)]
pub struct RouterGuard {
    auth: AuthStore,
}

impl RouterGuard {
    pub const fn new(auth: AuthStore) -> Self {
        Self { auth }
    }

    /// Decide the fate of a navigation to `to` (path plus optional query).
    ///
    /// When a token is held but the user has not been loaded yet, the
    /// navigation waits for the user fetch before deciding.
    pub async fn before_each(&self, to: &str) -> Navigation {
        if self.auth.session().needs_user() {
            debug!(to, "Holding navigation until the user is loaded");
            self.auth.fetch_user().await;
        }

        let route = Route::recognize(to);
        // A forward keeps the query and fragment of the requested location
        let (route, full_path) = match route.redirect() {
            Some(target) => {
                let suffix = to.find(['?', '#']).map_or("", |i| &to[i..]);
                (target, format!("{}{suffix}", target.path()))
            }
            None => (route, to.to_string()),
        };

        let meta = route.meta();
        let authenticated = self.auth.is_authenticated();

        if meta.requires_auth && !authenticated {
            Navigation::Redirect(login_redirect(&full_path))
        } else if meta.requires_guest && authenticated {
            Navigation::Redirect(Route::Dashboard.path().to_string())
        } else {
            Navigation::Allow(route)
        }
    }
}

/// Login location that remembers where the user was going
pub fn login_redirect(full_path: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(full_path.as_bytes()).collect();
    format!("{}?redirect={}", Route::Login.path(), encoded.replace("%2F", "/"))
}

/// Where to go after a successful login, given the login page's query string.
///
/// Only local absolute paths are honoured; anything else lands on the dashboard.
pub fn post_login_destination(query: &str) -> String {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == "redirect")
        .map(|(_, value)| value.into_owned())
        .filter(|target| target.starts_with('/') && !target.starts_with("//"))
        .unwrap_or_else(|| Route::Dashboard.path().to_string())
}
