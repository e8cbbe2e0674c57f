//! OAuth callback handling

use ovoz_core::TokenPair;
use url::form_urlencoded;

/// Pull the token pair out of the `/auth/callback` query string.
///
/// Accepts the query with or without its leading `?`. Returns `None` unless
/// both tokens are present and non-empty.
pub fn parse_oauth_callback(query: &str) -> Option<TokenPair> {
    let mut access_token = None;
    let mut refresh_token = None;

    for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
        match key.as_ref() {
            "access_token" if !value.is_empty() => access_token = Some(value.into_owned()),
            "refresh_token" if !value.is_empty() => refresh_token = Some(value.into_owned()),
            _ => {}
        }
    }

    Some(TokenPair::new(access_token?, refresh_token?))
}
