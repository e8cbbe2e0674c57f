//! Authentication API client methods

use super::{ApiClient, ClientError, RequestAttempt};
use ovoz_core::types::RefreshRequest;
use ovoz_core::{LoginCredentials, RegisterData, TokenPair, User};
use reqwest::Method;

impl ApiClient {
    /// Exchange email and password for a token pair.
    ///
    /// Sent without a bearer token and never triggers a refresh: a 401 here
    /// means bad credentials, not an expired session.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<TokenPair, ClientError> {
        let request = self
            .bare_request(Method::POST, "/auth/login")
            .json(credentials);
        Self::execute(request).await
    }

    /// Create an account and receive its first token pair
    pub async fn register(&self, data: &RegisterData) -> Result<TokenPair, ClientError> {
        let request = self
            .bare_request(Method::POST, "/auth/register")
            .json(data);
        Self::execute(request).await
    }

    /// Exchange a refresh token for a new pair
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, ClientError> {
        let request = self
            .bare_request(Method::POST, "/auth/refresh")
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            });
        Self::execute(request).await
    }

    /// Fetch the account behind the stored access token
    pub async fn current_user(&self) -> Result<User, ClientError> {
        self.send(RequestAttempt::get("/auth/me")).await
    }
}
