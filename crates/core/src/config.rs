//! Client configuration shared by the browser and CLI front-ends

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Path prefix of every backend endpoint
pub const API_PREFIX: &str = "/api/v1";

/// Backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Route the client is sent to when the session cannot be recovered
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin, without the `/api/v1` prefix
    pub api_url: String,

    /// Request timeout in seconds (0 = no timeout)
    pub timeout_secs: u64,

    /// Login entry point used for hard redirects
    pub login_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 0,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    /// Configuration baked in at compile time.
    ///
    /// `OVOZ_API_URL` set while building overrides the default backend.
    pub fn from_build_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = option_env!("OVOZ_API_URL") {
            config.api_url = url.to_string();
        }
        config
    }

    /// Base URL for API calls, e.g. `http://localhost:8000/api/v1`
    pub fn api_base(&self) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), API_PREFIX)
    }

    /// Request timeout, if one is configured
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }

    /// Check the configuration for values that can never work
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is not an http(s) URL or the login
    /// path is not an absolute path
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(CoreError::invalid_config(format!(
                "api_url must start with http:// or https://, got {:?}",
                self.api_url
            )));
        }
        if !self.login_path.starts_with('/') {
            return Err(CoreError::invalid_config(format!(
                "login_path must be an absolute path, got {:?}",
                self.login_path
            )));
        }
        Ok(())
    }
}
