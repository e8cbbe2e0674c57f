//! Immutable description of one try at a request

use super::ClientError;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// A request plus the number of the try it represents.
///
/// Replays are new values made by [`RequestAttempt::retry`]; an attempt is
/// never mutated in place, so "already retried" is just `attempt() > 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestAttempt {
    method: Method,
    path: String,
    body: Option<Value>,
    attempt: u32,
}

impl RequestAttempt {
    /// First try at `method path`; `path` is relative to the API base
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            attempt: 1,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attach a JSON body
    ///
    /// # Errors
    ///
    /// Returns a serialization error if `body` cannot be encoded as JSON
    pub fn with_json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, ClientError> {
        Ok(Self {
            body: Some(serde_json::to_value(body)?),
            ..self
        })
    }

    /// The same request, one try later
    #[must_use]
    pub fn retry(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }

    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    pub const fn is_retry(&self) -> bool {
        self.attempt > 1
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}
