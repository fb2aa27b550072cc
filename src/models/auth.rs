use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Authenticated state handed back by the auth backend after a redemption.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: User,
}

/// Rejection reported by the auth backend, or by the transport reaching it.
///
/// The message is shown to the user verbatim, so it is kept as plain text
/// rather than wrapped in a variant-specific prefix.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct AuthError {
    message: String,
    status: Option<u16>,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status of the backend reply, when there was one.
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::with_status(err.to_string(), status.as_u16()),
            None => Self::new(err.to_string()),
        }
    }
}

impl From<url::ParseError> for AuthError {
    fn from(err: url::ParseError) -> Self {
        Self::new(format!("Invalid URL: {err}"))
    }
}

/// Error payload shapes GoTrue uses across its endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct GoTrueErrorBody {
    pub msg: Option<String>,
    pub error_description: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl GoTrueErrorBody {
    pub fn into_message(self) -> Option<String> {
        [self.msg, self.error_description, self.message, self.error]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
    }
}
