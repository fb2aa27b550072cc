use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Verification type assumed for a bare `token` link.
pub const EMAIL_OTP_TYPE: &str = "email";

const RELATIVE_BASE: &str = "http://localhost/";

/// Credentials carried by a confirmation link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectParameters {
    /// `access_token`, `refresh_token` and `type` all present.
    SessionTokens {
        access_token: String,
        refresh_token: String,
        kind: String,
    },
    /// A single-use `token`, always of type `email`.
    OneTimeCode { token: String, kind: String },
}

impl RedirectParameters {
    /// Parses the credential shape out of a confirmation URL.
    ///
    /// Accepts absolute URLs as well as relative ones (`/confirm?token=..`,
    /// `?token=..`). The query string is read first; the fragment is only
    /// consulted when the query carries neither shape. The token triple wins
    /// over a bare `token` when both are present.
    pub fn parse(raw_url: &str) -> Result<Self, ConfirmError> {
        let url = match Url::parse(raw_url) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)
                .and_then(|base| base.join(raw_url))
                .map_err(|_| ConfirmError::MalformedLink)?,
            Err(_) => return Err(ConfirmError::MalformedLink),
        };

        let query = collect_pairs(url.query().unwrap_or_default());
        if let Some(params) = Self::from_pairs(&query) {
            return Ok(params);
        }

        let fragment = collect_pairs(url.fragment().unwrap_or_default());
        Self::from_pairs(&fragment).ok_or(ConfirmError::MalformedLink)
    }

    fn from_pairs(pairs: &HashMap<String, String>) -> Option<Self> {
        let get = |key: &str| pairs.get(key).filter(|v| !v.is_empty()).cloned();

        if let (Some(access_token), Some(refresh_token), Some(kind)) =
            (get("access_token"), get("refresh_token"), get("type"))
        {
            return Some(Self::SessionTokens {
                access_token,
                refresh_token,
                kind,
            });
        }

        get("token").map(|token| Self::OneTimeCode {
            token,
            kind: EMAIL_OTP_TYPE.to_string(),
        })
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::SessionTokens { kind, .. } | Self::OneTimeCode { kind, .. } => kind,
        }
    }
}

// First occurrence wins, as with URLSearchParams.get.
fn collect_pairs(input: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
        pairs
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    pairs
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfirmError {
    #[error("invalid confirmation link")]
    MalformedLink,

    /// Backend rejection; the text is the backend's own message.
    #[error("{0}")]
    RedemptionFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Verifying,
    Success,
    Error(ConfirmError),
}

impl ConfirmationOutcome {
    pub fn status_text(&self) -> String {
        match self {
            Self::Verifying => "Confirming your email...".to_string(),
            Self::Success => "Email confirmed!".to_string(),
            Self::Error(ConfirmError::MalformedLink) => "Invalid confirmation link.".to_string(),
            Self::Error(ConfirmError::RedemptionFailed(message)) => {
                format!("Error confirming email: {message}")
            }
        }
    }

    /// Where to send the user once this outcome is shown. `None` while the
    /// redemption is still in flight.
    pub fn navigation(&self, routes: &Routes, delay: Duration) -> Option<Navigation> {
        let route = match self {
            Self::Verifying => return None,
            Self::Success => routes.home.clone(),
            Self::Error(_) => routes.login.clone(),
        };
        Some(Navigation { route, delay })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    pub home: String,
    pub login: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            home: "/".to_string(),
            login: "/login".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: String,
    pub delay: Duration,
}
