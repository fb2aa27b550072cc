//! Supabase Auth (GoTrue) client backing the confirmation flow.

use super::AuthCapability;
use crate::models::auth::{AuthError, GoTrueErrorBody, Session, User};
use crate::models::confirm::RedirectParameters;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Clone)]
pub struct GoTrueClient {
    http_client: reqwest::Client,
    api_url: String,
    anon_key: String,
}

impl GoTrueClient {
    /// `api_url` is the project URL (`https://<ref>.supabase.co`); the
    /// `/auth/v1` prefix is added per request.
    pub fn new(
        api_url: impl Into<String>,
        anon_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        })
    }

    fn auth_url(&self, path: &str, redirect_to: Option<&str>) -> Result<Url, AuthError> {
        let mut url = Url::parse(&format!("{}/auth/v1/{}", self.api_url, path))?;
        if let Some(redirect_to) = redirect_to {
            url.query_pairs_mut().append_pair("redirect_to", redirect_to);
        }
        Ok(url)
    }

    async fn fetch_user(&self, access_token: &str) -> Result<User, AuthError> {
        let url = self.auth_url("user", None)?;
        debug!(url = %url, "Fetching user for access token");

        let response = self
            .http_client
            .get(url)
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json::<User>().await?)
    }

    async fn post_expecting_success(
        &self,
        url: Url,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, AuthError> {
        let response = self
            .http_client
            .post(url)
            .header("apikey", &self.anon_key)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response)
    }
}

async fn error_from_response(response: reqwest::Response) -> AuthError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GoTrueErrorBody>(&body)
        .ok()
        .and_then(GoTrueErrorBody::into_message)
        .unwrap_or_else(|| format!("HTTP {}", status));

    warn!(status = %status, message = %message, "Auth request rejected");
    AuthError::with_status(message, status.as_u16())
}

#[async_trait]
impl AuthCapability for GoTrueClient {
    async fn exchange_session(&self, full_url: &str) -> Result<Session, AuthError> {
        let (access_token, refresh_token, kind) = match RedirectParameters::parse(full_url) {
            Ok(RedirectParameters::SessionTokens {
                access_token,
                refresh_token,
                kind,
            }) => (access_token, refresh_token, kind),
            _ => {
                return Err(AuthError::new(
                    "No access_token and refresh_token found in URL",
                ));
            }
        };

        debug!(kind = %kind, "Exchanging session tokens from URL");
        let user = self.fetch_user(&access_token).await?;
        info!(user_id = %user.id, kind = %kind, "Session exchanged");

        Ok(Session {
            access_token,
            refresh_token: Some(refresh_token),
            token_type: Some("bearer".to_string()),
            expires_in: None,
            user,
        })
    }

    async fn verify_one_time_code(&self, token: &str, kind: &str) -> Result<Session, AuthError> {
        let url = self.auth_url("verify", None)?;
        debug!(url = %url, kind = %kind, "Verifying one-time code");

        let response = self
            .post_expecting_success(url, serde_json::json!({ "type": kind, "token": token }))
            .await?;
        let session: Session = response.json().await?;

        info!(user_id = %session.user.id, kind = %kind, "One-time code verified");
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<(), AuthError> {
        let url = self.auth_url("signup", Some(redirect_to))?;
        debug!(url = %url, "Signing up");

        self.post_expecting_success(
            url,
            serde_json::json!({ "email": email, "password": password }),
        )
        .await?;

        info!("Sign-up accepted, confirmation email requested");
        Ok(())
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AuthError> {
        let url = self.auth_url("recover", Some(redirect_to))?;
        debug!(url = %url, "Requesting password reset");

        self.post_expecting_success(url, serde_json::json!({ "email": email }))
            .await?;

        info!("Password reset email requested");
        Ok(())
    }
}
