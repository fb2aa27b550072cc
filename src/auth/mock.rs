//! Scriptable `AuthCapability` for tests.

use super::AuthCapability;
use crate::models::auth::{AuthError, Session, User};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ExchangeSession(String),
    VerifyOneTimeCode { token: String, kind: String },
    SignUp { email: String, redirect_to: String },
    ResetPassword { email: String, redirect_to: String },
}

#[derive(Default)]
pub struct MockAuth {
    calls: Mutex<Vec<Call>>,
    failure: Option<AuthError>,
    gate: Option<Arc<Notify>>,
}

impl MockAuth {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(AuthError::with_status(message, 403)),
            ..Self::default()
        }
    }

    /// Holds every redemption until the returned `Notify` is signalled.
    pub fn gated(self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self {
                gate: Some(gate.clone()),
                ..self
            },
            gate,
        )
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn session() -> Session {
        Session {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            token_type: Some("bearer".to_string()),
            expires_in: Some(3600),
            user: User {
                id: "user-1".to_string(),
                email: Some("ada@example.com".to_string()),
            },
        }
    }

    async fn respond<T>(&self, call: Call, ok: T) -> Result<T, AuthError> {
        self.calls.lock().unwrap().push(call);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(ok),
        }
    }
}

#[async_trait]
impl AuthCapability for MockAuth {
    async fn exchange_session(&self, full_url: &str) -> Result<Session, AuthError> {
        self.respond(Call::ExchangeSession(full_url.to_string()), Self::session())
            .await
    }

    async fn verify_one_time_code(&self, token: &str, kind: &str) -> Result<Session, AuthError> {
        self.respond(
            Call::VerifyOneTimeCode {
                token: token.to_string(),
                kind: kind.to_string(),
            },
            Self::session(),
        )
        .await
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        redirect_to: &str,
    ) -> Result<(), AuthError> {
        self.respond(
            Call::SignUp {
                email: email.to_string(),
                redirect_to: redirect_to.to_string(),
            },
            (),
        )
        .await
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AuthError> {
        self.respond(
            Call::ResetPassword {
                email: email.to_string(),
                redirect_to: redirect_to.to_string(),
            },
            (),
        )
        .await
    }
}
