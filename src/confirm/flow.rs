use crate::auth::AuthCapability;
use crate::models::auth::Session;
use crate::models::confirm::{ConfirmError, ConfirmationOutcome, RedirectParameters};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stateless part of the confirmation flow: pick the redemption call from the
/// link shape and make it, once.
#[derive(Clone)]
pub struct ConfirmationFlow {
    auth: Arc<dyn AuthCapability>,
}

impl ConfirmationFlow {
    pub fn new(auth: Arc<dyn AuthCapability>) -> Self {
        Self { auth }
    }

    pub async fn redeem(&self, url: &str) -> Result<Session, ConfirmError> {
        let params = RedirectParameters::parse(url).inspect_err(|_| {
            warn!("Confirmation link carries no recognised credentials");
        })?;

        let result = match &params {
            RedirectParameters::SessionTokens { kind, .. } => {
                debug!(kind = %kind, "Redeeming session tokens");
                self.auth.exchange_session(url).await
            }
            RedirectParameters::OneTimeCode { token, kind } => {
                debug!(kind = %kind, "Redeeming one-time code");
                self.auth.verify_one_time_code(token, kind).await
            }
        };

        match result {
            Ok(session) => {
                info!(user_id = %session.user.id, kind = %params.kind(), "Email confirmed");
                Ok(session)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    status = ?e.status(),
                    kind = %params.kind(),
                    "Confirmation rejected by auth backend"
                );
                Err(ConfirmError::RedemptionFailed(e.message().to_string()))
            }
        }
    }

    pub async fn resolve(&self, url: &str) -> ConfirmationOutcome {
        match self.redeem(url).await {
            Ok(_) => ConfirmationOutcome::Success,
            Err(e) => ConfirmationOutcome::Error(e),
        }
    }
}
