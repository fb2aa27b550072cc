pub mod gotrue;
#[cfg(test)]
pub mod mock;

use crate::models::auth::{AuthError, Session};
use async_trait::async_trait;

pub use gotrue::GoTrueClient;

/// Operations the confirmation flow needs from the auth backend.
///
/// The two redemption calls are the only ones the flow controller uses; the
/// other two issue the emails whose links end up at `/confirm`.
#[async_trait]
pub trait AuthCapability: Send + Sync {
    /// Redeems a URL carrying an `access_token`/`refresh_token` pair.
    async fn exchange_session(&self, full_url: &str) -> Result<Session, AuthError>;

    /// Redeems a single-use code of the given type (e.g. `email`).
    async fn verify_one_time_code(&self, token: &str, kind: &str) -> Result<Session, AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<(), AuthError>;

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str)
    -> Result<(), AuthError>;
}
