use crate::handlers::html;
use crate::models::AppState;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub email: String,
}

pub async fn reset_password_handler(
    State(app_state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> impl IntoResponse {
    let email = form.email.trim();
    let redirect_to = app_state.config.confirm_redirect_url();

    match app_state
        .auth
        .reset_password_for_email(email, &redirect_to)
        .await
    {
        Ok(()) => {
            info!(redirect_to = %redirect_to, "Password reset requested");
            (
                StatusCode::OK,
                Html(html::page(
                    "Check your inbox",
                    "<h1>Check your inbox</h1>\
                     <p>If that email exists, a reset link is on the way.</p>",
                )),
            )
        }
        Err(e) => {
            warn!(error = %e, "Password reset request failed");
            (
                StatusCode::BAD_REQUEST,
                Html(html::page(
                    "Reset password",
                    &format!(
                        "<h1>Error</h1><p>Error requesting password reset: {}</p>",
                        html::escape(e.message())
                    ),
                )),
            )
        }
    }
}
