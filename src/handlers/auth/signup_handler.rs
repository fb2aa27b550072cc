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
pub struct SignUpForm {
    pub email: String,
    pub password: String,
}

pub async fn signup_handler(
    State(app_state): State<AppState>,
    Form(form): Form<SignUpForm>,
) -> impl IntoResponse {
    let email = form.email.trim();
    let back_to_login = format!(
        "<p><a href=\"{}\">Back to Login</a></p>",
        html::escape(&app_state.config.routes.login)
    );
    if email.is_empty() || !email.contains('@') {
        return (
            StatusCode::BAD_REQUEST,
            Html(html::page(
                "Sign up",
                &format!("<h1>Error</h1><p>Email address looks invalid.</p>{back_to_login}"),
            )),
        );
    }

    let redirect_to = app_state.config.confirm_redirect_url();
    match app_state
        .auth
        .sign_up(email, &form.password, &redirect_to)
        .await
    {
        Ok(()) => {
            info!(redirect_to = %redirect_to, "Sign-up submitted");
            (
                StatusCode::OK,
                Html(html::page(
                    "Check your inbox",
                    &format!(
                        "<h1>Check your inbox</h1><p>We sent a confirmation link to {}.</p>",
                        html::escape(email)
                    ),
                )),
            )
        }
        Err(e) => {
            warn!(error = %e, "Sign-up failed");
            (
                StatusCode::BAD_REQUEST,
                Html(html::page(
                    "Sign up",
                    &format!(
                        "<h1>Error</h1><p>Error signing up: {}</p>{}",
                        html::escape(e.message()),
                        back_to_login
                    ),
                )),
            )
        }
    }
}
