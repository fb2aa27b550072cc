use crate::confirm::ConfirmationFlow;
use crate::handlers::html;
use crate::models::AppState;
use crate::models::confirm::{ConfirmationOutcome, Navigation};
use axum::{
    extract::State,
    http::Uri,
    response::{Html, IntoResponse},
};
use tower_sessions::Session;
use tracing::{info, warn};

pub const SESSION_ACCESS_TOKEN_KEY: &str = "supabase_access_token";
pub const SESSION_REFRESH_TOKEN_KEY: &str = "supabase_refresh_token";
pub const SESSION_USER_KEY: &str = "supabase_user";

pub async fn confirm_handler(
    State(app_state): State<AppState>,
    uri: Uri,
    session: Session,
) -> impl IntoResponse {
    // Browsers never send the fragment, so the query string is all we get here.
    let full_url = format!(
        "{}{}",
        app_state.config.site_url,
        uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/confirm")
    );

    let flow = ConfirmationFlow::new(app_state.auth.clone());
    let redeemed = flow.redeem(&full_url).await;

    // Whatever this link proves, it replaces any earlier sign-in.
    clear_signed_in(&session).await;

    let outcome = match redeemed {
        Ok(redeemed) => {
            info!(user_id = %redeemed.user.id, "Storing confirmed session");
            if let Err(e) = session.cycle_id().await {
                warn!(error = ?e, "Failed to rotate session id");
            }
            if let Err(e) = session
                .insert(SESSION_ACCESS_TOKEN_KEY, redeemed.access_token.clone())
                .await
            {
                warn!(error = ?e, "Failed to store access token in session");
            }
            if let Some(refresh_token) = &redeemed.refresh_token {
                if let Err(e) = session
                    .insert(SESSION_REFRESH_TOKEN_KEY, refresh_token.clone())
                    .await
                {
                    warn!(error = ?e, "Failed to store refresh token in session");
                }
            }
            if let Err(e) = session.insert(SESSION_USER_KEY, &redeemed.user).await {
                warn!(error = ?e, "Failed to store user in session");
            }
            ConfirmationOutcome::Success
        }
        Err(e) => ConfirmationOutcome::Error(e),
    };

    let navigation = outcome
        .navigation(&app_state.config.routes, app_state.config.redirect_delay)
        .unwrap_or_else(|| Navigation {
            route: app_state.config.routes.login.clone(),
            delay: app_state.config.redirect_delay,
        });

    Html(html::redirect_page(&outcome.status_text(), &navigation))
}

async fn clear_signed_in(session: &Session) {
    for key in [
        SESSION_ACCESS_TOKEN_KEY,
        SESSION_REFRESH_TOKEN_KEY,
        SESSION_USER_KEY,
    ] {
        if let Err(e) = session.remove_value(key).await {
            warn!(error = ?e, key, "Failed to clear session value");
        }
    }
}
