use crate::handlers::confirm::confirm_handler::SESSION_USER_KEY;
use crate::handlers::html;
use crate::models::AppState;
use crate::models::auth::User;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect},
};
use tower_sessions::Session;

pub async fn home_handler(
    State(app_state): State<AppState>,
    session: Session,
) -> impl IntoResponse {
    let user: Option<User> = session.get(SESSION_USER_KEY).await.ok().flatten();

    match user {
        Some(user) => {
            let who = user.email.unwrap_or(user.id);
            Html(html::page(
                "Home",
                &format!("<h1>Welcome</h1><p>Signed in as {}.</p>", html::escape(&who)),
            ))
            .into_response()
        }
        None => Redirect::to(&app_state.config.routes.login).into_response(),
    }
}

pub async fn login_handler() -> impl IntoResponse {
    Html(html::page(
        "Login",
        r#"<h1>Sign up</h1>
<form method="post" action="/auth/signup">
    <input type="email" name="email" placeholder="Email" required>
    <input type="password" name="password" placeholder="Password" required>
    <button type="submit">Sign up</button>
</form>
<h2>Forgot your password?</h2>
<form method="post" action="/auth/reset-password">
    <input type="email" name="email" placeholder="Email" required>
    <button type="submit">Send reset link</button>
</form>"#,
    ))
}
