pub mod auth;
pub mod confirm;
pub mod home_handler;
pub mod html;

use crate::models::AppState;
use auth::{reset_password_handler, signup_handler};
use axum::{
    Router,
    routing::{get, post},
};
use confirm::confirm_handler;
use home_handler::{home_handler, login_handler};
use time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

pub fn router(app_state: AppState) -> Router {
    let session_store = MemoryStore::default();
    let session_expiry = Expiry::OnInactivity(Duration::hours(6));
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(session_expiry);

    let routes = app_state.config.routes.clone();

    Router::new()
        .route(&routes.home, get(home_handler))
        .route(&routes.login, get(login_handler))
        .route("/confirm", get(confirm_handler))
        .route("/auth/signup", post(signup_handler))
        .route("/auth/reset-password", post(reset_password_handler))
        .layer(session_layer)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::mock::{Call, MockAuth};
    use crate::models::AppConfig;
    use axum::{
        body::{Body, to_bytes},
        http::{
            Request, StatusCode,
            header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        },
        response::Response,
    };
    use std::env::VarError;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(auth: Arc<MockAuth>) -> Router {
        app_with_vars(auth, &[])
    }

    fn app_with_vars(auth: Arc<MockAuth>, vars: &[(&'static str, &'static str)]) -> Router {
        let config = AppConfig::from_lookup(|name| match name {
            "SUPABASE_URL" => Ok("https://abc.supabase.co".to_string()),
            "SUPABASE_ANON_KEY" => Ok("anon".to_string()),
            _ => vars
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
                .ok_or(VarError::NotPresent),
        })
        .unwrap();
        router(AppState { config, auth })
    }

    fn session_cookie(response: &Response) -> String {
        response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .unwrap()
            .to_string()
    }

    fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn form_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_confirm_success_page() {
        let auth = Arc::new(MockAuth::succeeding());
        let response = app_with(auth.clone())
            .oneshot(get_request("/confirm?token=abc123"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(SET_COOKIE));
        let body = body_text(response).await;
        assert!(body.contains("Email confirmed!"));
        assert!(body.contains(r#"content="2;url=/""#));
        assert_eq!(
            auth.calls(),
            vec![Call::VerifyOneTimeCode {
                token: "abc123".to_string(),
                kind: "email".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_confirm_rejected_page() {
        let auth = Arc::new(MockAuth::failing("Token expired"));
        let response = app_with(auth)
            .oneshot(get_request("/confirm?token=abc123"))
            .await
            .unwrap();

        assert!(!response.headers().contains_key(SET_COOKIE));
        let body = body_text(response).await;
        assert!(body.contains("Error confirming email: Token expired"));
        assert!(body.contains(r#"content="2;url=/login""#));
    }

    #[tokio::test]
    async fn test_confirm_invalid_link_page() {
        let auth = Arc::new(MockAuth::succeeding());
        let response = app_with(auth.clone())
            .oneshot(get_request("/confirm?foo=bar"))
            .await
            .unwrap();

        let body = body_text(response).await;
        assert!(body.contains("Invalid confirmation link."));
        assert!(body.contains(r#"content="2;url=/login""#));
        assert!(auth.calls().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_triple_passes_full_url() {
        let auth = Arc::new(MockAuth::succeeding());
        let response = app_with(auth.clone())
            .oneshot(get_request(
                "/confirm?access_token=x&refresh_token=y&type=signup",
            ))
            .await
            .unwrap();

        assert!(body_text(response).await.contains("Email confirmed!"));
        assert_eq!(
            auth.calls(),
            vec![Call::ExchangeSession(
                "http://localhost:10000/confirm?access_token=x&refresh_token=y&type=signup"
                    .to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_home_requires_confirmed_session() {
        let app = app_with(Arc::new(MockAuth::succeeding()));

        let response = app.clone().oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/login");

        let confirmed = app
            .clone()
            .oneshot(get_request("/confirm?token=abc123"))
            .await
            .unwrap();
        let cookie = session_cookie(&confirmed);

        let home = app.oneshot(get_with_cookie("/", &cookie)).await.unwrap();
        assert_eq!(home.status(), StatusCode::OK);
        assert!(body_text(home).await.contains("Signed in as ada@example.com."));
    }

    #[tokio::test]
    async fn test_confirm_rotates_session_id() {
        let app = app_with(Arc::new(MockAuth::succeeding()));

        let first = app
            .clone()
            .oneshot(get_request("/confirm?token=abc123"))
            .await
            .unwrap();
        let first_cookie = session_cookie(&first);

        let second = app
            .clone()
            .oneshot(get_with_cookie("/confirm?token=def456", &first_cookie))
            .await
            .unwrap();
        let second_cookie = session_cookie(&second);
        assert_ne!(first_cookie, second_cookie);

        let stale = app
            .clone()
            .oneshot(get_with_cookie("/", &first_cookie))
            .await
            .unwrap();
        assert_eq!(stale.status(), StatusCode::SEE_OTHER);

        let home = app.oneshot(get_with_cookie("/", &second_cookie)).await.unwrap();
        assert_eq!(home.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_failed_confirm_clears_earlier_sign_in() {
        let app = app_with(Arc::new(MockAuth::succeeding()));

        let confirmed = app
            .clone()
            .oneshot(get_request("/confirm?token=abc123"))
            .await
            .unwrap();
        let cookie = session_cookie(&confirmed);

        let failed = app
            .clone()
            .oneshot(get_with_cookie("/confirm?foo=bar", &cookie))
            .await
            .unwrap();
        assert!(body_text(failed).await.contains("Invalid confirmation link."));

        let home = app.oneshot(get_with_cookie("/", &cookie)).await.unwrap();
        assert_eq!(home.status(), StatusCode::SEE_OTHER);
        assert_eq!(home.headers().get(LOCATION).unwrap(), "/login");
    }

    #[tokio::test]
    async fn test_signup_sends_confirm_redirect() {
        let auth = Arc::new(MockAuth::succeeding());
        let response = app_with(auth.clone())
            .oneshot(form_request(
                "/auth/signup",
                "email=ada%40example.com&password=hunter22",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("ada@example.com"));
        assert_eq!(
            auth.calls(),
            vec![Call::SignUp {
                email: "ada@example.com".to_string(),
                redirect_to: "http://localhost:10000/confirm".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_signup_rejects_bad_email_locally() {
        let auth = Arc::new(MockAuth::succeeding());
        let response = app_with(auth.clone())
            .oneshot(form_request("/auth/signup", "email=nope&password=hunter22"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(auth.calls().is_empty());
    }

    #[tokio::test]
    async fn test_signup_error_links_configured_login_route() {
        let app = app_with_vars(
            Arc::new(MockAuth::failing("User already registered")),
            &[("LOGIN_ROUTE", "/signin")],
        );

        let response = app
            .clone()
            .oneshot(form_request(
                "/auth/signup",
                "email=ada%40example.com&password=hunter22",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_text(response).await;
        assert!(body.contains(r#"<a href="/signin">Back to Login</a>"#));
        assert!(!body.contains(r#"href="/login""#));

        let login = app.oneshot(get_request("/signin")).await.unwrap();
        assert_eq!(login.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reset_password_error_is_shown() {
        let auth = Arc::new(MockAuth::failing(
            "For security purposes, you can only request this once every 60 seconds",
        ));
        let response = app_with(auth.clone())
            .oneshot(form_request("/auth/reset-password", "email=ada%40example.com"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response)
            .await
            .contains("Error requesting password reset: For security purposes"));
        assert_eq!(
            auth.calls(),
            vec![Call::ResetPassword {
                email: "ada@example.com".to_string(),
                redirect_to: "http://localhost:10000/confirm".to_string(),
            }]
        );
    }
}
