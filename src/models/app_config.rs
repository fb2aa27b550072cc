use crate::auth::AuthCapability;
use crate::models::confirm::Routes;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SITE_URL: &str = "http://localhost:10000";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:10000";
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 2000;
pub const DEFAULT_AUTH_REQUEST_TIMEOUT_SECS: u64 = 30;

const RESERVED_ROUTES: [&str; 3] = ["/confirm", "/auth/signup", "/auth/reset-password"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not found: {1}")]
    Missing(&'static str, std::env::VarError),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub site_url: String,
    pub bind_addr: String,
    pub redirect_delay: Duration,
    pub auth_request_timeout: Duration,
    pub routes: Routes,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        use dotenvy::dotenv;

        dotenv().ok();

        Self::from_lookup(|name| std::env::var(name))
    }

    /// Builds the config from any variable source, so tests don't have to
    /// touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Result<String, std::env::VarError>,
    {
        let required = |name: &'static str| lookup(name).map_err(|e| ConfigError::Missing(name, e));
        let optional = |name: &'static str, default: &str| {
            lookup(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let supabase_url = required("SUPABASE_URL")?.trim_end_matches('/').to_string();
        url::Url::parse(&supabase_url).map_err(|e| ConfigError::Invalid {
            name: "SUPABASE_URL",
            reason: e.to_string(),
        })?;
        let supabase_anon_key = required("SUPABASE_ANON_KEY")?;

        let site_url = optional("SITE_URL", DEFAULT_SITE_URL)
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&site_url).map_err(|e| ConfigError::Invalid {
            name: "SITE_URL",
            reason: e.to_string(),
        })?;

        let bind_addr = optional("BIND_ADDR", DEFAULT_BIND_ADDR);

        let redirect_delay_ms = parse_u64(
            "CONFIRM_REDIRECT_DELAY_MS",
            &optional("CONFIRM_REDIRECT_DELAY_MS", &DEFAULT_REDIRECT_DELAY_MS.to_string()),
        )?;
        let timeout_secs = parse_u64(
            "AUTH_REQUEST_TIMEOUT_SECS",
            &optional(
                "AUTH_REQUEST_TIMEOUT_SECS",
                &DEFAULT_AUTH_REQUEST_TIMEOUT_SECS.to_string(),
            ),
        )?;

        let routes = Routes {
            home: optional("HOME_ROUTE", "/"),
            login: optional("LOGIN_ROUTE", "/login"),
        };
        for (name, route) in [("HOME_ROUTE", &routes.home), ("LOGIN_ROUTE", &routes.login)] {
            validate_route(name, route)?;
        }
        if routes.home == routes.login {
            return Err(ConfigError::Invalid {
                name: "LOGIN_ROUTE",
                reason: "must differ from HOME_ROUTE".to_string(),
            });
        }

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            site_url,
            bind_addr,
            redirect_delay: Duration::from_millis(redirect_delay_ms),
            auth_request_timeout: Duration::from_secs(timeout_secs),
            routes,
        })
    }

    /// Where confirmation emails send the user back to.
    pub fn confirm_redirect_url(&self) -> String {
        format!("{}/confirm", self.site_url)
    }
}

// Routes are mounted verbatim on the router, which panics on capture syntax
// and on paths it already serves.
fn validate_route(name: &'static str, route: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid { name, reason };

    if !route.starts_with('/') {
        return Err(invalid(format!("{route:?} must be an absolute path")));
    }
    if let Some(c) = route.chars().find(|c| matches!(c, '{' | '}' | '?' | '#')) {
        return Err(invalid(format!("{route:?} must not contain {c:?}")));
    }
    if route.split('/').any(|segment| segment.starts_with(':') || segment.starts_with('*')) {
        return Err(invalid(format!(
            "{route:?} must not have segments starting with ':' or '*'"
        )));
    }
    if RESERVED_ROUTES.contains(&route) {
        return Err(invalid(format!("{route:?} is already served")));
    }
    Ok(())
}

fn parse_u64(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
        name,
        reason: format!("{raw:?}: {e}"),
    })
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub auth: Arc<dyn AuthCapability>,
}
