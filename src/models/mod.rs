pub mod app_config;
pub mod auth;
pub mod confirm;

pub use app_config::{AppConfig, AppState};
