//! Albatross Web Server
//!
//! Dashboard front end whose routes sit behind the access gate middleware.

pub mod auth;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;

// Re-export main types
pub use server::AlbatrossServer;
pub use state::AppState;

use albatross_core::{AlbatrossError, GateSettings, LoggingConfig};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    routes::all_routes(state.login_url())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::access_gate_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Session cookie settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Name of the session cookie
    pub cookie_name: String,
    /// Lifetime of a persisted ("remember me") session, in seconds
    pub cookie_age_secs: u64,
    /// Only send the cookie over HTTPS
    pub secure_cookie: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: "sessionid".to_string(),
            cookie_age_secs: 60 * 60 * 24 * 7 * 2,
            secure_cookie: false,
        }
    }
}

/// An account to load into the in-memory credential store at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSeed {
    pub username: String,
    pub password: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Configuration for the web server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode
    pub dev_mode: bool,
    /// Access gate patterns
    pub gate: GateSettings,
    /// Session cookie settings
    pub session: SessionSettings,
    /// Logging setup
    pub logging: LoggingConfig,
    /// Accounts seeded into the credential store
    pub users: Vec<UserSeed>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            gate: GateSettings {
                required_patterns: vec![r"/(.*)$".to_string()],
                exempt_patterns: vec![
                    r"/login(.*)$".to_string(),
                    r"/logout(.*)$".to_string(),
                    r"/api/health$".to_string(),
                ],
                ..GateSettings::default()
            },
            session: SessionSettings::default(),
            logging: LoggingConfig::default(),
            users: Vec::new(),
        }
    }
}

impl WebConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> WebResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            WebError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> WebResult<Self> {
        toml::from_str(content).map_err(|e| WebError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Override values from `ALBATROSS_*` environment variables
    pub fn apply_env(mut self) -> Self {
        if let Ok(host) = std::env::var("ALBATROSS_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("ALBATROSS_PORT").ok().and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(dev_mode) = std::env::var("ALBATROSS_DEV_MODE")
            .ok()
            .and_then(|d| d.parse().ok())
        {
            self.dev_mode = dev_mode;
        }
        self
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] AlbatrossError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match &self {
            WebError::Core(core) => core.log(),
            other => error!(error = %other, "Request failed"),
        }
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

/// Initialize logging for the web server
pub fn init_logging(config: &LoggingConfig) -> WebResult<()> {
    albatross_core::init_logging(config).map_err(|e| WebError::Config(e.to_string()))
}
