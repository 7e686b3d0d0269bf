//! Application state shared by all requests

use crate::{
    auth::{sessions::MemorySessionStore, users::MemoryUserStore},
    routes, WebConfig, WebError, WebResult,
};
use albatross_core::GateConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared state; everything but the stores is read-only after startup
#[derive(Debug, Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<WebConfig>,
    /// Compiled access gate
    pub gate: Arc<GateConfig>,
    /// Credential store
    pub users: Arc<MemoryUserStore>,
    /// Session store
    pub sessions: MemorySessionStore,
}

impl AppState {
    /// Create a new application state. Fails if any gate pattern is malformed.
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let gate = config.gate.compile()?;
        if routes::is_reserved(&config.gate.login_url) {
            return Err(WebError::Config(format!(
                "login_url {:?} collides with a built-in route",
                config.gate.login_url
            )));
        }

        let users = if config.users.is_empty() && config.dev_mode {
            MemoryUserStore::with_default_admin().await?
        } else {
            MemoryUserStore::from_seeds(&config.users).await?
        };

        let sessions = MemorySessionStore::new(Duration::from_secs(config.session.cookie_age_secs));

        let state = Self {
            config: Arc::new(config),
            gate: Arc::new(gate),
            users: Arc::new(users),
            sessions,
        };

        info!("Application state initialized successfully");
        Ok(state)
    }

    pub fn login_url(&self) -> &str {
        &self.config.gate.login_url
    }
}
