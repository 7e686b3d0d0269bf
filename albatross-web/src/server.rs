//! Albatross Web Server
//!
//! Binds the listener, serves the gated router until ctrl-c and keeps the
//! session store trimmed in the background.

use crate::{auth::sessions::MemorySessionStore, create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use std::time::Duration;
use tokio::{net::TcpListener, task::JoinHandle};
use tracing::{error, info};

/// How often expired sessions are purged from the store
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Main Albatross web server
pub struct AlbatrossServer {
    state: AppState,
}

impl AlbatrossServer {
    /// Create a new server; fails on malformed gate configuration
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config).await?;
        Ok(Self { state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.state.config.address();

        info!(
            address = %address,
            dev_mode = self.state.config.dev_mode,
            required = self.state.gate.required.len(),
            exempt = self.state.gate.exempt.len(),
            "Starting Albatross web server"
        );

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        let purge = spawn_session_purge(self.state.sessions.clone(), SESSION_PURGE_INTERVAL);
        let app = create_app(self.state);

        let served = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        purge.abort();

        if let Err(e) = served {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server shut down gracefully");
        Ok(())
    }
}

/// Drop expired session records every `every`, starting immediately
pub fn spawn_session_purge(sessions: MemorySessionStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            sessions.purge_expired().await;
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
