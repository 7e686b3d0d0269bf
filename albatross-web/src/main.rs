//! Albatross Web Server
//!
//! Session-gated dashboard with a login page.

use albatross_web::{init_logging, AlbatrossServer, WebConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Albatross Web Server - dashboard behind a path-based access gate
#[derive(Parser)]
#[command(name = "albatross-web")]
#[command(about = "Session-gated dashboard server")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

const DEFAULT_CONFIG_FILE: &str = "albatross.toml";

fn load_config(args: &Args) -> anyhow::Result<WebConfig> {
    let config = match &args.config {
        Some(path) => WebConfig::from_file(path)?,
        None if std::path::Path::new(DEFAULT_CONFIG_FILE).exists() => {
            WebConfig::from_file(DEFAULT_CONFIG_FILE)?
        }
        None => WebConfig::default(),
    };

    let mut config = config.apply_env();
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.dev {
        config.dev_mode = true;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
        config.logging.filter_directives = vec![
            format!("albatross_core={}", level),
            format!("albatross_web={}", level),
            "tower_http=debug".to_string(),
        ];
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before reading ALBATROSS_* overrides
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = load_config(&args)?;

    init_logging(&config.logging)?;

    info!(
        address = %config.address(),
        dev_mode = config.dev_mode,
        login_url = %config.gate.login_url,
        "Loaded configuration"
    );
    if config.users.is_empty() && !config.dev_mode {
        warn!("No users configured; nobody will be able to sign in");
    }

    let server = match AlbatrossServer::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to build server: {}", e);
            return Err(e.into());
        }
    };

    server.start().await?;
    Ok(())
}
