//! Entry point for the tricktable lobby/messaging server.

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use tricktable::config::{find_available_port, Config};
use tricktable::server::{self, AppState};

/// Lobby and realtime channel server for tricktable.
#[derive(Parser, Debug, Clone)]
#[command(name = "tricktable-server", version, about = "tricktable lobby server")]
struct ServerCli {
    /// Path to config file
    #[arg(long, default_value = "tricktable-server.toml")]
    config: PathBuf,

    /// Port to bind (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Persist CLI overrides back to the config file
    #[arg(long, default_value_t = false)]
    persist: bool,

    /// Verbose logging
    #[arg(long, default_value_t = false)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = ServerCli::parse();

    let log_filter = if cli.debug {
        "debug".to_string()
    } else {
        "tricktable=info,tricktable_shared=info,warn".to_string()
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(cli.debug)
        .with_file(cli.debug)
        .with_line_number(cli.debug)
        .init();

    let config_path = cli.config.clone();
    let mut cfg = Config::load_or_create(&config_path)
        .with_context(|| format!("loading or creating config '{}'", config_path.display()))?;

    if let Some(port) = cli.port {
        cfg.port = port;
    }
    if cli.persist {
        cfg.save(&config_path)
            .with_context(|| format!("saving updated config '{}'", config_path.display()))?;
    }

    let port = find_available_port(cfg.port)?;
    if port != cfg.port {
        tracing::warn!(port, "configured port was not available, using alternative");
    }
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    tracing::info!(config = %config_path.display(), port, "starting server");
    let state = AppState::new(cfg, Some(config_path));
    server::run_server(addr, state).await?;
    Ok(())
}
