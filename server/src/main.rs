use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use inventory_server::{AppState, serve};
use shared::config::load_config_or_default;

#[derive(Debug, Parser)]
#[command(name = "inventory-server", about = "Inventory tracker with live sync")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config_or_default(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    let addr = config.server.addr();
    info!(
        "Product store: {} (web dir: {})",
        config.paths.data_file, config.paths.web_dir
    );

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Server running on http://{}", addr);

    serve(listener, AppState::new(config)).await
}
