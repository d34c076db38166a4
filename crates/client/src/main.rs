//! topdon-remote
//!
//! Terminal remote control for a networked thermal camera.

use anyhow::{Context, Result};
use clap::Parser;
use client::cli::{self, Args, Commands};
use client::config::ClientConfig;
use client::network::CameraClient;
use client::tui;
use common::setup_logging;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle --save-config flag early (before loading config)
    if args.save_config {
        let config = ClientConfig::default();
        let path = ClientConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    // Load configuration first (to get log level from config if not specified)
    let mut config = if let Some(ref path) = args.config {
        ClientConfig::load(Some(path.clone())).context("Failed to load configuration")?
    } else {
        ClientConfig::load_or_default()
    };
    args.apply_overrides(&mut config)?;

    let command = args.command.unwrap_or(Commands::Tui);

    // The TUI owns the terminal, so its logs go to a file
    let log_file = (command == Commands::Tui).then(|| config.log_file());
    setup_logging(&config.client.log_level, log_file.as_deref())
        .context("Failed to setup logging")?;

    info!("topdon-remote v{}", env!("CARGO_PKG_VERSION"));
    info!("Camera: {}", config.device.base_url);

    let camera = CameraClient::new(&config.device.base_url, config.request_timeout())
        .context("Failed to create HTTP client")?;

    let result = match command {
        Commands::Tui => tui::run(camera, &config).await,
        command => cli::run_command(command, &camera, &config).await,
    };

    info!("Client shutting down...");
    result
}
