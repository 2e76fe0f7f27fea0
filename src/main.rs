//! Wakacraft CLI - standalone service for player session time tracking

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wakacraft::{Config, Core};

#[derive(Parser, Debug)]
#[command(name = "wakacraft")]
#[command(author = "Team Diluvian")]
#[command(version)]
#[command(about = "Wakacraft - player session time tracking service", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.wakacraft/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initialize a new config file with defaults
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("wakacraft={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Handle --init flag
    if args.init {
        let config_path = wakacraft::config::expand_path(&args.config);
        if config_path.exists() {
            tracing::warn!("Config file already exists: {}", config_path.display());
            return Ok(());
        }
        Config::create_default(&config_path)?;
        tracing::info!("Created default config at: {}", config_path.display());
        return Ok(());
    }

    // Load configuration
    let config_path = wakacraft::config::expand_path(&args.config);
    let mut config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        tracing::warn!(
            "Config file not found at {}, using defaults",
            config_path.display()
        );
        Config::default()
    };
    config.apply_env_overrides();

    // Create core instance (connects the pool and verifies the schema)
    let core = Core::new(config)?;
    tracing::info!("Wakacraft ready, database at {}", core.config.db_path().display());

    // Run until interrupted
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    core.shutdown()?;

    Ok(())
}
