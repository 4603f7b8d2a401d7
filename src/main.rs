//! Pulse server: real-time presence and broadcast relay.
//!
//! Main entry point that loads configuration, sets up logging and runs the
//! HTTP/WebSocket server.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use pulse_core::config::AppConfig;

/// Pulse: real-time presence and broadcast relay
#[derive(Debug, Parser)]
#[command(name = "pulse-server", version, about, long_about = None)]
struct Cli {
    /// Environment name, selects `{config-dir}/{env}.toml`
    #[arg(short, long, env = "PULSE_ENV", default_value = "development")]
    env: String,

    /// Directory holding `default.toml` and per-environment overrides
    #[arg(long, env = "PULSE_CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Validate the configuration and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config_dir, &cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if cli.check_config {
        println!(
            "Configuration OK (environment: {}, config dir: {})",
            config.environment,
            cli.config_dir.display()
        );
        return;
    }

    init_logging(&config);

    if let Err(e) = pulse_api::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
