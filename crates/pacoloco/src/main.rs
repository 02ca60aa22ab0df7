//! Pacoloco - caching proxy for pacman repositories
//!
//! Startup entry point: validates the configuration and reports it.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use pacoloco_core::Config;

/// Pacoloco - caching proxy for pacman repositories
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "PACOLOCO_CONFIG", default_value = "/etc/pacoloco.yaml")]
    config: PathBuf,

    /// Log level, overridden by RUST_LOG
    #[arg(long, env = "PACOLOCO_LOG", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Print the effective configuration as YAML
    #[arg(long)]
    print: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Any configuration error ends startup with a non-zero exit status
    let config = load_config(&args.config)?;

    init_logging(&args.log_level, args.log_format, config.set_timestamp_to_logs);

    info!("Starting Pacoloco v{}", env!("CARGO_PKG_VERSION"));
    info!("Cache directory: {}", config.cache_dir.display());
    info!("Port: {}", config.port);
    info!("Socket activation: {}", config.socket_activation);
    for (name, repo) in &config.repos {
        info!("Repo '{}': {:?}", name, repo.source());
    }
    match &config.prefetch {
        Some(prefetch) => info!(
            "Prefetch: '{}' (unaccessed {} days, unupdated {} days)",
            prefetch.cron, prefetch.ttl_unaccessed_in_days, prefetch.ttl_unupdated_in_days
        ),
        None => info!("Prefetch disabled"),
    }

    if args.print {
        print!("{}", config.to_yaml()?);
    }

    Ok(())
}

/// Load the configuration, naming the file in any error
fn load_config(path: &Path) -> Result<Config> {
    Config::load(path).with_context(|| format!("Invalid configuration in {}", path.display()))
}

/// Initialize logging
fn init_logging(level: &str, format: LogFormat, timestamps: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match (format, timestamps) {
        (LogFormat::Pretty, true) => registry.with(fmt::layer()).init(),
        (LogFormat::Pretty, false) => registry.with(fmt::layer().without_time()).init(),
        (LogFormat::Json, true) => registry.with(fmt::layer().json()).init(),
        (LogFormat::Json, false) => registry.with(fmt::layer().json().without_time()).init(),
    }
}
