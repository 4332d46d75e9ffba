//! `mediagate check`: validate a configuration file without serving.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::config::{Config, StoreBackend};

/// Arguments for `mediagate check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Config file (defaults to ./mediagate.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Load and validate the configuration, printing a summary.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or fails validation.
pub fn execute(args: &CheckArgs) -> Result<()> {
    let config = Config::load_or_default(args.config.as_deref())?;
    let validation = config.validate()?;

    for warning in &validation.warnings {
        println!("Warning: {warning}");
    }

    println!("Configuration OK");
    println!("  listen:  http://{}", config.listen_addr()?);
    match config.store.backend {
        StoreBackend::Filesystem => {
            println!("  store:   filesystem ({})", config.store.path.display());
        },
        StoreBackend::Memory => println!("  store:   memory"),
    }
    println!("  cache:   {}", config.cache.header_value());
    if config.metrics.enabled {
        println!("  metrics: http://{}/metrics", config.metrics_addr()?);
    }

    Ok(())
}
