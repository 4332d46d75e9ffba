//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LogFormat;

/// Initialize stdout logging.
///
/// `RUST_LOG` wins when set; otherwise `info` (or `debug` when `verbose`).
/// Calling this twice is harmless: the second initialization is ignored.
pub fn init(format: LogFormat, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };

    if let Err(e) = result {
        eprintln!("Warning: logging already initialized: {e}");
    }
}
