//! `mediagate serve`: run the gateway.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use crate::config::{Config, StoreBackend};
use crate::gateway::MediaGateway;
use crate::logging;
use crate::metrics;
use crate::server::Server;
use crate::store::{FilesystemStore, MemoryStore, ObjectStore};

/// Arguments for `mediagate serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Config file (defaults to ./mediagate.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen host, overrides server.host
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port, overrides server.port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Filesystem store directory, overrides store.path
    #[arg(long)]
    pub store_path: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Applies command-line overrides on top of the loaded config.
    fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(path) = &self.store_path {
            config.store.backend = StoreBackend::Filesystem;
            config.store.path.clone_from(path);
        }
    }
}

/// Run the gateway until Ctrl-C.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the store cannot be
/// opened, or the listener cannot be bound.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    args.apply(&mut config);

    logging::init(config.logging.format, args.verbose);

    let validation = config.validate()?;
    for warning in &validation.warnings {
        warn!("{}", warning);
    }

    if config.metrics.enabled {
        let addr = config.metrics_addr()?;
        metrics::install_exporter(addr)?;
        info!("Metrics exporter listening on http://{}/metrics", addr);
    }

    let store = open_store(&config)?;
    let gateway = MediaGateway::from_arc(store).with_cache_policy(config.cache);

    Server::bind(gateway, config.listen_addr()?)
        .await?
        .serve()
        .await
}

/// Opens the configured object store.
fn open_store(config: &Config) -> Result<Arc<dyn ObjectStore>> {
    match config.store.backend {
        StoreBackend::Filesystem => {
            let store = FilesystemStore::open(&config.store.path)?;
            info!(
                objects_dir = %store.objects_dir().display(),
                "Using filesystem store"
            );
            Ok(Arc::new(store))
        },
        StoreBackend::Memory => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        },
    }
}
