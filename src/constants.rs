//! Shared defaults.

/// Browser cache lifetime for served objects (one day).
pub const DEFAULT_MAX_AGE_SECS: u64 = 86_400;

/// Edge cache lifetime for served objects (30 days).
pub const DEFAULT_S_MAXAGE_SECS: u64 = 2_592_000;

/// `Cache-Control` for the default policy.
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=86400, s-maxage=2592000, immutable";

/// `Access-Control-Max-Age` on preflight responses.
pub const PREFLIGHT_MAX_AGE_SECS: &str = "86400";

/// Default listen host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8787;

/// Default Prometheus exporter port.
pub const DEFAULT_METRICS_PORT: u16 = 9787;

/// Default filesystem store directory.
pub const DEFAULT_STORE_PATH: &str = "media";

/// Default configuration file name.
pub const CONFIG_FILE: &str = "mediagate.toml";

/// Seconds to wait for in-flight connections on shutdown.
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
