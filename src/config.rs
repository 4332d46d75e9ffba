//! Configuration for the gateway server.
//!
//! Loaded from `mediagate.toml`. Every section and field is optional and
//! falls back to the defaults in [`crate::constants`]:
//!
//! - [`ServerConfig`] - listen address
//! - [`StoreConfig`] - which object store backs the gateway
//! - [`CachePolicy`] - browser and edge cache lifetimes
//! - [`LoggingConfig`] - log output format
//! - [`MetricsConfig`] - Prometheus exporter

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::constants;
use crate::gateway::CachePolicy;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// mediagate.toml configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cache: CachePolicy,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Listen address.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    constants::DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    constants::DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Which object store backs the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Filesystem,
    Memory,
}

/// Object store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Base directory of the filesystem store.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(constants::DEFAULT_STORE_PATH)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

fn default_metrics_port() -> u16 {
    constants::DEFAULT_METRICS_PORT
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

impl Config {
    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - Fields have invalid types or unknown sections are present
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load from `path` if given, else from `mediagate.toml` when it exists,
    /// else use defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named or discovered file cannot be
    /// loaded.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None if Path::new(constants::CONFIG_FILE).exists() => {
                Self::load_from(constants::CONFIG_FILE)
            },
            None => Ok(Self::default()),
        }
    }

    /// Socket address the gateway listens on.
    ///
    /// # Errors
    ///
    /// Returns an error if `server.host` is not an IP address.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .with_context(|| format!("Invalid server.host '{}'", self.server.host))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Socket address of the metrics exporter (same host as the gateway).
    ///
    /// # Errors
    ///
    /// Returns an error if `server.host` is not an IP address.
    pub fn metrics_addr(&self) -> Result<SocketAddr> {
        let mut addr = self.listen_addr()?;
        addr.set_port(self.metrics.port);
        Ok(addr)
    }

    /// Validate configuration with comprehensive checks.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails with one or more errors:
    /// - Unparsable host or port 0
    /// - Empty filesystem store path
    /// - Metrics exporter on the gateway's own port
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 1. Listen address
        if self.server.host.parse::<IpAddr>().is_err() {
            errors.push(format!(
                "server.host must be an IP address (got: '{}')",
                self.server.host
            ));
        }
        if self.server.port == 0 {
            errors.push("server.port cannot be 0. Use a valid port number (1-65535)".to_string());
        } else if self.server.port < 1024 {
            warnings.push(format!(
                "server.port {} is a system/privileged port (< 1024)",
                self.server.port
            ));
        }

        // 2. Store
        if self.store.backend == StoreBackend::Filesystem
            && self.store.path.as_os_str().is_empty()
        {
            errors.push("store.path cannot be empty for the filesystem backend".to_string());
        }
        if self.store.backend == StoreBackend::Memory {
            warnings.push(
                "store.backend is 'memory': the gateway starts empty and will answer 404"
                    .to_string(),
            );
        }

        // 3. Cache policy
        if self.cache.s_maxage < self.cache.max_age {
            warnings.push(format!(
                "cache.s_maxage ({}) is shorter than cache.max_age ({})",
                self.cache.s_maxage, self.cache.max_age
            ));
        }

        // 4. Metrics
        if self.metrics.enabled {
            if self.metrics.port == 0 {
                errors.push("metrics.port cannot be 0".to_string());
            } else if self.metrics.port == self.server.port {
                errors.push(format!(
                    "metrics.port {} conflicts with server.port",
                    self.metrics.port
                ));
            }
        }

        if !errors.is_empty() {
            bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }

        Ok(ValidationResult { warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse("");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.store.backend, StoreBackend::Filesystem);
        assert_eq!(config.store.path, PathBuf::from("media"));
        assert_eq!(config.cache, CachePolicy::default());
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [store]
            backend = "memory"

            [cache]
            max_age = 60
            s_maxage = 3600

            [logging]
            format = "json"

            [metrics]
            enabled = true
            port = 9100
            "#,
        );
        assert_eq!(config.listen_addr().unwrap(), "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.metrics_addr().unwrap(), "0.0.0.0:9100".parse().unwrap());
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(
            config.cache,
            CachePolicy {
                max_age: 60,
                s_maxage: 3600
            }
        );
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_partial_cache_section_keeps_other_default() {
        let config = parse("[cache]\nmax_age = 10\n");
        assert_eq!(config.cache.max_age, 10);
        assert_eq!(config.cache.s_maxage, constants::DEFAULT_S_MAXAGE_SECS);
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(toml::from_str::<Config>("[bogus]\nx = 1\n").is_err());
    }

    #[test]
    fn test_validate_default_config() {
        let result = Config::default().validate().unwrap();
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_validate_port_zero() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server.port cannot be 0"));
    }

    #[test]
    fn test_validate_privileged_port_warns() {
        let mut config = Config::default();
        config.server.port = 80;
        let result = config.validate().unwrap();
        assert!(result.has_warnings());
        assert!(result.warnings[0].contains("privileged"));
    }

    #[test]
    fn test_validate_bad_host() {
        let mut config = Config::default();
        config.server.host = "localhost".into();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server.host"));
        assert!(config.listen_addr().is_err());
    }

    #[test]
    fn test_validate_empty_store_path() {
        let mut config = Config::default();
        config.store.path = PathBuf::new();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("store.path"));
    }

    #[test]
    fn test_validate_metrics_port_conflict() {
        let mut config = Config::default();
        config.metrics.enabled = true;
        config.metrics.port = config.server.port;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("conflicts"));
    }

    #[test]
    fn test_validate_multiple_errors() {
        let mut config = Config::default();
        config.server.port = 0;
        config.store.path = PathBuf::new();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server.port"));
        assert!(err.contains("store.path"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 8080").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.server.port, 8080);

        let config = Config::load_or_default(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load_from("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
