//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Store connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_controller_url")]
    pub controller_url: String,

    #[serde(default = "default_broker_url")]
    pub broker_url: String,

    /// Optional bearer token sent with every store request
    pub auth_token: Option<String>,

    #[serde(default = "default_store_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_schema_cache_ttl")]
    pub schema_cache_ttl_ms: u64,
}

fn default_controller_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_broker_url() -> String {
    "http://localhost:8099".to_string()
}

fn default_store_timeout() -> u64 {
    10_000 // 10 seconds
}

fn default_schema_cache_ttl() -> u64 {
    60_000 // 1 minute
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            controller_url: default_controller_url(),
            broker_url: default_broker_url(),
            auth_token: None,
            request_timeout_ms: default_store_timeout(),
            schema_cache_ttl_ms: default_schema_cache_ttl(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        // Try default config locations
        let config_paths = [
            dirs::config_dir().map(|p| p.join("trellis").join("config.toml")),
            Some(PathBuf::from("/etc/trellis/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Store overrides
        if let Ok(url) = std::env::var("TRELLIS_CONTROLLER_URL") {
            self.store.controller_url = url;
        }
        if let Ok(url) = std::env::var("TRELLIS_BROKER_URL") {
            self.store.broker_url = url;
        }
        if let Ok(token) = std::env::var("TRELLIS_AUTH_TOKEN") {
            self.store.auth_token = Some(token);
        }

        // API overrides
        if let Ok(host) = std::env::var("TRELLIS_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("TRELLIS_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("TRELLIS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TRELLIS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Trellis Configuration
#
# Environment variables override these settings:
# - TRELLIS_CONTROLLER_URL
# - TRELLIS_BROKER_URL
# - TRELLIS_AUTH_TOKEN
# - TRELLIS_API_HOST
# - TRELLIS_API_PORT
# - TRELLIS_LOG_LEVEL
# - TRELLIS_LOG_FORMAT

[store]
# Store controller URL (table listing and schemas)
controller_url = "http://localhost:9000"

# Store broker URL (SQL execution)
broker_url = "http://localhost:8099"

# Optional bearer token for authenticated clusters
# auth_token = ""

# Per-request timeout (ms)
request_timeout_ms = 10000

# How long table listings and schemas stay cached (ms)
schema_cache_ttl_ms = 60000

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

# Request timeout in seconds
request_timeout_secs = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/trellis/trellis.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.controller_url, "http://localhost:9000");
        assert_eq!(config.store.broker_url, "http://localhost:8099");
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [store]
            broker_url = "http://pinot-broker:8099"

            [api]
            port = 9999
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.store.broker_url, "http://pinot-broker:8099");
        // untouched fields keep their defaults
        assert_eq!(config.store.controller_url, "http://localhost:9000");
        assert_eq!(config.api.port, 9999);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config =
            toml::from_str(&generate_default_config()).expect("generated config should parse");
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.store.schema_cache_ttl_ms, 60_000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nport = 7070\n").expect("write config");

        let config = Config::load(&path).expect("config should load");
        assert_eq!(config.api.port, 7070);
        assert_eq!(config.store.controller_url, "http://localhost:9000");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent/trellis.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nport = ").expect("write config");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
