//! Configuration management for the application
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const ENV_PREFIX: &str = "HIBACHI_";
const CONFIG_PATH_VAR: &str = "HIBACHI_CONFIG";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/hibachi".to_string(),
            max_connections: 20,
            timeout_seconds: 30,
        }
    }
}

/// Page size limits applied to every listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when a request names none
    pub default_limit: u32,
    /// Largest page size a request may ask for
    pub max_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { default_limit: 50, max_limit: 200 }
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub bind: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0:8080".to_string() }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Logging format: "json" or "text"
    pub format: String,
    /// Default log level if no RUST_LOG is set
    pub default_level: String,
    /// Custom filter for dependency logs
    pub dependency_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            default_level: "info".to_string(),
            dependency_filter: Some(
                "hyper=warn,h2=warn,tower=info,tower_http=info,mio=warn,rustls=warn,sqlx=warn"
                    .to_string(),
            ),
        }
    }
}

/// StatsD configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsdConfig {
    pub prefix: String,
    pub addr: String,
    pub use_tags: bool,
    pub enabled: bool,
}

impl Default for StatsdConfig {
    fn default() -> Self {
        Self {
            prefix: "hibachi".to_string(),
            addr: "127.0.0.1:8125".to_string(),
            use_tags: false,
            enabled: false,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub statsd: StatsdConfig,
}

impl Config {
    /// Load configuration from environment variables and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv().ok();

        let mut figment = Self::defaults();

        // The file location itself can only come from the environment
        if let Some(config_path) = std::env::var_os(CONFIG_PATH_VAR) {
            let path = Path::new(&config_path);
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            } else {
                tracing::warn!("Config file {} not found, ignoring", path.display());
            }
        }

        let config = Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML document layered over the defaults
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config = Self::extract(Self::defaults().merge(Toml::string(contents)))?;
        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.is_empty() {
            return Err(ConfigError::MissingConfig("Database URL is required".to_string()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        let pagination = &self.pagination;
        if pagination.default_limit == 0 || pagination.default_limit > pagination.max_limit {
            return Err(ConfigError::InvalidValue(format!(
                "pagination.default_limit must be between 1 and max_limit ({}), got {}",
                pagination.max_limit, pagination.default_limit
            )));
        }

        if self.api.bind.is_empty() {
            return Err(ConfigError::MissingConfig("API bind address is required".to_string()));
        }

        Ok(())
    }
}
