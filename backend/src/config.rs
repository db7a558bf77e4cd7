//! Configuration management for the Vaccine Inventory Management Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with VIMS_ prefix (e.g. `VIMS_STORAGE__DRIVER`)

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::StatusThresholds;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Record store configuration
    pub storage: StorageConfig,

    /// Status classification thresholds
    pub status: StatusConfig,

    /// Ledger defaults
    pub ledger: LedgerConfig,

    /// Log output
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// Which record store backs the collections
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageDriver {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub driver: StorageDriver,

    /// PostgreSQL connection URL, required for the postgres driver
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection before failing the call
    pub acquire_timeout_secs: u64,

    /// Run embedded migrations on startup
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatusConfig {
    pub expiring_within_days: i64,
    pub low_stock_threshold: i32,
}

impl StatusConfig {
    pub fn thresholds(&self) -> StatusThresholds {
        StatusThresholds {
            expiring_within_days: self.expiring_within_days,
            low_stock_threshold: self.low_stock_threshold,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Recorded as `administeredBy` / `performedBy` when none is given
    pub default_actor: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("VIMS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::builder(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (VIMS_ prefix)
            .add_source(
                Environment::with_prefix("VIMS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Defaults only; used by tests and as the base layer of `load`
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder("test")?.build()?.try_deserialize()
    }

    fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let thresholds = StatusThresholds::default();
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("storage.driver", "memory")?
            .set_default("storage.max_connections", 10)?
            .set_default("storage.min_connections", 2)?
            .set_default("storage.acquire_timeout_secs", 30)?
            .set_default("storage.run_migrations", true)?
            .set_default("status.expiring_within_days", thresholds.expiring_within_days)?
            .set_default(
                "status.low_stock_threshold",
                i64::from(thresholds.low_stock_threshold),
            )?
            .set_default("ledger.default_actor", "Healthcare Admin")?
            .set_default("logging.json", false)
    }

    /// Storage URL, required by the postgres driver
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.storage
            .url
            .as_deref()
            .ok_or_else(|| ConfigError::NotFound("storage.url".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::defaults().unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.driver, StorageDriver::Memory);
        assert!(config.storage.url.is_none());
        assert_eq!(config.status.thresholds(), StatusThresholds::default());
        assert_eq!(config.ledger.default_actor, "Healthcare Admin");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_database_url_required() {
        let config = Config::defaults().unwrap();
        assert!(config.database_url().is_err());
    }
}
