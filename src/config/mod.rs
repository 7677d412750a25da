//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `GOAL_BINGO` prefix and
//! `__` between nesting levels.
//!
//! # Example
//!
//! ```no_run
//! use goal_bingo::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("{} free generations per user", config.quota.free_generations);
//! ```

mod database;
mod engine;
mod error;
mod logging;
mod quota;
mod redis;

pub use database::DatabaseConfig;
pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use quota::{QuotaBackend, QuotaConfig};
pub use redis::RedisConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// in-memory setup. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Card engine tunables
    #[serde(default)]
    pub engine: EngineConfig,

    /// Free generation allowance
    #[serde(default)]
    pub quota: QuotaConfig,

    /// PostgreSQL connection; cards stay in memory when absent
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Redis connection, used by the redis quota backend
    #[serde(default)]
    pub redis: Option<RedisConfig>,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `GOAL_BINGO` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `GOAL_BINGO__QUOTA__FREE_GENERATIONS=5` -> `quota.free_generations = 5`
    /// - `GOAL_BINGO__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GOAL_BINGO")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid, or
    /// if the chosen quota backend has no connection configured.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        self.quota.validate()?;
        self.logging.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }

        match self.quota.backend {
            QuotaBackend::Postgres if self.database.is_none() => {
                Err(ValidationError::BackendNotConfigured("postgres"))
            }
            QuotaBackend::Redis if self.redis.is_none() => {
                Err(ValidationError::BackendNotConfigured("redis"))
            }
            _ => Ok(()),
        }
    }
}
