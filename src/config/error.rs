//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Minimum card year {0} is outside 2000..=2100")]
    InvalidMinYear(i32),

    #[error("Conflict retry limit must be between 1 and 50")]
    InvalidRetryLimit,

    #[error("Free generation allowance must be at most 1000")]
    FreeGenerationsTooLarge,

    #[error("Quota backend '{0}' selected but its connection is not configured")]
    BackendNotConfigured(&'static str),

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}
