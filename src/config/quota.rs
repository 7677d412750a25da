//! Quota configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::quota::DEFAULT_FREE_GENERATIONS;

/// Where quota counters are kept.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuotaBackend {
    #[default]
    Memory,
    Postgres,
    Redis,
}

/// Free generation allowance settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct QuotaConfig {
    /// Generations each user gets before being refused
    #[serde(default = "default_free_generations")]
    pub free_generations: u32,

    /// Storage backend for counters
    #[serde(default)]
    pub backend: QuotaBackend,
}

impl QuotaConfig {
    /// Validate quota configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.free_generations > 1000 {
            return Err(ValidationError::FreeGenerationsTooLarge);
        }
        Ok(())
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            free_generations: default_free_generations(),
            backend: QuotaBackend::default(),
        }
    }
}

fn default_free_generations() -> u32 {
    DEFAULT_FREE_GENERATIONS
}
