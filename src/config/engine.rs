//! Card engine configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Tunables for card operations.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Earliest year a card may be created for
    #[serde(default = "default_min_year")]
    pub min_year: i32,

    /// How many conflicts without progress a mutation tolerates before failing
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,

    /// Fixed seed for shuffling; entropy is used when unset
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

impl EngineConfig {
    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(2000..=2100).contains(&self.min_year) {
            return Err(ValidationError::InvalidMinYear(self.min_year));
        }
        if self.max_conflict_retries == 0 || self.max_conflict_retries > 50 {
            return Err(ValidationError::InvalidRetryLimit);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_year: default_min_year(),
            max_conflict_retries: default_max_conflict_retries(),
            shuffle_seed: None,
        }
    }
}

fn default_min_year() -> i32 {
    2020
}

fn default_max_conflict_retries() -> u32 {
    5
}
