//! Quota store port for per-user usage counters.
//!
//! Each operation must be a single atomic primitive at the storage layer so
//! concurrent consumers can never push a counter past its ceiling.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::UserId;
use crate::domain::quota::QuotaError;

/// Port for quota counter storage.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    /// Increment the user's count if it is below `ceiling`.
    ///
    /// Returns `Exhausted` (counter untouched) when already at the ceiling.
    async fn try_consume(
        &self,
        user_id: &UserId,
        ceiling: u32,
    ) -> Result<ConsumeOutcome, QuotaStoreError>;

    /// Decrement the user's count, never below zero.
    ///
    /// Returns true if a unit was given back.
    async fn refund(&self, user_id: &UserId) -> Result<bool, QuotaStoreError>;

    /// Current count for the user (zero if never seen).
    async fn current(&self, user_id: &UserId) -> Result<u32, QuotaStoreError>;
}

/// Result of an atomic consume attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// A unit was taken; `count` is the new value.
    Consumed { count: u32 },
    /// The counter was already at the ceiling.
    Exhausted { count: u32 },
}

/// Errors from quota storage backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuotaStoreError {
    #[error("quota store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt quota record: {0}")]
    Corrupt(String),
}

impl From<QuotaStoreError> for QuotaError {
    fn from(err: QuotaStoreError) -> Self {
        QuotaError::Storage(err.to_string())
    }
}
