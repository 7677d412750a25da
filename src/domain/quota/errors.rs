//! Quota-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors from consuming or refunding quota.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuotaError {
    #[error("Free generation quota exhausted ({ceiling} used)")]
    Exhausted { ceiling: u32 },

    #[error("Quota storage error: {0}")]
    Storage(String),
}

impl QuotaError {
    pub fn storage(message: impl Into<String>) -> Self {
        QuotaError::Storage(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            QuotaError::Exhausted { .. } => ErrorCode::QuotaExhausted,
            QuotaError::Storage(_) => ErrorCode::CacheError,
        }
    }
}

impl From<QuotaError> for DomainError {
    fn from(err: QuotaError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

/// Why a metered generation failed downstream of the quota check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationFailure {
    #[error("Generation provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Generation provider is not configured")]
    NotConfigured,

    #[error("Generation provider rate limited the request")]
    RateLimited,

    #[error("Invalid generation input: {0}")]
    InvalidInput(String),
}

impl GenerationFailure {
    /// Failures the user did not cause get their unit back.
    pub fn is_refundable(&self) -> bool {
        match self {
            GenerationFailure::ProviderUnavailable(_)
            | GenerationFailure::NotConfigured
            | GenerationFailure::RateLimited => true,
            GenerationFailure::InvalidInput(_) => false,
        }
    }
}

/// Error from a metered generation run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeteredError {
    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error("{failure}")]
    Generation {
        failure: GenerationFailure,
        /// True if the consumed unit was given back.
        refunded: bool,
    },
}
