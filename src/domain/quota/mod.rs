//! Quota module - per-user free generation allowance.
//!
//! Holds the counter rules and the classification of downstream failures.
//! Atomicity lives in the `QuotaStore` adapters.

mod counter;
mod errors;

pub use counter::{next_consumed, next_refunded, QuotaCounter, DEFAULT_FREE_GENERATIONS};
pub use errors::{GenerationFailure, MeteredError, QuotaError};
