//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `CardRepository` - Card aggregate storage with optimistic versioning
//! - `QuotaStore` - Atomic per-user usage counters
//!
//! ## Runtime Ports
//!
//! - `RngSource` - Fresh random generators for shuffling

mod card_repository;
mod quota_store;
mod rng_source;

pub use card_repository::CardRepository;
pub use quota_store::{ConsumeOutcome, QuotaStore, QuotaStoreError};
pub use rng_source::RngSource;
