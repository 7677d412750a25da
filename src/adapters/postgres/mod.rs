//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresCardRepository` - Card header and item rows, versioned updates
//! - `PostgresQuotaStore` - Conditional-update usage counters
//!
//! Schema lives in `migrations/` and is applied with `sqlx::migrate!`.

mod card_repository;
mod quota_store;

pub use card_repository::PostgresCardRepository;
pub use quota_store::PostgresQuotaStore;
