//! In-memory adapters for tests and single-node deployments.

mod card_repository;
mod quota_store;

pub use card_repository::InMemoryCardRepository;
pub use quota_store::InMemoryQuotaStore;
