//! Redis adapters.

mod quota_store;

pub use quota_store::RedisQuotaStore;
