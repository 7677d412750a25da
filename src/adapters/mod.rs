//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - In-memory card repository and quota store
//! - `postgres` - sqlx-backed card repository and quota store
//! - `redis` - INCR/DECR quota store
//! - `rng` - Entropy and seeded random generator sources

pub mod memory;
pub mod postgres;
pub mod redis;
pub mod rng;

pub use memory::{InMemoryCardRepository, InMemoryQuotaStore};
pub use postgres::{PostgresCardRepository, PostgresQuotaStore};
pub use redis::RedisQuotaStore;
pub use rng::{EntropyRngSource, SeededRngSource};
