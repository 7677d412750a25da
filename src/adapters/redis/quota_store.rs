//! Redis-backed quota store for multi-server deployments.
//!
//! INCR is atomic, so every caller sees a distinct post-increment value.
//! A caller whose value overshoots the ceiling gives its unit straight back
//! with DECR; only callers that saw a value within the ceiling keep theirs.
//! Refunds mirror this: DECR, and INCR back if the count went negative.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::UserId;
use crate::ports::{ConsumeOutcome, QuotaStore, QuotaStoreError};

const KEY_PREFIX: &str = "quota:generations";

/// Redis implementation of the QuotaStore port.
#[derive(Clone)]
pub struct RedisQuotaStore {
    conn: MultiplexedConnection,
}

impl RedisQuotaStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

fn quota_key(user_id: &UserId) -> String {
    format!("{}:{}", KEY_PREFIX, user_id)
}

fn unavailable(err: redis::RedisError) -> QuotaStoreError {
    QuotaStoreError::Unavailable(err.to_string())
}

fn to_count(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}

#[async_trait]
impl QuotaStore for RedisQuotaStore {
    async fn try_consume(
        &self,
        user_id: &UserId,
        ceiling: u32,
    ) -> Result<ConsumeOutcome, QuotaStoreError> {
        let key = quota_key(user_id);
        let mut conn = self.conn.clone();

        let count: i64 = conn.incr(&key, 1_i64).await.map_err(unavailable)?;
        if count <= i64::from(ceiling) {
            return Ok(ConsumeOutcome::Consumed {
                count: to_count(count),
            });
        }

        let restored: i64 = conn.decr(&key, 1_i64).await.map_err(unavailable)?;
        Ok(ConsumeOutcome::Exhausted {
            count: to_count(restored),
        })
    }

    async fn refund(&self, user_id: &UserId) -> Result<bool, QuotaStoreError> {
        let key = quota_key(user_id);
        let mut conn = self.conn.clone();

        let count: i64 = conn.decr(&key, 1_i64).await.map_err(unavailable)?;
        if count >= 0 {
            return Ok(true);
        }

        conn.incr::<_, _, i64>(&key, 1_i64)
            .await
            .map_err(unavailable)?;
        Ok(false)
    }

    async fn current(&self, user_id: &UserId) -> Result<u32, QuotaStoreError> {
        let mut conn = self.conn.clone();
        let count: Option<i64> = conn.get(quota_key(user_id)).await.map_err(unavailable)?;
        Ok(count.map(to_count).unwrap_or(0))
    }
}

impl std::fmt::Debug for RedisQuotaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisQuotaStore").finish_non_exhaustive()
    }
}
