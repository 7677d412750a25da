//! PostgreSQL implementation of QuotaStore.
//!
//! Each operation is one statement, so the row lock Postgres takes for the
//! conditional UPDATE is the only synchronization needed.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::UserId;
use crate::ports::{ConsumeOutcome, QuotaStore, QuotaStoreError};

/// PostgreSQL implementation of the QuotaStore port.
#[derive(Clone)]
pub struct PostgresQuotaStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresQuotaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresQuotaStore")
            .field("pool", &"PgPool")
            .finish()
    }
}

impl PostgresQuotaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unavailable(context: &str, err: sqlx::Error) -> QuotaStoreError {
    QuotaStoreError::Unavailable(format!("{}: {}", context, err))
}

fn to_count(raw: i32) -> Result<u32, QuotaStoreError> {
    u32::try_from(raw).map_err(|_| QuotaStoreError::Corrupt(format!("negative count {}", raw)))
}

#[async_trait]
impl QuotaStore for PostgresQuotaStore {
    async fn try_consume(
        &self,
        user_id: &UserId,
        ceiling: u32,
    ) -> Result<ConsumeOutcome, QuotaStoreError> {
        let ceiling = i32::try_from(ceiling).unwrap_or(i32::MAX);

        // Insert-or-increment, guarded so the increment only applies below
        // the ceiling. No row comes back when the user is exhausted.
        let consumed = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO generation_quotas (user_id, count, ceiling, updated_at)
            SELECT $1, 1, $2, NOW()
            WHERE $2 > 0
            ON CONFLICT (user_id) DO UPDATE
                SET count = generation_quotas.count + 1,
                    ceiling = EXCLUDED.ceiling,
                    updated_at = NOW()
                WHERE generation_quotas.count < EXCLUDED.ceiling
            RETURNING count
            "#,
        )
        .bind(user_id.as_str())
        .bind(ceiling)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unavailable("Failed to consume quota", e))?;

        match consumed {
            Some(count) => Ok(ConsumeOutcome::Consumed {
                count: to_count(count)?,
            }),
            None => Ok(ConsumeOutcome::Exhausted {
                count: self.current(user_id).await?,
            }),
        }
    }

    async fn refund(&self, user_id: &UserId) -> Result<bool, QuotaStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE generation_quotas
            SET count = count - 1, updated_at = NOW()
            WHERE user_id = $1 AND count > 0
            "#,
        )
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| unavailable("Failed to refund quota", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn current(&self, user_id: &UserId) -> Result<u32, QuotaStoreError> {
        let count = sqlx::query_scalar::<_, i32>(
            "SELECT count FROM generation_quotas WHERE user_id = $1",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unavailable("Failed to read quota", e))?;

        count.map(to_count).transpose().map(|c| c.unwrap_or(0))
    }
}
