//! In-memory quota store.
//!
//! One `AtomicU32` per user. The map lock is only held to find or create a
//! user's counter; the counter itself changes through compare-and-swap, so
//! users never contend with each other.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::domain::quota::{next_consumed, next_refunded};
use crate::ports::{ConsumeOutcome, QuotaStore, QuotaStoreError};

/// In-memory implementation of the QuotaStore port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuotaStore {
    counters: Arc<RwLock<HashMap<UserId, Arc<AtomicU32>>>>,
}

impl InMemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn counter(&self, user_id: &UserId) -> Arc<AtomicU32> {
        if let Some(counter) = self.counters.read().await.get(user_id) {
            return Arc::clone(counter);
        }
        let mut counters = self.counters.write().await;
        Arc::clone(counters.entry(user_id.clone()).or_default())
    }
}

#[async_trait]
impl QuotaStore for InMemoryQuotaStore {
    async fn try_consume(
        &self,
        user_id: &UserId,
        ceiling: u32,
    ) -> Result<ConsumeOutcome, QuotaStoreError> {
        let counter = self.counter(user_id).await;
        let outcome = match counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
            next_consumed(count, ceiling).ok()
        }) {
            Ok(previous) => ConsumeOutcome::Consumed {
                count: previous + 1,
            },
            Err(current) => ConsumeOutcome::Exhausted { count: current },
        };
        Ok(outcome)
    }

    async fn refund(&self, user_id: &UserId) -> Result<bool, QuotaStoreError> {
        let counter = self.counter(user_id).await;
        Ok(counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, next_refunded)
            .is_ok())
    }

    async fn current(&self, user_id: &UserId) -> Result<u32, QuotaStoreError> {
        Ok(self
            .counters
            .read()
            .await
            .get(user_id)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0))
    }
}
