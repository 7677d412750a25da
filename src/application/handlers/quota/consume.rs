//! Consume and refund handlers for the free-generation quota.

use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::foundation::UserId;
use crate::domain::quota::{QuotaCounter, QuotaError};
use crate::ports::{ConsumeOutcome, QuotaStore};

/// Takes one generation unit, returning how many remain.
pub struct ConsumeQuotaHandler {
    store: Arc<dyn QuotaStore>,
    ceiling: u32,
}

impl ConsumeQuotaHandler {
    pub fn new(store: Arc<dyn QuotaStore>, ceiling: u32) -> Self {
        Self { store, ceiling }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<u32, QuotaError> {
        match self.store.try_consume(user_id, self.ceiling).await? {
            ConsumeOutcome::Consumed { count } => {
                let remaining = self.ceiling.saturating_sub(count);
                debug!(user_id = %user_id, remaining, "Generation quota consumed");
                Ok(remaining)
            }
            ConsumeOutcome::Exhausted { count } => {
                info!(user_id = %user_id, count, "Generation quota exhausted");
                Err(QuotaError::Exhausted {
                    ceiling: self.ceiling,
                })
            }
        }
    }
}

/// Gives back one unit. Returns false when there was nothing to refund.
pub struct RefundQuotaHandler {
    store: Arc<dyn QuotaStore>,
}

impl RefundQuotaHandler {
    pub fn new(store: Arc<dyn QuotaStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<bool, QuotaError> {
        let refunded = self.store.refund(user_id).await?;
        debug!(user_id = %user_id, refunded, "Generation quota refund");
        Ok(refunded)
    }
}

/// Reads a user's current usage.
pub struct GetQuotaHandler {
    store: Arc<dyn QuotaStore>,
    ceiling: u32,
}

impl GetQuotaHandler {
    pub fn new(store: Arc<dyn QuotaStore>, ceiling: u32) -> Self {
        Self { store, ceiling }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<QuotaCounter, QuotaError> {
        let count = self.store.current(user_id).await?;
        Ok(QuotaCounter::reconstitute(
            user_id.clone(),
            count.min(self.ceiling),
            self.ceiling,
        ))
    }
}
