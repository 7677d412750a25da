//! Quota-metered generation.
//!
//! Wraps a call to an external generator: one unit is consumed up front and
//! given back if the generator fails for a reason the user did not cause.

use std::future::Future;
use std::sync::Arc;
use tracing::warn;

use crate::domain::foundation::UserId;
use crate::domain::quota::{GenerationFailure, MeteredError};
use crate::ports::QuotaStore;

use super::consume::{ConsumeQuotaHandler, RefundQuotaHandler};

pub struct MeteredGeneration {
    consume: ConsumeQuotaHandler,
    refund: RefundQuotaHandler,
}

impl MeteredGeneration {
    pub fn new(store: Arc<dyn QuotaStore>, ceiling: u32) -> Self {
        Self {
            consume: ConsumeQuotaHandler::new(store.clone(), ceiling),
            refund: RefundQuotaHandler::new(store),
        }
    }

    /// Consumes a unit, runs `generate`, refunds on a refundable failure.
    ///
    /// A failed refund is logged and reported as `refunded: false`; it never
    /// replaces the generation failure.
    pub async fn run<T, F, Fut>(&self, user_id: &UserId, generate: F) -> Result<T, MeteredError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, GenerationFailure>>,
    {
        self.consume.handle(user_id).await?;

        let failure = match generate().await {
            Ok(output) => return Ok(output),
            Err(failure) => failure,
        };

        let refunded = if failure.is_refundable() {
            match self.refund.handle(user_id).await {
                Ok(refunded) => refunded,
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "Quota refund failed");
                    false
                }
            }
        } else {
            false
        };

        Err(MeteredError::Generation { failure, refunded })
    }
}
