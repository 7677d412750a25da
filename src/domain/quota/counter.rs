//! QuotaCounter value object.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

use super::QuotaError;

/// Default number of free generations per user.
pub const DEFAULT_FREE_GENERATIONS: u32 = 5;

/// Snapshot of one user's usage against their ceiling.
///
/// # Invariants
///
/// - `0 <= count <= ceiling` for counters produced by `consume`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaCounter {
    user_id: UserId,
    count: u32,
    ceiling: u32,
}

impl QuotaCounter {
    /// Fresh counter with nothing consumed.
    pub fn new(user_id: UserId, ceiling: u32) -> Self {
        Self {
            user_id,
            count: 0,
            ceiling,
        }
    }

    /// Rebuilds a counter from stored values.
    pub fn reconstitute(user_id: UserId, count: u32, ceiling: u32) -> Self {
        Self {
            user_id,
            count,
            ceiling,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Units left before the ceiling.
    pub fn remaining(&self) -> u32 {
        self.ceiling.saturating_sub(self.count)
    }

    pub fn is_exhausted(&self) -> bool {
        self.count >= self.ceiling
    }

    /// Uses one unit. Fails without changing the count at the ceiling.
    pub fn consume(&mut self) -> Result<u32, QuotaError> {
        self.count = next_consumed(self.count, self.ceiling)?;
        Ok(self.remaining())
    }

    /// Returns one unit. No-op at zero; reports whether anything changed.
    pub fn refund(&mut self) -> bool {
        match next_refunded(self.count) {
            Some(next) => {
                self.count = next;
                true
            }
            None => false,
        }
    }
}

/// Count after one consume, or `Exhausted` at the ceiling.
///
/// Storage adapters use this inside their own atomic primitives.
pub fn next_consumed(count: u32, ceiling: u32) -> Result<u32, QuotaError> {
    if count >= ceiling {
        Err(QuotaError::Exhausted { ceiling })
    } else {
        Ok(count + 1)
    }
}

/// Count after one refund, or `None` if already zero.
pub fn next_refunded(count: u32) -> Option<u32> {
    count.checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[test]
    fn consume_until_ceiling() {
        let mut counter = QuotaCounter::new(user(), 3);
        assert_eq!(counter.consume().unwrap(), 2);
        assert_eq!(counter.consume().unwrap(), 1);
        assert_eq!(counter.consume().unwrap(), 0);
        assert!(counter.is_exhausted());

        assert_eq!(counter.consume(), Err(QuotaError::Exhausted { ceiling: 3 }));
        assert_eq!(counter.count(), 3);
    }

    #[test]
    fn refund_restores_one_unit_and_floors_at_zero() {
        let mut counter = QuotaCounter::new(user(), 2);
        counter.consume().unwrap();
        assert!(counter.refund());
        assert_eq!(counter.count(), 0);
        assert!(!counter.refund());
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn zero_ceiling_is_always_exhausted() {
        let mut counter = QuotaCounter::new(user(), 0);
        assert!(counter.is_exhausted());
        assert!(counter.consume().is_err());
    }

    #[test]
    fn remaining_saturates_when_ceiling_lowered() {
        let counter = QuotaCounter::reconstitute(user(), 7, 5);
        assert_eq!(counter.remaining(), 0);
    }
}
