//! Card repository port.
//!
//! Defines the contract for persisting and retrieving Card aggregates,
//! including their items. A card and its items are always written and read
//! as one unit.

use crate::domain::card::{Card, CardVersion};
use crate::domain::foundation::{CardId, DomainError, UserId};
use async_trait::async_trait;

/// Repository port for Card aggregate persistence.
///
/// Implementations must ensure:
/// - `save` and `update` write the header and all items atomically
/// - `update` applies only when the stored version equals `expected_version`
/// - a second card with the same (owner, year, case-folded title) is rejected
#[async_trait]
pub trait CardRepository: Send + Sync {
    /// Save a new card with its items.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the (owner, year, title) slot is taken
    /// - `DatabaseError` on persistence failure
    async fn save(&self, card: &Card) -> Result<(), DomainError>;

    /// Replace a stored card if it is still at `expected_version`.
    ///
    /// # Errors
    ///
    /// - `CardNotFound` if the card doesn't exist
    /// - `ConcurrencyConflict` if the stored version differs
    /// - `Conflict` if a title change collides with another card
    /// - `DatabaseError` on persistence failure
    async fn update(&self, card: &Card, expected_version: CardVersion) -> Result<(), DomainError>;

    /// Find a card by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &CardId) -> Result<Option<Card>, DomainError>;

    /// All cards owned by a user, newest year first, then by creation time.
    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Vec<Card>, DomainError>;

    /// All cards a user owns for one year.
    async fn find_by_owner_and_year(
        &self,
        owner_id: &UserId,
        year: i32,
    ) -> Result<Vec<Card>, DomainError>;

    /// Delete a card and its items.
    ///
    /// # Errors
    ///
    /// - `CardNotFound` if the card doesn't exist
    async fn delete(&self, id: &CardId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn CardRepository) {}
}
