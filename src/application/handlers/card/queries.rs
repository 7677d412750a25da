//! Read-side card queries.

use std::sync::Arc;

use crate::domain::card::{Card, CardError, CardStats};
use crate::domain::foundation::{CardId, UserId};
use crate::ports::CardRepository;

/// Loads a card the viewer may see: their own, or a friend-visible
/// finalized card.
pub struct GetCardHandler {
    repository: Arc<dyn CardRepository>,
}

impl GetCardHandler {
    pub fn new(repository: Arc<dyn CardRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, card_id: &CardId, viewer: &UserId) -> Result<Card, CardError> {
        let card = self
            .repository
            .find_by_id(card_id)
            .await?
            .ok_or_else(|| CardError::not_found(*card_id))?;

        if !card.can_view(viewer) {
            return Err(CardError::Forbidden);
        }
        Ok(card)
    }
}

/// Lists an owner's cards, newest year first.
pub struct ListCardsHandler {
    repository: Arc<dyn CardRepository>,
}

impl ListCardsHandler {
    pub fn new(repository: Arc<dyn CardRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, owner_id: &UserId) -> Result<Vec<Card>, CardError> {
        Ok(self.repository.find_by_owner(owner_id).await?)
    }
}

pub struct GetStatsHandler {
    cards: GetCardHandler,
}

impl GetStatsHandler {
    pub fn new(repository: Arc<dyn CardRepository>) -> Self {
        Self {
            cards: GetCardHandler::new(repository),
        }
    }

    pub async fn handle(&self, card_id: &CardId, viewer: &UserId) -> Result<CardStats, CardError> {
        Ok(self.cards.handle(card_id, viewer).await?.stats())
    }
}
