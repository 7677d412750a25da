//! In-memory card repository.
//!
//! Stores whole Card aggregates behind a tokio `RwLock`. Every write takes
//! the write lock, so the version check and the replacement happen as one
//! step and concurrent writers serialize exactly like rows under
//! `UPDATE ... WHERE version = $n`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::card::{titles_match, Card, CardVersion};
use crate::domain::foundation::{CardId, DomainError, ErrorCode, OwnedByUser, UserId};
use crate::ports::CardRepository;

/// In-memory implementation of the CardRepository port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCardRepository {
    cards: Arc<RwLock<HashMap<CardId, Card>>>,
}

impl InMemoryCardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cards.
    pub async fn len(&self) -> usize {
        self.cards.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cards.read().await.is_empty()
    }
}

/// Rejects `card` if another card of the same owner and year has the same title.
fn check_title_unique(cards: &HashMap<CardId, Card>, card: &Card) -> Result<(), DomainError> {
    let Some(title) = card.title() else {
        return Ok(());
    };
    let clash = cards.values().any(|other| {
        other.id() != card.id()
            && other.owner_id() == card.owner_id()
            && other.year() == card.year()
            && other.title().is_some_and(|t| titles_match(t, title))
    });
    if clash {
        return Err(DomainError::new(
            ErrorCode::Conflict,
            format!("A card titled '{}' already exists for {}", title, card.year()),
        ));
    }
    Ok(())
}

/// Rejects a new untitled `card` if the owner already has any card that year.
fn check_untitled_slot(cards: &HashMap<CardId, Card>, card: &Card) -> Result<(), DomainError> {
    if card.title().is_some() {
        return Ok(());
    }
    let taken = cards
        .values()
        .any(|other| other.owner_id() == card.owner_id() && other.year() == card.year());
    if taken {
        return Err(DomainError::new(
            ErrorCode::Conflict,
            format!("A card already exists for {}", card.year()),
        ));
    }
    Ok(())
}

#[async_trait]
impl CardRepository for InMemoryCardRepository {
    async fn save(&self, card: &Card) -> Result<(), DomainError> {
        let mut cards = self.cards.write().await;
        if cards.contains_key(card.id()) {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("Card {} already exists", card.id()),
            ));
        }
        check_untitled_slot(&cards, card)?;
        check_title_unique(&cards, card)?;
        cards.insert(*card.id(), card.clone());
        Ok(())
    }

    async fn update(&self, card: &Card, expected_version: CardVersion) -> Result<(), DomainError> {
        let mut cards = self.cards.write().await;
        let stored = cards.get(card.id()).ok_or_else(|| {
            DomainError::new(ErrorCode::CardNotFound, format!("Card not found: {}", card.id()))
        })?;
        if stored.version() != expected_version {
            return Err(DomainError::new(
                ErrorCode::ConcurrencyConflict,
                format!(
                    "Card {} is at version {}, expected {}",
                    card.id(),
                    stored.version().as_u32(),
                    expected_version.as_u32()
                ),
            ));
        }
        check_title_unique(&cards, card)?;
        cards.insert(*card.id(), card.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CardId) -> Result<Option<Card>, DomainError> {
        Ok(self.cards.read().await.get(id).cloned())
    }

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Vec<Card>, DomainError> {
        let cards = self.cards.read().await;
        let mut owned: Vec<Card> = cards
            .values()
            .filter(|c| c.owner_id() == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            b.year()
                .cmp(&a.year())
                .then_with(|| a.created_at().as_datetime().cmp(b.created_at().as_datetime()))
        });
        Ok(owned)
    }

    async fn find_by_owner_and_year(
        &self,
        owner_id: &UserId,
        year: i32,
    ) -> Result<Vec<Card>, DomainError> {
        let cards = self.cards.read().await;
        Ok(cards
            .values()
            .filter(|c| c.owner_id() == owner_id && c.year() == year)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &CardId) -> Result<(), DomainError> {
        match self.cards.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(DomainError::new(
                ErrorCode::CardNotFound,
                format!("Card not found: {}", id),
            )),
        }
    }
}
