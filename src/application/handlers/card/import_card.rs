//! ImportCardHandler - creates a complete card in a single write.
//!
//! The card is assembled and validated in memory first; nothing is stored
//! unless every item fits and no card blocks the (owner, year, title) slot.

use std::sync::Arc;
use tracing::info;

use crate::domain::card::{
    validate_year, Card, CardCategory, CardError, GridConfig, GridSize, Position,
    DEFAULT_GRID_SIZE,
};
use crate::domain::foundation::{CardId, OwnedByUser, Timestamp, UserId};
use crate::ports::CardRepository;

use super::uniqueness::{find_conflict, is_collision};

/// One goal to import. Items without a position fill the lowest free slots
/// after all positioned items are placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportItem {
    pub content: String,
    pub position: Option<Position>,
}

impl ImportItem {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            position: None,
        }
    }

    pub fn at(content: impl Into<String>, position: Position) -> Self {
        Self {
            content: content.into(),
            position: Some(position),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportCardCommand {
    pub owner_id: UserId,
    pub year: i32,
    pub title: Option<String>,
    pub category: Option<String>,
    pub grid_size: Option<u8>,
    pub has_free_space: Option<bool>,
    pub header_text: Option<String>,
    pub items: Vec<ImportItem>,
    /// Finalize after placing items; requires a full grid.
    pub finalize: bool,
    pub visible_to_friends: Option<bool>,
}

pub struct ImportCardHandler {
    repository: Arc<dyn CardRepository>,
    min_year: i32,
}

impl ImportCardHandler {
    pub fn new(repository: Arc<dyn CardRepository>, min_year: i32) -> Self {
        Self {
            repository,
            min_year,
        }
    }

    pub async fn handle(&self, cmd: ImportCardCommand) -> Result<Card, CardError> {
        validate_year(cmd.year, self.min_year, Timestamp::current_year())?;
        let category = CardCategory::parse_optional(cmd.category.as_deref())?;
        let size = GridSize::new(cmd.grid_size.unwrap_or(DEFAULT_GRID_SIZE))?;
        let grid = GridConfig::new(size, cmd.has_free_space.unwrap_or(true), cmd.header_text)?;

        let mut card = Card::new(CardId::new(), cmd.owner_id, cmd.year, cmd.title, category, grid)?;

        let (placed, floating): (Vec<_>, Vec<_>) =
            cmd.items.iter().partition(|item| item.position.is_some());
        for item in placed.into_iter().chain(floating) {
            card.add_item(&item.content, item.position)?;
        }

        if cmd.finalize {
            card.finalize(cmd.visible_to_friends)?;
        } else if let Some(visible) = cmd.visible_to_friends {
            card.set_visibility(visible);
        }

        if let Some(existing) = self.blocking_card(&card).await? {
            return Err(CardError::CardExists(existing.summary()));
        }

        if let Err(err) = self.repository.save(&card).await {
            if is_collision(&err) {
                if let Some(existing) = self.blocking_card(&card).await? {
                    return Err(CardError::CardExists(existing.summary()));
                }
            }
            return Err(err.into());
        }

        info!(
            card_id = %card.id(),
            items = card.item_count(),
            finalized = card.is_finalized(),
            "Card imported"
        );
        Ok(card)
    }

    async fn blocking_card(&self, card: &Card) -> Result<Option<Card>, CardError> {
        find_conflict(
            self.repository.as_ref(),
            card.owner_id(),
            card.year(),
            card.title(),
            None,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCardRepository;
    use crate::domain::foundation::CardStatus;

    fn owner() -> UserId {
        UserId::new("owner-1").unwrap()
    }

    fn cmd(items: Vec<ImportItem>, finalize: bool) -> ImportCardCommand {
        ImportCardCommand {
            owner_id: owner(),
            year: Timestamp::current_year(),
            title: None,
            category: Some("travel".to_string()),
            grid_size: Some(3),
            has_free_space: Some(true),
            header_text: None,
            items,
            finalize,
            visible_to_friends: Some(true),
        }
    }

    fn eight_items() -> Vec<ImportItem> {
        (0..8).map(|i| ImportItem::new(format!("trip {i}"))).collect()
    }

    #[tokio::test]
    async fn imports_and_finalizes() {
        let repo = Arc::new(InMemoryCardRepository::new());
        let handler = ImportCardHandler::new(repo.clone(), 2020);

        let card = handler.handle(cmd(eight_items(), true)).await.unwrap();
        assert_eq!(card.status(), CardStatus::Finalized);
        assert!(card.visible_to_friends());
        assert!(repo.find_by_id(card.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn positioned_items_are_placed_first() {
        let repo = Arc::new(InMemoryCardRepository::new());
        let handler = ImportCardHandler::new(repo, 2020);
        let items = vec![ImportItem::new("floating"), ImportItem::at("pinned", 0)];

        let card = handler.handle(cmd(items, false)).await.unwrap();
        assert_eq!(card.item_at(0).unwrap().content(), "pinned");
        assert_eq!(card.item_at(1).unwrap().content(), "floating");
    }

    #[tokio::test]
    async fn conflict_returns_existing_summary_without_writing() {
        let repo = Arc::new(InMemoryCardRepository::new());
        let handler = ImportCardHandler::new(repo.clone(), 2020);
        let existing = handler.handle(cmd(eight_items(), true)).await.unwrap();

        let result = handler.handle(cmd(eight_items(), false)).await;
        match result {
            Err(CardError::CardExists(summary)) => {
                assert_eq!(summary.id, *existing.id());
                assert_eq!(summary.item_count, 8);
                assert!(summary.is_finalized);
            }
            other => panic!("expected CardExists, got {other:?}"),
        }
        assert_eq!(repo.find_by_owner(&owner()).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_untitled_imports_store_one_card() {
        let repo = Arc::new(InMemoryCardRepository::new());
        let handler = Arc::new(ImportCardHandler::new(repo.clone(), 2020));

        let tasks = (0..8).map(|_| {
            let handler = handler.clone();
            tokio::spawn(async move { handler.handle(cmd(eight_items(), false)).await })
        });
        let results: Vec<_> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, CardError::CardExists(_))));
        assert_eq!(repo.find_by_owner(&owner()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn finalize_with_too_few_items_stores_nothing() {
        let repo = Arc::new(InMemoryCardRepository::new());
        let handler = ImportCardHandler::new(repo.clone(), 2020);

        let result = handler.handle(cmd(vec![ImportItem::new("only one")], true)).await;
        assert!(matches!(result, Err(CardError::IncompleteGrid { .. })));
        assert!(repo.find_by_owner(&owner()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn too_many_items_fail_card_full() {
        let repo = Arc::new(InMemoryCardRepository::new());
        let handler = ImportCardHandler::new(repo, 2020);
        let mut items = eight_items();
        items.push(ImportItem::new("one too many"));

        let result = handler.handle(cmd(items, false)).await;
        assert_eq!(result.unwrap_err(), CardError::CardFull { usable_slots: 8 });
    }
}
