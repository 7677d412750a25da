//! FinalizeCardHandler - locks a full draft card's layout.

use tracing::info;

use crate::domain::card::{Card, CardError};
use crate::domain::foundation::{CardId, UserId};

use super::card_writer::CardWriter;

#[derive(Debug, Clone)]
pub struct FinalizeCardCommand {
    pub card_id: CardId,
    pub user_id: UserId,
    pub visible_to_friends: Option<bool>,
}

/// Draft to Finalized. Requires every usable slot to hold an item.
pub struct FinalizeCardHandler {
    writer: CardWriter,
}

impl FinalizeCardHandler {
    pub fn new(writer: CardWriter) -> Self {
        Self { writer }
    }

    pub async fn handle(&self, cmd: FinalizeCardCommand) -> Result<Card, CardError> {
        let (card, ()) = self
            .writer
            .apply(&cmd.card_id, &cmd.user_id, |card| {
                card.finalize(cmd.visible_to_friends)
            })
            .await?;

        info!(
            card_id = %cmd.card_id,
            user_id = %cmd.user_id,
            visible_to_friends = card.visible_to_friends(),
            "Card finalized"
        );
        Ok(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCardRepository;
    use crate::domain::card::{GridConfig, GridSize};
    use crate::domain::foundation::CardStatus;
    use crate::ports::CardRepository;
    use std::sync::Arc;

    fn owner() -> UserId {
        UserId::new("owner-1").unwrap()
    }

    async fn setup(fill: usize) -> (CardWriter, CardId) {
        let repo = Arc::new(InMemoryCardRepository::new());
        let grid = GridConfig::new(GridSize::new(3).unwrap(), true, None).unwrap();
        let mut card = Card::new(CardId::new(), owner(), 2025, None, None, grid).unwrap();
        for i in 0..fill {
            card.add_item(&format!("goal {i}"), None).unwrap();
        }
        repo.save(&card).await.unwrap();
        (CardWriter::new(repo, 3), *card.id())
    }

    fn cmd(card_id: CardId) -> FinalizeCardCommand {
        FinalizeCardCommand {
            card_id,
            user_id: owner(),
            visible_to_friends: Some(true),
        }
    }

    #[tokio::test]
    async fn finalizes_full_card() {
        let (writer, card_id) = setup(8).await;
        let card = FinalizeCardHandler::new(writer).handle(cmd(card_id)).await.unwrap();
        assert_eq!(card.status(), CardStatus::Finalized);
        assert!(card.visible_to_friends());
    }

    #[tokio::test]
    async fn incomplete_card_reports_missing_positions() {
        let (writer, card_id) = setup(6).await;
        let result = FinalizeCardHandler::new(writer).handle(cmd(card_id)).await;
        assert_eq!(
            result.unwrap_err(),
            CardError::IncompleteGrid {
                missing_positions: vec![7, 8]
            }
        );
    }

    #[tokio::test]
    async fn finalizing_twice_fails() {
        let (writer, card_id) = setup(8).await;
        let handler = FinalizeCardHandler::new(writer);
        handler.handle(cmd(card_id)).await.unwrap();
        assert_eq!(
            handler.handle(cmd(card_id)).await.unwrap_err(),
            CardError::CardFinalized
        );
    }
}
