//! CloneCardHandler - copies an owned card's goals into a new draft.

use std::sync::Arc;
use tracing::info;

use crate::domain::card::{validate_year, Card, CardCategory, CardError, GridConfig, GridSize};
use crate::domain::foundation::{CardId, Timestamp, UserId};
use crate::ports::CardRepository;

use super::card_writer::CardWriter;
use super::uniqueness::{ensure_available, save_new};

/// Grid settings left as `None` are inherited from the source card.
#[derive(Debug, Clone)]
pub struct CloneCardCommand {
    pub source_card_id: CardId,
    pub user_id: UserId,
    pub year: i32,
    pub title: Option<String>,
    pub category: Option<String>,
    pub grid_size: Option<u8>,
    pub has_free_space: Option<bool>,
    pub header_text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CloneCardResult {
    pub card: Card,
    /// Source items that did not fit on the new grid.
    pub truncated_item_count: usize,
}

pub struct CloneCardHandler {
    writer: CardWriter,
    min_year: i32,
}

impl CloneCardHandler {
    pub fn new(writer: CardWriter, min_year: i32) -> Self {
        Self { writer, min_year }
    }

    fn repository(&self) -> &Arc<dyn CardRepository> {
        self.writer.repository()
    }

    pub async fn handle(&self, cmd: CloneCardCommand) -> Result<CloneCardResult, CardError> {
        let source = self
            .writer
            .load_owned(&cmd.source_card_id, &cmd.user_id)
            .await?;

        validate_year(cmd.year, self.min_year, Timestamp::current_year())?;
        let category = match cmd.category.as_deref() {
            Some(raw) => CardCategory::parse_optional(Some(raw))?,
            None => source.category(),
        };
        let size = match cmd.grid_size {
            Some(size) => GridSize::new(size)?,
            None => source.grid().size(),
        };
        let grid = GridConfig::new(
            size,
            cmd.has_free_space
                .unwrap_or(source.grid().has_free_space()),
            cmd.header_text
                .or_else(|| source.grid().header_text().map(String::from)),
        )?;

        let mut card = Card::new(CardId::new(), cmd.user_id.clone(), cmd.year, cmd.title, category, grid)?;
        ensure_available(self.repository().as_ref(), &card).await?;

        let usable = card.grid().usable_slots();
        let contents = source.contents();
        let truncated_item_count = contents.len().saturating_sub(usable);
        for content in contents.into_iter().take(usable) {
            card.add_item(content, None)?;
        }

        save_new(self.repository().as_ref(), &card).await?;

        info!(
            card_id = %card.id(),
            source_card_id = %cmd.source_card_id,
            copied = card.item_count(),
            truncated = truncated_item_count,
            "Card cloned"
        );
        Ok(CloneCardResult {
            card,
            truncated_item_count,
        })
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

    async fn setup() -> (CardWriter, Card) {
        let repo = Arc::new(InMemoryCardRepository::new());
        let grid = GridConfig::new(GridSize::new(5).unwrap(), true, Some("BINGO".into())).unwrap();
        let mut card = Card::new(
            CardId::new(),
            owner(),
            Timestamp::current_year() - 1,
            None,
            Some(CardCategory::Health),
            grid,
        )
        .unwrap();
        for i in 0..24 {
            card.add_item(&format!("goal {i}"), None).unwrap();
        }
        card.finalize(None).unwrap();
        repo.save(&card).await.unwrap();
        (CardWriter::new(repo, 3), card)
    }

    fn cmd(source: &Card) -> CloneCardCommand {
        CloneCardCommand {
            source_card_id: *source.id(),
            user_id: owner(),
            year: Timestamp::current_year(),
            title: None,
            category: None,
            grid_size: None,
            has_free_space: None,
            header_text: None,
        }
    }

    #[tokio::test]
    async fn clone_inherits_grid_and_category() {
        let (writer, source) = setup().await;
        let result = CloneCardHandler::new(writer, 2020).handle(cmd(&source)).await.unwrap();

        assert_eq!(result.truncated_item_count, 0);
        assert_eq!(result.card.status(), CardStatus::Draft);
        assert_eq!(result.card.item_count(), 24);
        assert_eq!(result.card.category(), Some(CardCategory::Health));
        assert_eq!(result.card.grid().header_text(), Some("BINGO"));
        assert!(result.card.items().all(|i| !i.is_completed()));
    }

    #[tokio::test]
    async fn clone_to_smaller_grid_truncates() {
        let (writer, source) = setup().await;
        let command = CloneCardCommand {
            grid_size: Some(3),
            ..cmd(&source)
        };
        let result = CloneCardHandler::new(writer, 2020).handle(command).await.unwrap();

        assert_eq!(result.card.item_count(), 8);
        assert_eq!(result.truncated_item_count, 16);
        assert_eq!(result.card.item_at(0).unwrap().content(), "goal 0");
    }

    #[tokio::test]
    async fn clone_into_taken_year_fails() {
        let (writer, source) = setup().await;
        let command = CloneCardCommand {
            year: source.year(),
            ..cmd(&source)
        };
        let result = CloneCardHandler::new(writer, 2020).handle(command).await;
        assert!(matches!(result, Err(CardError::CardAlreadyExists { .. })));
    }

    #[tokio::test]
    async fn clone_requires_ownership() {
        let (writer, source) = setup().await;
        let command = CloneCardCommand {
            user_id: UserId::new("someone-else").unwrap(),
            ..cmd(&source)
        };
        let result = CloneCardHandler::new(writer, 2020).handle(command).await;
        assert_eq!(result.unwrap_err(), CardError::Forbidden);
    }
}
