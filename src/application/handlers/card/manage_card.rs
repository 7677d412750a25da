//! Card management handlers: visibility, metadata, archive, delete.

use std::sync::Arc;
use tracing::info;

use crate::domain::card::{normalize_title, Card, CardCategory, CardError};
use crate::domain::foundation::{CardId, UserId};
use crate::ports::CardRepository;

use super::card_writer::CardWriter;
use super::uniqueness::find_conflict;

// ─────────────────────────────────────────────────────────────────────────────
// UpdateVisibility
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct UpdateVisibilityCommand {
    pub card_id: CardId,
    pub user_id: UserId,
    pub visible_to_friends: bool,
}

pub struct UpdateVisibilityHandler {
    writer: CardWriter,
}

impl UpdateVisibilityHandler {
    pub fn new(writer: CardWriter) -> Self {
        Self { writer }
    }

    pub async fn handle(&self, cmd: UpdateVisibilityCommand) -> Result<Card, CardError> {
        let (card, ()) = self
            .writer
            .apply(&cmd.card_id, &cmd.user_id, |card| {
                card.set_visibility(cmd.visible_to_friends);
                Ok(())
            })
            .await?;
        Ok(card)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UpdateMeta
// ─────────────────────────────────────────────────────────────────────────────

/// Replaces title and category. `None` clears either.
#[derive(Debug, Clone)]
pub struct UpdateMetaCommand {
    pub card_id: CardId,
    pub user_id: UserId,
    pub title: Option<String>,
    pub category: Option<String>,
}

pub struct UpdateMetaHandler {
    writer: CardWriter,
}

impl UpdateMetaHandler {
    pub fn new(writer: CardWriter) -> Self {
        Self { writer }
    }

    fn repository(&self) -> &Arc<dyn CardRepository> {
        self.writer.repository()
    }

    pub async fn handle(&self, cmd: UpdateMetaCommand) -> Result<Card, CardError> {
        let title = normalize_title(cmd.title)?;
        let category = CardCategory::parse_optional(cmd.category.as_deref())?;

        let current = self.writer.load_owned(&cmd.card_id, &cmd.user_id).await?;
        if let Some(title) = title.as_deref() {
            let conflict = find_conflict(
                self.repository().as_ref(),
                &cmd.user_id,
                current.year(),
                Some(title),
                Some(&cmd.card_id),
            )
            .await?;
            if conflict.is_some() {
                return Err(CardError::CardTitleExists {
                    year: current.year(),
                    title: title.to_string(),
                });
            }
        }

        let (card, ()) = self
            .writer
            .apply(&cmd.card_id, &cmd.user_id, |card| {
                card.update_meta(title.clone(), category)
            })
            .await?;
        Ok(card)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Archive
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ArchiveCardCommand {
    pub card_id: CardId,
    pub user_id: UserId,
}

pub struct ArchiveCardHandler {
    writer: CardWriter,
}

impl ArchiveCardHandler {
    pub fn new(writer: CardWriter) -> Self {
        Self { writer }
    }

    pub async fn handle(&self, cmd: ArchiveCardCommand) -> Result<Card, CardError> {
        let (card, ()) = self
            .writer
            .apply(&cmd.card_id, &cmd.user_id, Card::archive)
            .await?;

        info!(card_id = %cmd.card_id, user_id = %cmd.user_id, "Card archived");
        Ok(card)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Delete
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DeleteCardCommand {
    pub card_id: CardId,
    pub user_id: UserId,
}

pub struct DeleteCardHandler {
    writer: CardWriter,
}

impl DeleteCardHandler {
    pub fn new(writer: CardWriter) -> Self {
        Self { writer }
    }

    pub async fn handle(&self, cmd: DeleteCardCommand) -> Result<(), CardError> {
        self.writer.load_owned(&cmd.card_id, &cmd.user_id).await?;
        self.writer.repository().delete(&cmd.card_id).await?;

        info!(card_id = %cmd.card_id, user_id = %cmd.user_id, "Card deleted");
        Ok(())
    }
}
