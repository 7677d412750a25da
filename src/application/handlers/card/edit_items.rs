//! Item editing handlers for draft cards: add, update, remove.

use tracing::debug;

use crate::domain::card::{Card, CardError, CardItem, Position};
use crate::domain::foundation::{CardId, UserId};

use super::card_writer::CardWriter;

// ─────────────────────────────────────────────────────────────────────────────
// AddItem
// ─────────────────────────────────────────────────────────────────────────────

/// Command to add an item to a draft card.
#[derive(Debug, Clone)]
pub struct AddItemCommand {
    pub card_id: CardId,
    pub user_id: UserId,
    pub content: String,
    /// Lowest free usable slot when omitted.
    pub position: Option<Position>,
}

/// Result of adding an item.
#[derive(Debug, Clone)]
pub struct AddItemResult {
    pub card: Card,
    pub item: CardItem,
}

pub struct AddItemHandler {
    writer: CardWriter,
}

impl AddItemHandler {
    pub fn new(writer: CardWriter) -> Self {
        Self { writer }
    }

    pub async fn handle(&self, cmd: AddItemCommand) -> Result<AddItemResult, CardError> {
        let (card, position) = self
            .writer
            .apply(&cmd.card_id, &cmd.user_id, |card| {
                card.add_item(&cmd.content, cmd.position)
            })
            .await?;

        debug!(card_id = %cmd.card_id, position, "Item added");
        let item = card
            .item_at(position)
            .cloned()
            .ok_or(CardError::item_not_found(position))?;
        Ok(AddItemResult { card, item })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UpdateItem
// ─────────────────────────────────────────────────────────────────────────────

/// Command to edit and/or move an item on a draft card.
#[derive(Debug, Clone)]
pub struct UpdateItemCommand {
    pub card_id: CardId,
    pub user_id: UserId,
    pub position: Position,
    pub content: Option<String>,
    pub new_position: Option<Position>,
}

pub struct UpdateItemHandler {
    writer: CardWriter,
}

impl UpdateItemHandler {
    pub fn new(writer: CardWriter) -> Self {
        Self { writer }
    }

    pub async fn handle(&self, cmd: UpdateItemCommand) -> Result<Card, CardError> {
        let (card, position) = self
            .writer
            .apply(&cmd.card_id, &cmd.user_id, |card| {
                card.update_item(cmd.position, cmd.content.as_deref(), cmd.new_position)
            })
            .await?;

        debug!(card_id = %cmd.card_id, from = cmd.position, to = position, "Item updated");
        Ok(card)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RemoveItem
// ─────────────────────────────────────────────────────────────────────────────

/// Command to remove an item from a draft card.
#[derive(Debug, Clone)]
pub struct RemoveItemCommand {
    pub card_id: CardId,
    pub user_id: UserId,
    pub position: Position,
}

pub struct RemoveItemHandler {
    writer: CardWriter,
}

impl RemoveItemHandler {
    pub fn new(writer: CardWriter) -> Self {
        Self { writer }
    }

    pub async fn handle(&self, cmd: RemoveItemCommand) -> Result<Card, CardError> {
        let (card, _removed) = self
            .writer
            .apply(&cmd.card_id, &cmd.user_id, |card| card.remove_item(cmd.position))
            .await?;

        debug!(card_id = %cmd.card_id, position = cmd.position, "Item removed");
        Ok(card)
    }
}
