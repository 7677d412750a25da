//! Progress handlers for finalized cards: complete, uncomplete, notes.

use tracing::{debug, info};

use crate::domain::card::{Card, CardError, CardItem, Position};
use crate::domain::foundation::{CardId, UserId};

use super::card_writer::CardWriter;

/// The saved card and the item a progress command touched.
#[derive(Debug, Clone)]
pub struct ItemProgressResult {
    pub card: Card,
    pub item: CardItem,
}

fn touched_item(card: &Card, position: Position) -> Result<CardItem, CardError> {
    card.item_at(position)
        .cloned()
        .ok_or_else(|| CardError::item_not_found(position))
}

#[derive(Debug, Clone)]
pub struct CompleteItemCommand {
    pub card_id: CardId,
    pub user_id: UserId,
    pub position: Position,
    pub notes: Option<String>,
    pub proof_url: Option<String>,
}

pub struct CompleteItemHandler {
    writer: CardWriter,
}

impl CompleteItemHandler {
    pub fn new(writer: CardWriter) -> Self {
        Self { writer }
    }

    pub async fn handle(&self, cmd: CompleteItemCommand) -> Result<ItemProgressResult, CardError> {
        let (card, (bingos_before, item)) = self
            .writer
            .apply(&cmd.card_id, &cmd.user_id, |card| {
                let before = card.stats().bingo_count;
                card.complete_item(cmd.position, cmd.notes.clone(), cmd.proof_url.clone())?;
                Ok((before, touched_item(card, cmd.position)?))
            })
            .await?;

        let bingos = card.stats().bingo_count;
        if bingos > bingos_before {
            info!(card_id = %cmd.card_id, bingo_count = bingos, "Bingo!");
        } else {
            debug!(card_id = %cmd.card_id, position = cmd.position, "Item completed");
        }
        Ok(ItemProgressResult { card, item })
    }
}

#[derive(Debug, Clone)]
pub struct UncompleteItemCommand {
    pub card_id: CardId,
    pub user_id: UserId,
    pub position: Position,
}

pub struct UncompleteItemHandler {
    writer: CardWriter,
}

impl UncompleteItemHandler {
    pub fn new(writer: CardWriter) -> Self {
        Self { writer }
    }

    pub async fn handle(&self, cmd: UncompleteItemCommand) -> Result<ItemProgressResult, CardError> {
        let (card, item) = self
            .writer
            .apply(&cmd.card_id, &cmd.user_id, |card| {
                card.uncomplete_item(cmd.position)?;
                touched_item(card, cmd.position)
            })
            .await?;

        debug!(card_id = %cmd.card_id, position = cmd.position, "Item uncompleted");
        Ok(ItemProgressResult { card, item })
    }
}

/// `notes: None` clears the item's notes.
#[derive(Debug, Clone)]
pub struct UpdateNotesCommand {
    pub card_id: CardId,
    pub user_id: UserId,
    pub position: Position,
    pub notes: Option<String>,
}

pub struct UpdateNotesHandler {
    writer: CardWriter,
}

impl UpdateNotesHandler {
    pub fn new(writer: CardWriter) -> Self {
        Self { writer }
    }

    pub async fn handle(&self, cmd: UpdateNotesCommand) -> Result<ItemProgressResult, CardError> {
        let (card, item) = self
            .writer
            .apply(&cmd.card_id, &cmd.user_id, |card| {
                card.update_notes(cmd.position, cmd.notes.clone())?;
                touched_item(card, cmd.position)
            })
            .await?;

        debug!(card_id = %cmd.card_id, position = cmd.position, "Notes updated");
        Ok(ItemProgressResult { card, item })
    }
}
