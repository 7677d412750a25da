//! Grid arrangement handlers: shuffle, swap and configuration changes.

use std::sync::Arc;
use tracing::debug;

use crate::domain::card::{Card, CardError, GridSize, GridUpdate, Position};
use crate::domain::foundation::{CardId, UserId};
use crate::ports::RngSource;

use super::card_writer::CardWriter;

// ─────────────────────────────────────────────────────────────────────────────
// Shuffle
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ShuffleCardCommand {
    pub card_id: CardId,
    pub user_id: UserId,
}

/// Randomly permutes items across the occupied positions of a draft card.
pub struct ShuffleCardHandler {
    writer: CardWriter,
    rng_source: Arc<dyn RngSource>,
}

impl ShuffleCardHandler {
    pub fn new(writer: CardWriter, rng_source: Arc<dyn RngSource>) -> Self {
        Self { writer, rng_source }
    }

    pub async fn handle(&self, cmd: ShuffleCardCommand) -> Result<Card, CardError> {
        let mut rng = self.rng_source.generator();
        let (card, ()) = self
            .writer
            .apply(&cmd.card_id, &cmd.user_id, |card| card.shuffle(&mut rng))
            .await?;

        debug!(card_id = %cmd.card_id, items = card.item_count(), "Card shuffled");
        Ok(card)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Swap
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SwapItemsCommand {
    pub card_id: CardId,
    pub user_id: UserId,
    pub first: Position,
    pub second: Position,
}

pub struct SwapItemsHandler {
    writer: CardWriter,
}

impl SwapItemsHandler {
    pub fn new(writer: CardWriter) -> Self {
        Self { writer }
    }

    pub async fn handle(&self, cmd: SwapItemsCommand) -> Result<Card, CardError> {
        let (card, ()) = self
            .writer
            .apply(&cmd.card_id, &cmd.user_id, |card| card.swap(cmd.first, cmd.second))
            .await?;

        debug!(card_id = %cmd.card_id, first = cmd.first, second = cmd.second, "Items swapped");
        Ok(card)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UpdateConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Changes grid size, FREE cell or header of a draft card.
///
/// `None` leaves a setting unchanged; `header_text: Some(None)` clears the
/// header.
#[derive(Debug, Clone)]
pub struct UpdateGridConfigCommand {
    pub card_id: CardId,
    pub user_id: UserId,
    pub grid_size: Option<u8>,
    pub has_free_space: Option<bool>,
    pub header_text: Option<Option<String>>,
}

pub struct UpdateGridConfigHandler {
    writer: CardWriter,
}

impl UpdateGridConfigHandler {
    pub fn new(writer: CardWriter) -> Self {
        Self { writer }
    }

    pub async fn handle(&self, cmd: UpdateGridConfigCommand) -> Result<Card, CardError> {
        let update = GridUpdate {
            size: cmd.grid_size.map(GridSize::new).transpose()?,
            has_free_space: cmd.has_free_space,
            header_text: cmd.header_text,
        };

        let (card, ()) = self
            .writer
            .apply(&cmd.card_id, &cmd.user_id, |card| card.update_config(update.clone()))
            .await?;

        debug!(
            card_id = %cmd.card_id,
            grid_size = card.grid().size().get(),
            has_free_space = card.grid().has_free_space(),
            "Grid config updated"
        );
        Ok(card)
    }
}
