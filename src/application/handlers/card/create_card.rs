//! CreateCardHandler - Command handler for creating draft cards.

use std::sync::Arc;
use tracing::info;

use crate::domain::card::{
    validate_year, Card, CardCategory, CardError, GridConfig, GridSize, DEFAULT_GRID_SIZE,
};
use crate::domain::foundation::{CardId, Timestamp, UserId};
use crate::ports::CardRepository;

use super::uniqueness::save_new;

/// Command to create a new empty draft card.
#[derive(Debug, Clone)]
pub struct CreateCardCommand {
    pub owner_id: UserId,
    pub year: i32,
    /// Defaults to 5.
    pub grid_size: Option<u8>,
    /// Defaults to true.
    pub has_free_space: Option<bool>,
    pub header_text: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
}

impl CreateCardCommand {
    /// A default 5x5 card with a FREE centre.
    pub fn new(owner_id: UserId, year: i32) -> Self {
        Self {
            owner_id,
            year,
            grid_size: None,
            has_free_space: None,
            header_text: None,
            title: None,
            category: None,
        }
    }
}

/// Handler for creating cards.
pub struct CreateCardHandler {
    repository: Arc<dyn CardRepository>,
    min_year: i32,
}

impl CreateCardHandler {
    pub fn new(repository: Arc<dyn CardRepository>, min_year: i32) -> Self {
        Self {
            repository,
            min_year,
        }
    }

    pub async fn handle(&self, cmd: CreateCardCommand) -> Result<Card, CardError> {
        // 1. Validate inputs
        validate_year(cmd.year, self.min_year, Timestamp::current_year())?;
        let category = CardCategory::parse_optional(cmd.category.as_deref())?;
        let size = GridSize::new(cmd.grid_size.unwrap_or(DEFAULT_GRID_SIZE))?;
        let grid = GridConfig::new(size, cmd.has_free_space.unwrap_or(true), cmd.header_text)?;

        // 2. Build the draft
        let card = Card::new(CardId::new(), cmd.owner_id, cmd.year, cmd.title, category, grid)?;

        // 3. Persist under the per-year uniqueness rules
        save_new(self.repository.as_ref(), &card).await?;

        info!(
            card_id = %card.id(),
            year = card.year(),
            grid_size = card.grid().size().get(),
            "Card created"
        );
        Ok(card)
    }
}
