//! CardEngine - the single entry point for card operations.
//!
//! Callers resolve the acting user, build a command and hand it here. Every
//! write goes through a handler that enforces ownership, lifecycle state and
//! optimistic versioning.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::domain::card::{Card, CardError, CardStats};
use crate::domain::foundation::{CardId, UserId};
use crate::ports::{CardRepository, RngSource};

use super::handlers::card::{
    AddItemCommand, AddItemHandler, AddItemResult, ArchiveCardCommand, ArchiveCardHandler,
    CardWriter, CloneCardCommand, CloneCardHandler, CloneCardResult, CompleteItemCommand,
    CompleteItemHandler, CreateCardCommand, CreateCardHandler, DeleteCardCommand,
    DeleteCardHandler, FinalizeCardCommand, FinalizeCardHandler, GetCardHandler,
    GetStatsHandler, ImportCardCommand, ImportCardHandler, ItemProgressResult, ListCardsHandler,
    RemoveItemCommand, RemoveItemHandler, ShuffleCardCommand, ShuffleCardHandler,
    SwapItemsCommand, SwapItemsHandler, UncompleteItemCommand, UncompleteItemHandler,
    UpdateGridConfigCommand, UpdateGridConfigHandler, UpdateItemCommand, UpdateItemHandler,
    UpdateMetaCommand, UpdateMetaHandler, UpdateNotesCommand, UpdateNotesHandler,
    UpdateVisibilityCommand, UpdateVisibilityHandler,
};

pub struct CardEngine {
    create: CreateCardHandler,
    add_item: AddItemHandler,
    update_item: UpdateItemHandler,
    remove_item: RemoveItemHandler,
    shuffle: ShuffleCardHandler,
    swap: SwapItemsHandler,
    update_config: UpdateGridConfigHandler,
    finalize: FinalizeCardHandler,
    clone_card: CloneCardHandler,
    import: ImportCardHandler,
    complete_item: CompleteItemHandler,
    uncomplete_item: UncompleteItemHandler,
    update_notes: UpdateNotesHandler,
    get_card: GetCardHandler,
    get_stats: GetStatsHandler,
    list_cards: ListCardsHandler,
    update_visibility: UpdateVisibilityHandler,
    update_meta: UpdateMetaHandler,
    archive: ArchiveCardHandler,
    delete: DeleteCardHandler,
}

impl CardEngine {
    pub fn new(
        repository: Arc<dyn CardRepository>,
        rng_source: Arc<dyn RngSource>,
        config: &EngineConfig,
    ) -> Self {
        let writer = CardWriter::new(repository.clone(), config.max_conflict_retries);
        Self {
            create: CreateCardHandler::new(repository.clone(), config.min_year),
            add_item: AddItemHandler::new(writer.clone()),
            update_item: UpdateItemHandler::new(writer.clone()),
            remove_item: RemoveItemHandler::new(writer.clone()),
            shuffle: ShuffleCardHandler::new(writer.clone(), rng_source),
            swap: SwapItemsHandler::new(writer.clone()),
            update_config: UpdateGridConfigHandler::new(writer.clone()),
            finalize: FinalizeCardHandler::new(writer.clone()),
            clone_card: CloneCardHandler::new(writer.clone(), config.min_year),
            import: ImportCardHandler::new(repository.clone(), config.min_year),
            complete_item: CompleteItemHandler::new(writer.clone()),
            uncomplete_item: UncompleteItemHandler::new(writer.clone()),
            update_notes: UpdateNotesHandler::new(writer.clone()),
            get_card: GetCardHandler::new(repository.clone()),
            get_stats: GetStatsHandler::new(repository.clone()),
            list_cards: ListCardsHandler::new(repository),
            update_visibility: UpdateVisibilityHandler::new(writer.clone()),
            update_meta: UpdateMetaHandler::new(writer.clone()),
            archive: ArchiveCardHandler::new(writer.clone()),
            delete: DeleteCardHandler::new(writer),
        }
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────────

    pub async fn create(&self, cmd: CreateCardCommand) -> Result<Card, CardError> {
        self.create.handle(cmd).await
    }

    pub async fn finalize(&self, cmd: FinalizeCardCommand) -> Result<Card, CardError> {
        self.finalize.handle(cmd).await
    }

    pub async fn clone_card(&self, cmd: CloneCardCommand) -> Result<CloneCardResult, CardError> {
        self.clone_card.handle(cmd).await
    }

    pub async fn import(&self, cmd: ImportCardCommand) -> Result<Card, CardError> {
        self.import.handle(cmd).await
    }

    pub async fn archive(&self, cmd: ArchiveCardCommand) -> Result<Card, CardError> {
        self.archive.handle(cmd).await
    }

    pub async fn delete(&self, cmd: DeleteCardCommand) -> Result<(), CardError> {
        self.delete.handle(cmd).await
    }

    // ─── Draft editing ───────────────────────────────────────────────────────

    pub async fn add_item(&self, cmd: AddItemCommand) -> Result<AddItemResult, CardError> {
        self.add_item.handle(cmd).await
    }

    pub async fn update_item(&self, cmd: UpdateItemCommand) -> Result<Card, CardError> {
        self.update_item.handle(cmd).await
    }

    pub async fn remove_item(&self, cmd: RemoveItemCommand) -> Result<Card, CardError> {
        self.remove_item.handle(cmd).await
    }

    pub async fn shuffle(&self, cmd: ShuffleCardCommand) -> Result<Card, CardError> {
        self.shuffle.handle(cmd).await
    }

    pub async fn swap(&self, cmd: SwapItemsCommand) -> Result<Card, CardError> {
        self.swap.handle(cmd).await
    }

    pub async fn update_config(&self, cmd: UpdateGridConfigCommand) -> Result<Card, CardError> {
        self.update_config.handle(cmd).await
    }

    // ─── Progress ────────────────────────────────────────────────────────────

    pub async fn complete_item(
        &self,
        cmd: CompleteItemCommand,
    ) -> Result<ItemProgressResult, CardError> {
        self.complete_item.handle(cmd).await
    }

    pub async fn uncomplete_item(
        &self,
        cmd: UncompleteItemCommand,
    ) -> Result<ItemProgressResult, CardError> {
        self.uncomplete_item.handle(cmd).await
    }

    pub async fn update_notes(
        &self,
        cmd: UpdateNotesCommand,
    ) -> Result<ItemProgressResult, CardError> {
        self.update_notes.handle(cmd).await
    }

    // ─── Settings ────────────────────────────────────────────────────────────

    pub async fn update_visibility(
        &self,
        cmd: UpdateVisibilityCommand,
    ) -> Result<Card, CardError> {
        self.update_visibility.handle(cmd).await
    }

    pub async fn update_meta(&self, cmd: UpdateMetaCommand) -> Result<Card, CardError> {
        self.update_meta.handle(cmd).await
    }

    // ─── Reads ───────────────────────────────────────────────────────────────

    pub async fn get_card(&self, card_id: &CardId, viewer: &UserId) -> Result<Card, CardError> {
        self.get_card.handle(card_id, viewer).await
    }

    pub async fn get_stats(
        &self,
        card_id: &CardId,
        viewer: &UserId,
    ) -> Result<CardStats, CardError> {
        self.get_stats.handle(card_id, viewer).await
    }

    pub async fn list_cards(&self, owner_id: &UserId) -> Result<Vec<Card>, CardError> {
        self.list_cards.handle(owner_id).await
    }
}
