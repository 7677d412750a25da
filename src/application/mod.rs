//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! `CardEngine` is the facade over the card handlers; `bootstrap` wires
//! adapters from configuration.

pub mod bootstrap;
pub mod card_engine;
pub mod handlers;

pub use bootstrap::{BootstrapError, Services};
pub use card_engine::CardEngine;
pub use handlers::card::{
    AddItemCommand, AddItemResult, ArchiveCardCommand, CloneCardCommand, CloneCardResult,
    CompleteItemCommand, CreateCardCommand, DeleteCardCommand, FinalizeCardCommand,
    ImportCardCommand, ImportItem, ItemProgressResult, RemoveItemCommand, ShuffleCardCommand,
    SwapItemsCommand, UncompleteItemCommand, UpdateGridConfigCommand, UpdateItemCommand,
    UpdateMetaCommand, UpdateNotesCommand, UpdateVisibilityCommand,
};
pub use handlers::quota::{
    ConsumeQuotaHandler, GetQuotaHandler, MeteredGeneration, RefundQuotaHandler,
};
