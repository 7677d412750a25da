//! Card command and query handlers.

mod arrange_grid;
mod card_writer;
mod clone_card;
mod create_card;
mod edit_items;
mod finalize_card;
mod import_card;
mod manage_card;
mod queries;
mod record_progress;
mod uniqueness;

pub use arrange_grid::{
    ShuffleCardCommand, ShuffleCardHandler, SwapItemsCommand, SwapItemsHandler,
    UpdateGridConfigCommand, UpdateGridConfigHandler,
};
pub use card_writer::CardWriter;
pub use clone_card::{CloneCardCommand, CloneCardHandler, CloneCardResult};
pub use create_card::{CreateCardCommand, CreateCardHandler};
pub use edit_items::{
    AddItemCommand, AddItemHandler, AddItemResult, RemoveItemCommand, RemoveItemHandler,
    UpdateItemCommand, UpdateItemHandler,
};
pub use finalize_card::{FinalizeCardCommand, FinalizeCardHandler};
pub use import_card::{ImportCardCommand, ImportCardHandler, ImportItem};
pub use manage_card::{
    ArchiveCardCommand, ArchiveCardHandler, DeleteCardCommand, DeleteCardHandler,
    UpdateMetaCommand, UpdateMetaHandler, UpdateVisibilityCommand, UpdateVisibilityHandler,
};
pub use queries::{GetCardHandler, GetStatsHandler, ListCardsHandler};
pub use record_progress::{
    CompleteItemCommand, CompleteItemHandler, ItemProgressResult, UncompleteItemCommand,
    UncompleteItemHandler, UpdateNotesCommand, UpdateNotesHandler,
};
pub use uniqueness::{ensure_available, find_conflict, save_new};
