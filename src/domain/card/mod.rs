//! Card module - the bingo grid aggregate and its rules.
//!
//! # Components
//!
//! - `Card` - aggregate root owning items, grid config and lifecycle
//! - `GridConfig` / `GridSize` - board geometry and FREE cell placement
//! - `CardItem` - one goal in one cell
//! - `CardStats` - progress and bingo line detection
//! - `CardError` - typed failures for every card operation

mod aggregate;
mod category;
mod errors;
mod grid;
mod item;
mod stats;

pub use aggregate::{
    normalize_title, titles_match, validate_year, Card, CardVersion, ExistingCardSummary,
    GridUpdate, MAX_TITLE_LENGTH,
};
pub use category::CardCategory;
pub use errors::{CardError, CardErrorKind};
pub use grid::{
    normalize_header, GridConfig, GridSize, Line, LineKind, Position, DEFAULT_GRID_SIZE,
    MAX_GRID_SIZE, MAX_HEADER_LENGTH, MIN_GRID_SIZE,
};
pub use item::{
    normalize_content, CardItem, MAX_CONTENT_LENGTH, MAX_NOTES_LENGTH, MAX_PROOF_URL_LENGTH,
};
pub use stats::{completed_lines, CardStats};
