//! Card-specific error types.

use thiserror::Error;

use crate::domain::foundation::{CardId, DomainError, ErrorCode, ValidationError};

use super::{ExistingCardSummary, Position};

/// Broad failure category, used by callers that only need to branch on the
/// class of a failure rather than the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardErrorKind {
    NotFound,
    Ownership,
    State,
    Validation,
    Conflict,
    Infrastructure,
}

/// Errors specific to card operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    // ─── Not found ───────────────────────────────────────────────────────────
    #[error("Card not found: {0}")]
    CardNotFound(CardId),

    #[error("No item at position {position}")]
    ItemNotFound { position: Position },

    // ─── Ownership ───────────────────────────────────────────────────────────
    #[error("User does not own this card")]
    Forbidden,

    // ─── State ───────────────────────────────────────────────────────────────
    #[error("Card is finalized; its grid can no longer be edited")]
    CardFinalized,

    #[error("Card must be finalized before progress can be recorded")]
    CardNotFinalized,

    #[error("Card is already archived")]
    AlreadyArchived,

    // ─── Grid capacity and placement ─────────────────────────────────────────
    #[error("Card is full ({usable_slots} usable slots)")]
    CardFull { usable_slots: usize },

    #[error("Position {position} is already occupied")]
    PositionOccupied { position: Position },

    #[error("Position {position} is not a usable cell on this grid")]
    InvalidPosition { position: Position },

    #[error("No room for the FREE cell: every position holds an item")]
    NoSpaceForFree,

    #[error("Grid too small: {item_count} items do not fit in {usable_slots} slots")]
    GridTooSmall {
        item_count: usize,
        usable_slots: usize,
    },

    #[error("{}", incomplete_grid_message(.missing_positions))]
    IncompleteGrid { missing_positions: Vec<Position> },

    // ─── Uniqueness ──────────────────────────────────────────────────────────
    #[error("A card for {year} already exists")]
    CardAlreadyExists { year: i32 },

    #[error("A card titled '{title}' already exists for {year}")]
    CardTitleExists { year: i32, title: String },

    #[error("A card for {} already exists", .0.year)]
    CardExists(ExistingCardSummary),

    #[error("Conflict: {0}")]
    Duplicate(String),

    // ─── Validation ──────────────────────────────────────────────────────────
    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Title must be {max} characters or less, got {actual}")]
    TitleTooLong { max: usize, actual: usize },

    #[error("Grid size must be between 2 and 5, got {0}")]
    InvalidGridSize(u8),

    #[error("Year must be between {min} and {max}, got {year}")]
    InvalidYear { year: i32, min: i32, max: i32 },

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    // ─── Infrastructure ──────────────────────────────────────────────────────
    #[error("Card was modified concurrently")]
    ConcurrencyConflict,

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

fn incomplete_grid_message(missing: &[Position]) -> String {
    let listed = missing
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Card needs {} more item(s) before it can be finalized; empty positions: {}",
        missing.len(),
        listed
    )
}

impl CardError {
    pub fn not_found(id: CardId) -> Self {
        CardError::CardNotFound(id)
    }

    pub fn item_not_found(position: Position) -> Self {
        CardError::ItemNotFound { position }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CardError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        CardError::Infrastructure(message.into())
    }

    /// Returns the failure class.
    pub fn kind(&self) -> CardErrorKind {
        match self {
            CardError::CardNotFound(_) | CardError::ItemNotFound { .. } => CardErrorKind::NotFound,
            CardError::Forbidden => CardErrorKind::Ownership,
            CardError::CardFinalized
            | CardError::CardNotFinalized
            | CardError::AlreadyArchived
            | CardError::CardFull { .. }
            | CardError::PositionOccupied { .. }
            | CardError::NoSpaceForFree
            | CardError::GridTooSmall { .. }
            | CardError::IncompleteGrid { .. } => CardErrorKind::State,
            CardError::CardAlreadyExists { .. }
            | CardError::CardTitleExists { .. }
            | CardError::CardExists(_)
            | CardError::Duplicate(_) => CardErrorKind::Conflict,
            CardError::InvalidPosition { .. }
            | CardError::InvalidCategory(_)
            | CardError::TitleTooLong { .. }
            | CardError::InvalidGridSize(_)
            | CardError::InvalidYear { .. }
            | CardError::InvalidHeader(_)
            | CardError::ValidationFailed { .. } => CardErrorKind::Validation,
            CardError::ConcurrencyConflict | CardError::Infrastructure(_) => {
                CardErrorKind::Infrastructure
            }
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CardError::CardNotFound(_) => ErrorCode::CardNotFound,
            CardError::ItemNotFound { .. } => ErrorCode::ItemNotFound,
            CardError::Forbidden => ErrorCode::Forbidden,
            CardError::CardFinalized => ErrorCode::CardFinalized,
            CardError::CardNotFinalized => ErrorCode::CardNotFinalized,
            CardError::AlreadyArchived => ErrorCode::CardArchived,
            CardError::CardFull { .. } => ErrorCode::CardFull,
            CardError::PositionOccupied { .. } => ErrorCode::PositionOccupied,
            CardError::IncompleteGrid { .. } => ErrorCode::IncompleteGrid,
            CardError::NoSpaceForFree | CardError::GridTooSmall { .. } => {
                ErrorCode::InvalidStateTransition
            }
            CardError::CardAlreadyExists { .. }
            | CardError::CardTitleExists { .. }
            | CardError::CardExists(_)
            | CardError::Duplicate(_) => ErrorCode::Conflict,
            CardError::InvalidYear { .. } | CardError::InvalidGridSize(_) => ErrorCode::OutOfRange,
            CardError::InvalidPosition { .. }
            | CardError::InvalidCategory(_)
            | CardError::InvalidHeader(_)
            | CardError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            CardError::TitleTooLong { .. } => ErrorCode::InvalidFormat,
            CardError::ConcurrencyConflict => ErrorCode::ConcurrencyConflict,
            CardError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<ValidationError> for CardError {
    fn from(err: ValidationError) -> Self {
        CardError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for CardError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden | ErrorCode::Unauthorized => CardError::Forbidden,
            ErrorCode::ConcurrencyConflict => CardError::ConcurrencyConflict,
            ErrorCode::Conflict => CardError::Duplicate(err.message),
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => CardError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            _ => CardError::Infrastructure(err.to_string()),
        }
    }
}

impl From<CardError> for DomainError {
    fn from(err: CardError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
