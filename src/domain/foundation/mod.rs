//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the goal-bingo domain.

mod card_status;
mod errors;
mod ids;
mod ownership;
mod state_machine;
mod timestamp;

pub use card_status::CardStatus;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CardId, UserId};
pub use ownership::OwnedByUser;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
