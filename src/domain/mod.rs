//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `card` - Bingo card aggregate, grid geometry and line detection
//! - `quota` - Per-user free generation counter rules

pub mod card;
pub mod foundation;
pub mod quota;
