//! CardStatus enum for tracking the lifecycle of a bingo card.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of a card.
///
/// Archival is a separate flag on the card, not a status: an archived card
/// is still `Finalized` and still accepts completion edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    #[default]
    Draft,
    Finalized,
}

impl CardStatus {
    /// Returns true if grid structure (items, positions, config) can change.
    pub fn is_structurally_mutable(&self) -> bool {
        matches!(self, CardStatus::Draft)
    }

    /// Returns true if completion state can change.
    pub fn accepts_progress(&self) -> bool {
        matches!(self, CardStatus::Finalized)
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::Draft => "draft",
            CardStatus::Finalized => "finalized",
        }
    }

    /// Parses the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(CardStatus::Draft),
            "finalized" => Some(CardStatus::Finalized),
            _ => None,
        }
    }
}

impl StateMachine for CardStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CardStatus::*;
        matches!((self, target), (Draft, Finalized))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            CardStatus::Draft => vec![CardStatus::Finalized],
            CardStatus::Finalized => vec![],
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CardStatus::Draft => "Draft",
            CardStatus::Finalized => "Finalized",
        };
        write!(f, "{}", s)
    }
}
