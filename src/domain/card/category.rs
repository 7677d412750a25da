//! Card category whitelist.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::CardError;

/// Theme of a card. Only these values are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardCategory {
    Personal,
    Health,
    Career,
    Social,
    Financial,
    Hobbies,
    Travel,
    Mixed,
    Professional,
}

impl CardCategory {
    pub const ALL: [CardCategory; 9] = [
        CardCategory::Personal,
        CardCategory::Health,
        CardCategory::Career,
        CardCategory::Social,
        CardCategory::Financial,
        CardCategory::Hobbies,
        CardCategory::Travel,
        CardCategory::Mixed,
        CardCategory::Professional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardCategory::Personal => "personal",
            CardCategory::Health => "health",
            CardCategory::Career => "career",
            CardCategory::Social => "social",
            CardCategory::Financial => "financial",
            CardCategory::Hobbies => "hobbies",
            CardCategory::Travel => "travel",
            CardCategory::Mixed => "mixed",
            CardCategory::Professional => "professional",
        }
    }

    /// Parses an optional raw category; `None` and blank input mean "no category".
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>, CardError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value.parse().map(Some),
        }
    }
}

impl FromStr for CardCategory {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        CardCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| CardError::InvalidCategory(s.to_string()))
    }
}

impl fmt::Display for CardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
