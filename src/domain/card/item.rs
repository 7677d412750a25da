//! CardItem entity - a single goal occupying one grid cell.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, ValidationError};

use super::{CardError, Position};

/// Maximum length of an item's goal text.
pub const MAX_CONTENT_LENGTH: usize = 500;

/// Maximum length of completion notes.
pub const MAX_NOTES_LENGTH: usize = 1000;

/// Maximum length of a proof URL.
pub const MAX_PROOF_URL_LENGTH: usize = 2048;

/// One goal on a card.
///
/// Positions are unique within a card and never equal the card's FREE cell;
/// the owning `Card` enforces both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardItem {
    position: Position,
    content: String,
    completed_at: Option<Timestamp>,
    notes: Option<String>,
    proof_url: Option<String>,
    created_at: Timestamp,
}

impl CardItem {
    /// Creates an uncompleted item after validating its content.
    pub fn new(position: Position, content: &str) -> Result<Self, CardError> {
        Ok(Self {
            position,
            content: normalize_content(content)?,
            completed_at: None,
            notes: None,
            proof_url: None,
            created_at: Timestamp::now(),
        })
    }

    /// Reconstitutes an item from persistence.
    pub fn reconstitute(
        position: Position,
        content: String,
        completed_at: Option<Timestamp>,
        notes: Option<String>,
        proof_url: Option<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            position,
            content,
            completed_at,
            notes,
            proof_url,
            created_at,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn completed_at(&self) -> Option<&Timestamp> {
        self.completed_at.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn proof_url(&self) -> Option<&str> {
        self.proof_url.as_deref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations (called by Card only)
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn set_content(&mut self, content: &str) -> Result<(), CardError> {
        self.content = normalize_content(content)?;
        Ok(())
    }

    /// Marks the item complete. Notes and proof are only replaced when given.
    pub(crate) fn complete(
        &mut self,
        notes: Option<String>,
        proof_url: Option<String>,
    ) -> Result<(), CardError> {
        let notes = normalize_notes(notes)?;
        let proof_url = normalize_proof_url(proof_url)?;

        self.completed_at = Some(Timestamp::now());
        if notes.is_some() {
            self.notes = notes;
        }
        if proof_url.is_some() {
            self.proof_url = proof_url;
        }
        Ok(())
    }

    /// Clears completion. Notes survive; the proof URL only belongs to a
    /// completed item and is dropped.
    pub(crate) fn uncomplete(&mut self) {
        self.completed_at = None;
        self.proof_url = None;
    }

    pub(crate) fn set_notes(&mut self, notes: Option<String>) -> Result<(), CardError> {
        self.notes = normalize_notes(notes)?;
        Ok(())
    }
}

/// Trims goal text and enforces its bounds.
pub fn normalize_content(raw: &str) -> Result<String, CardError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field("content").into());
    }
    let len = trimmed.chars().count();
    if len > MAX_CONTENT_LENGTH {
        return Err(ValidationError::too_long("content", MAX_CONTENT_LENGTH, len).into());
    }
    Ok(trimmed.to_string())
}

/// Blank notes are stored as no notes.
fn normalize_notes(notes: Option<String>) -> Result<Option<String>, CardError> {
    let Some(raw) = notes else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let len = trimmed.chars().count();
    if len > MAX_NOTES_LENGTH {
        return Err(ValidationError::too_long("notes", MAX_NOTES_LENGTH, len).into());
    }
    Ok(Some(trimmed.to_string()))
}

fn normalize_proof_url(url: Option<String>) -> Result<Option<String>, CardError> {
    let Some(raw) = url else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.len() > MAX_PROOF_URL_LENGTH {
        return Err(
            ValidationError::too_long("proof_url", MAX_PROOF_URL_LENGTH, trimmed.len()).into(),
        );
    }
    let lower = trimmed.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(ValidationError::invalid_format(
            "proof_url",
            "must be an http or https URL",
        )
        .into());
    }
    Ok(Some(trimmed.to_string()))
}
