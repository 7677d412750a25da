//! Per-owner, per-year card uniqueness rules.
//!
//! - an untitled card may only be created when the owner has no card for
//!   that year
//! - a titled card may not share its (case-folded) title with another card
//!   of the same owner and year
//!
//! The pre-save lookup gives the precise error; the store re-checks both
//! rules at insert time, so a racing create still loses with the same error.

use crate::domain::card::{titles_match, Card, CardError};
use crate::domain::foundation::{CardId, DomainError, ErrorCode, OwnedByUser, UserId};
use crate::ports::CardRepository;

/// Returns the stored card that blocks `(owner, year, title)`, if any.
pub async fn find_conflict(
    repository: &dyn CardRepository,
    owner_id: &UserId,
    year: i32,
    title: Option<&str>,
    exclude: Option<&CardId>,
) -> Result<Option<Card>, CardError> {
    let existing = repository.find_by_owner_and_year(owner_id, year).await?;
    Ok(existing
        .into_iter()
        .filter(|card| Some(card.id()) != exclude)
        .find(|card| match title {
            None => true,
            Some(title) => card.title().is_some_and(|t| titles_match(t, title)),
        }))
}

/// Fails with `CardAlreadyExists` or `CardTitleExists` when `card` would
/// collide with a stored card.
pub async fn ensure_available(repository: &dyn CardRepository, card: &Card) -> Result<(), CardError> {
    let conflict = find_conflict(
        repository,
        card.owner_id(),
        card.year(),
        card.title(),
        Some(card.id()),
    )
    .await?;

    match conflict {
        None => Ok(()),
        Some(_) => Err(collision(card)),
    }
}

/// Checks availability, then inserts `card`. A conflict raised by the store
/// maps to the same error the lookup would have produced.
pub async fn save_new(repository: &dyn CardRepository, card: &Card) -> Result<(), CardError> {
    ensure_available(repository, card).await?;
    repository.save(card).await.map_err(|err| {
        if is_collision(&err) {
            collision(card)
        } else {
            err.into()
        }
    })
}

/// True when a store error reports a uniqueness clash.
pub fn is_collision(err: &DomainError) -> bool {
    err.code == ErrorCode::Conflict
}

fn collision(card: &Card) -> CardError {
    match card.title() {
        None => CardError::CardAlreadyExists { year: card.year() },
        Some(title) => CardError::CardTitleExists {
            year: card.year(),
            title: title.to_string(),
        },
    }
}
