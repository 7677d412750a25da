//! Load-authorize-mutate-store cycle shared by card command handlers.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::domain::card::{Card, CardError, CardVersion};
use crate::domain::foundation::{CardId, ErrorCode, UserId};
use crate::ports::CardRepository;

/// Applies owner-only mutations under optimistic version checks.
///
/// When the store reports a version conflict the mutation is re-applied to
/// a freshly loaded card, so the loser of a race sees the winner's state and
/// fails (or succeeds) on its merits.
///
/// A conflict after which the reloaded card carries a newer version means
/// another writer committed; those retries are unbounded. Only conflicts
/// that show no progress count against `max_retries`.
#[derive(Clone)]
pub struct CardWriter {
    repository: Arc<dyn CardRepository>,
    max_retries: u32,
}

impl CardWriter {
    pub fn new(repository: Arc<dyn CardRepository>, max_retries: u32) -> Self {
        Self {
            repository,
            max_retries,
        }
    }

    pub fn repository(&self) -> &Arc<dyn CardRepository> {
        &self.repository
    }

    /// Loads a card, failing `CardNotFound` if absent.
    pub async fn load(&self, card_id: &CardId) -> Result<Card, CardError> {
        self.repository
            .find_by_id(card_id)
            .await?
            .ok_or_else(|| CardError::not_found(*card_id))
    }

    /// Loads a card the user owns.
    pub async fn load_owned(&self, card_id: &CardId, user_id: &UserId) -> Result<Card, CardError> {
        let card = self.load(card_id).await?;
        card.authorize(user_id)?;
        Ok(card)
    }

    /// Runs `mutate` against the stored card and writes the result back.
    pub async fn apply<T, F>(
        &self,
        card_id: &CardId,
        user_id: &UserId,
        mut mutate: F,
    ) -> Result<(Card, T), CardError>
    where
        F: FnMut(&mut Card) -> Result<T, CardError> + Send,
        T: Send,
    {
        let mut attempt = 0u32;
        let mut stalled = 0u32;
        let mut last_seen: Option<CardVersion> = None;
        loop {
            let mut card = self.load_owned(card_id, user_id).await?;
            let expected = card.version();
            if last_seen.is_some_and(|seen| expected <= seen) {
                stalled += 1;
            }
            last_seen = Some(expected);
            let output = mutate(&mut card)?;

            match self.repository.update(&card, expected).await {
                Ok(()) => return Ok((card, output)),
                Err(err)
                    if err.code == ErrorCode::ConcurrencyConflict && stalled < self.max_retries =>
                {
                    attempt += 1;
                    warn!(card_id = %card_id, attempt, stalled, "Card version conflict, retrying");
                    tokio::time::sleep(backoff(attempt)).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

fn backoff(attempt: u32) -> Duration {
    let base_ms = 1u64 << attempt.saturating_sub(1).min(3);
    let jitter_ms = rand::rng().random::<u64>() % 4;
    Duration::from_millis(base_ms + jitter_ms)
}
