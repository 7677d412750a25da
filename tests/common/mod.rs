//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use goal_bingo::adapters::memory::InMemoryCardRepository;
use goal_bingo::adapters::rng::SeededRngSource;
use goal_bingo::application::{
    AddItemCommand, CardEngine, CreateCardCommand, FinalizeCardCommand,
};
use goal_bingo::config::EngineConfig;
use goal_bingo::domain::card::Card;
use goal_bingo::domain::foundation::{CardId, Timestamp, UserId};

pub fn owner() -> UserId {
    UserId::new("owner-1").unwrap()
}

pub fn this_year() -> i32 {
    Timestamp::current_year()
}

pub fn engine() -> CardEngine {
    engine_with_seed(1)
}

pub fn engine_with_seed(seed: u64) -> CardEngine {
    CardEngine::new(
        Arc::new(InMemoryCardRepository::new()),
        Arc::new(SeededRngSource::new(seed)),
        &EngineConfig::default(),
    )
}

/// Creates a draft for `year` with `items` auto-placed goals.
pub async fn draft(engine: &CardEngine, year: i32, size: u8, free: bool, items: usize) -> Card {
    let card = engine
        .create(CreateCardCommand {
            grid_size: Some(size),
            has_free_space: Some(free),
            ..CreateCardCommand::new(owner(), year)
        })
        .await
        .unwrap();

    let mut latest = card;
    for i in 0..items {
        latest = engine
            .add_item(AddItemCommand {
                card_id: *latest.id(),
                user_id: owner(),
                content: format!("goal {i}"),
                position: None,
            })
            .await
            .unwrap()
            .card;
    }
    latest
}

/// Creates and finalizes a full card.
pub async fn finalized(engine: &CardEngine, year: i32, size: u8, free: bool) -> CardId {
    let usable = usize::from(size) * usize::from(size) - usize::from(free);
    let card = draft(engine, year, size, free, usable).await;
    engine
        .finalize(FinalizeCardCommand {
            card_id: *card.id(),
            user_id: owner(),
            visible_to_friends: None,
        })
        .await
        .unwrap();
    *card.id()
}
