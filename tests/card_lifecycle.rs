//! End-to-end card lifecycle through the CardEngine with in-memory adapters.

mod common;

use common::{draft, engine, finalized, owner, this_year};
use goal_bingo::application::{
    AddItemCommand, ArchiveCardCommand, CloneCardCommand, CompleteItemCommand,
    FinalizeCardCommand, ImportCardCommand, ImportItem, RemoveItemCommand, ShuffleCardCommand,
    SwapItemsCommand, UncompleteItemCommand, UpdateGridConfigCommand, UpdateItemCommand,
};
use goal_bingo::domain::card::{CardError, LineKind};

#[tokio::test]
async fn card_full_exactly_when_saturated() {
    let engine = engine();
    let card = draft(&engine, this_year(), 3, true, 7).await;
    assert!(!card.is_full());

    let add = |content: &str| AddItemCommand {
        card_id: *card.id(),
        user_id: owner(),
        content: content.to_string(),
        position: None,
    };
    let last = engine.add_item(add("eighth")).await.unwrap();
    assert_eq!(last.item.position(), 8);
    assert!(last.card.is_full());

    assert_eq!(
        engine.add_item(add("ninth")).await.unwrap_err(),
        CardError::CardFull { usable_slots: 8 }
    );
}

#[tokio::test]
async fn finalize_is_one_way() {
    let engine = engine();
    let card_id = finalized(&engine, this_year(), 3, true).await;

    let err = engine
        .add_item(AddItemCommand {
            card_id,
            user_id: owner(),
            content: "late goal".to_string(),
            position: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err, CardError::CardFinalized);

    let draft_only = [
        engine
            .update_item(UpdateItemCommand {
                card_id,
                user_id: owner(),
                position: 0,
                content: Some("edit".to_string()),
                new_position: None,
            })
            .await
            .map(|_| ()),
        engine
            .remove_item(RemoveItemCommand {
                card_id,
                user_id: owner(),
                position: 0,
            })
            .await
            .map(|_| ()),
        engine
            .shuffle(ShuffleCardCommand {
                card_id,
                user_id: owner(),
            })
            .await
            .map(|_| ()),
        engine
            .swap(SwapItemsCommand {
                card_id,
                user_id: owner(),
                first: 0,
                second: 1,
            })
            .await
            .map(|_| ()),
        engine
            .update_config(UpdateGridConfigCommand {
                card_id,
                user_id: owner(),
                grid_size: Some(5),
                has_free_space: None,
                header_text: None,
            })
            .await
            .map(|_| ()),
        engine
            .finalize(FinalizeCardCommand {
                card_id,
                user_id: owner(),
                visible_to_friends: None,
            })
            .await
            .map(|_| ()),
    ];
    for result in draft_only {
        assert_eq!(result.unwrap_err(), CardError::CardFinalized);
    }
}

#[tokio::test]
async fn progress_requires_finalized_card() {
    let engine = engine();
    let card = draft(&engine, this_year(), 2, false, 4).await;

    let complete = engine
        .complete_item(CompleteItemCommand {
            card_id: *card.id(),
            user_id: owner(),
            position: 0,
            notes: None,
            proof_url: None,
        })
        .await;
    assert_eq!(complete.unwrap_err(), CardError::CardNotFinalized);

    let uncomplete = engine
        .uncomplete_item(UncompleteItemCommand {
            card_id: *card.id(),
            user_id: owner(),
            position: 0,
        })
        .await;
    assert_eq!(uncomplete.unwrap_err(), CardError::CardNotFinalized);
}

#[tokio::test]
async fn full_five_by_five_scores_twelve_bingos() {
    let engine = engine();
    let card_id = finalized(&engine, this_year(), 5, true).await;

    for position in (0..25).filter(|&p| p != 12) {
        engine
            .complete_item(CompleteItemCommand {
                card_id,
                user_id: owner(),
                position,
                notes: None,
                proof_url: None,
            })
            .await
            .unwrap();
    }

    let stats = engine.get_stats(&card_id, &owner()).await.unwrap();
    assert_eq!(stats.completed_items, 24);
    assert_eq!(stats.completion_ratio, 1.0);
    assert_eq!(stats.bingo_count, 12);
    assert!(stats.completed_lines.contains(&LineKind::AntiDiagonal));
}

#[tokio::test]
async fn archived_card_still_records_progress() {
    let engine = engine();
    let card_id = finalized(&engine, this_year(), 2, false).await;
    engine
        .archive(ArchiveCardCommand {
            card_id,
            user_id: owner(),
        })
        .await
        .unwrap();

    let result = engine
        .complete_item(CompleteItemCommand {
            card_id,
            user_id: owner(),
            position: 2,
            notes: Some("still counts".to_string()),
            proof_url: None,
        })
        .await
        .unwrap();
    assert!(result.card.is_archived());
    assert_eq!(result.item.position(), 2);
    assert!(result.item.is_completed());
    assert_eq!(result.item.notes(), Some("still counts"));
}

#[tokio::test]
async fn clone_reports_truncated_items() {
    let engine = engine();
    let source = finalized(&engine, this_year() - 1, 5, true).await;

    let result = engine
        .clone_card(CloneCardCommand {
            source_card_id: source,
            user_id: owner(),
            year: this_year(),
            title: Some("Next year".to_string()),
            category: None,
            grid_size: Some(2),
            has_free_space: Some(true),
            header_text: None,
        })
        .await
        .unwrap();

    assert_eq!(result.card.grid().usable_slots(), 3);
    assert_eq!(result.card.item_count(), 3);
    assert_eq!(result.truncated_item_count, 21);
    assert_eq!(result.card.contents(), vec!["goal 0", "goal 1", "goal 2"]);
}

#[tokio::test]
async fn import_conflict_leaves_store_untouched() {
    let engine = engine();
    let existing = finalized(&engine, this_year(), 2, false).await;

    let result = engine
        .import(ImportCardCommand {
            owner_id: owner(),
            year: this_year(),
            title: None,
            category: None,
            grid_size: Some(2),
            has_free_space: Some(false),
            header_text: None,
            items: (0..4).map(|i| ImportItem::new(format!("imported {i}"))).collect(),
            finalize: true,
            visible_to_friends: None,
        })
        .await;

    match result {
        Err(CardError::CardExists(summary)) => {
            assert_eq!(summary.id, existing);
            assert_eq!(summary.year, this_year());
            assert!(summary.is_finalized);
        }
        other => panic!("expected CardExists, got {other:?}"),
    }

    let cards = engine.list_cards(&owner()).await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].item_at(0).unwrap().content(), "goal 0");
}
