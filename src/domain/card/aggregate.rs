//! Card aggregate entity.
//!
//! A card is one user's goal grid for a year. It owns its items outright;
//! every structural change goes through the methods here so the grid
//! invariants hold after each call.
//!
//! # Lifecycle
//!
//! Draft (structure editable) → Finalized (progress editable) → optionally
//! archived. Finalization is one-way.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{
    CardId, CardStatus, OwnedByUser, StateMachine, Timestamp, UserId,
};

use super::{CardCategory, CardError, CardItem, CardStats, GridConfig, GridSize, Position};

/// Maximum length for a card title.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Optimistic concurrency counter. Starts at 1, bumped by every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardVersion(u32);

impl CardVersion {
    pub fn initial() -> Self {
        Self(1)
    }

    pub fn from_raw(value: u32) -> Self {
        Self(value)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for CardVersion {
    fn default() -> Self {
        Self::initial()
    }
}

/// What a caller learns about the card that blocked an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingCardSummary {
    pub id: CardId,
    pub title: Option<String>,
    pub year: i32,
    pub item_count: usize,
    pub is_finalized: bool,
}

/// Requested grid changes. `None` leaves a setting as it is; the header uses
/// `Some(None)` to clear it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridUpdate {
    pub size: Option<GridSize>,
    pub has_free_space: Option<bool>,
    pub header_text: Option<Option<String>>,
}

/// Card aggregate - one user's bingo grid for a year.
///
/// # Invariants
///
/// - no two items share a position
/// - every item sits on a usable position of `grid`
/// - `items.len() <= grid.usable_slots()`
/// - a finalized card holds exactly `grid.usable_slots()` items
/// - `is_archived` implies `status == Finalized`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CardRecord")]
pub struct Card {
    id: CardId,
    owner_id: UserId,
    year: i32,
    title: Option<String>,
    category: Option<CardCategory>,
    grid: GridConfig,
    items: BTreeMap<Position, CardItem>,
    status: CardStatus,
    is_archived: bool,
    visible_to_friends: bool,
    version: CardVersion,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Card {
    /// Creates an empty draft card.
    ///
    /// Year bounds and per-owner uniqueness depend on configuration and
    /// storage, so the create handler checks them.
    pub fn new(
        id: CardId,
        owner_id: UserId,
        year: i32,
        title: Option<String>,
        category: Option<CardCategory>,
        grid: GridConfig,
    ) -> Result<Self, CardError> {
        let title = normalize_title(title)?;
        let now = Timestamp::now();
        Ok(Self {
            id,
            owner_id,
            year,
            title,
            category,
            grid,
            items: BTreeMap::new(),
            status: CardStatus::Draft,
            is_archived: false,
            visible_to_friends: false,
            version: CardVersion::initial(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitutes a card from persistence.
    ///
    /// Stored rows are re-checked against the aggregate invariants, so a
    /// corrupt or torn read surfaces as an error instead of a broken card.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: CardId,
        owner_id: UserId,
        year: i32,
        title: Option<String>,
        category: Option<CardCategory>,
        grid: GridConfig,
        items: Vec<CardItem>,
        status: CardStatus,
        is_archived: bool,
        visible_to_friends: bool,
        version: CardVersion,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Result<Self, CardError> {
        if normalize_title(title.clone())? != title {
            return Err(CardError::validation("title", "title must be trimmed and non-blank"));
        }

        let mut placed = BTreeMap::new();
        for item in items {
            let position = item.position();
            grid.check_usable(position)?;
            if placed.insert(position, item).is_some() {
                return Err(CardError::PositionOccupied { position });
            }
        }

        let card = Self {
            id,
            owner_id,
            year,
            title,
            category,
            grid,
            items: placed,
            status,
            is_archived,
            visible_to_friends,
            version,
            created_at,
            updated_at,
        };

        if card.is_finalized() {
            let missing_positions = card.missing_positions();
            if !missing_positions.is_empty() {
                return Err(CardError::IncompleteGrid { missing_positions });
            }
        } else if card.is_archived {
            return Err(CardError::CardNotFinalized);
        }
        Ok(card)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &CardId {
        &self.id
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn category(&self) -> Option<CardCategory> {
        self.category
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Items in ascending position order.
    pub fn items(&self) -> impl Iterator<Item = &CardItem> {
        self.items.values()
    }

    pub fn item_at(&self, position: Position) -> Option<&CardItem> {
        self.items.get(&position)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.grid.usable_slots()
    }

    /// Usable positions that hold no item, ascending.
    pub fn missing_positions(&self) -> Vec<Position> {
        self.grid
            .usable_positions()
            .filter(|p| !self.items.contains_key(p))
            .collect()
    }

    /// Item contents in ascending position order.
    pub fn contents(&self) -> Vec<&str> {
        self.items.values().map(CardItem::content).collect()
    }

    pub fn status(&self) -> CardStatus {
        self.status
    }

    pub fn is_finalized(&self) -> bool {
        self.status == CardStatus::Finalized
    }

    pub fn is_archived(&self) -> bool {
        self.is_archived
    }

    pub fn visible_to_friends(&self) -> bool {
        self.visible_to_friends
    }

    pub fn version(&self) -> CardVersion {
        self.version
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn stats(&self) -> CardStats {
        CardStats::compute(&self.grid, &self.items)
    }

    pub fn summary(&self) -> ExistingCardSummary {
        ExistingCardSummary {
            id: self.id,
            title: self.title.clone(),
            year: self.year,
            item_count: self.items.len(),
            is_finalized: self.is_finalized(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────────

    /// Fails with `Forbidden` unless `user_id` owns the card.
    pub fn authorize(&self, user_id: &UserId) -> Result<(), CardError> {
        self.check_ownership(user_id).map_err(CardError::from)
    }

    /// Owners always see their cards; others only see finalized cards shared
    /// with friends.
    pub fn can_view(&self, user_id: &UserId) -> bool {
        self.is_owner(user_id) || (self.is_finalized() && self.visible_to_friends)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Draft mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Places a new item, at `position` or the lowest free usable slot.
    pub fn add_item(
        &mut self,
        content: &str,
        position: Option<Position>,
    ) -> Result<Position, CardError> {
        self.ensure_draft()?;
        if self.is_full() {
            return Err(CardError::CardFull {
                usable_slots: self.grid.usable_slots(),
            });
        }

        let position = match position {
            Some(pos) => {
                self.grid.check_usable(pos)?;
                if self.items.contains_key(&pos) {
                    return Err(CardError::PositionOccupied { position: pos });
                }
                pos
            }
            None => self.lowest_free_position()?,
        };

        let item = CardItem::new(position, content)?;
        self.items.insert(position, item);
        self.touch();
        Ok(position)
    }

    /// Edits an item's content and/or moves it. Returns its final position.
    pub fn update_item(
        &mut self,
        position: Position,
        content: Option<&str>,
        new_position: Option<Position>,
    ) -> Result<Position, CardError> {
        self.ensure_draft()?;
        if !self.items.contains_key(&position) {
            return Err(CardError::item_not_found(position));
        }

        let target = match new_position {
            Some(target) if target != position => {
                self.grid.check_usable(target)?;
                if self.items.contains_key(&target) {
                    return Err(CardError::PositionOccupied { position: target });
                }
                target
            }
            _ => position,
        };

        // Validate before touching the map so a bad edit leaves no trace.
        let mut item = self.items[&position].clone();
        if let Some(content) = content {
            item.set_content(content)?;
        }
        item.set_position(target);

        self.items.remove(&position);
        self.items.insert(target, item);
        self.touch();
        Ok(target)
    }

    pub fn remove_item(&mut self, position: Position) -> Result<CardItem, CardError> {
        self.ensure_draft()?;
        let removed = self
            .items
            .remove(&position)
            .ok_or(CardError::item_not_found(position))?;
        self.touch();
        Ok(removed)
    }

    /// Uniformly permutes items across the occupied positions.
    ///
    /// The set of occupied positions is unchanged, so the FREE cell and any
    /// empty cells stay where they are.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), CardError> {
        self.ensure_draft()?;

        let positions: Vec<Position> = self.items.keys().copied().collect();
        let mut items: Vec<CardItem> = std::mem::take(&mut self.items).into_values().collect();
        items.shuffle(rng);

        self.items = positions
            .into_iter()
            .zip(items)
            .map(|(pos, mut item)| {
                item.set_position(pos);
                (pos, item)
            })
            .collect();
        self.touch();
        Ok(())
    }

    /// Exchanges whatever sits at two usable positions (items or emptiness).
    pub fn swap(&mut self, first: Position, second: Position) -> Result<(), CardError> {
        self.ensure_draft()?;
        self.grid.check_usable(first)?;
        self.grid.check_usable(second)?;
        if first == second {
            return Ok(());
        }

        let a = self.items.remove(&first);
        let b = self.items.remove(&second);
        if let Some(mut item) = a {
            item.set_position(second);
            self.items.insert(second, item);
        }
        if let Some(mut item) = b {
            item.set_position(first);
            self.items.insert(first, item);
        }
        self.touch();
        Ok(())
    }

    /// Changes size, FREE cell or header.
    ///
    /// Items whose position is still usable stay put. The rest move to the
    /// lowest free usable positions, in ascending order of their old
    /// position.
    pub fn update_config(&mut self, update: GridUpdate) -> Result<(), CardError> {
        self.ensure_draft()?;

        let size = update.size.unwrap_or(self.grid.size());
        let has_free_space = update.has_free_space.unwrap_or(self.grid.has_free_space());
        let header = match update.header_text {
            Some(header) => header,
            None => self.grid.header_text().map(str::to_string),
        };
        let grid = GridConfig::new(size, has_free_space, header)?;

        let item_count = self.items.len();
        if item_count > grid.usable_slots() {
            if grid.has_free_space() && item_count <= grid.total_positions() {
                return Err(CardError::NoSpaceForFree);
            }
            return Err(CardError::GridTooSmall {
                item_count,
                usable_slots: grid.usable_slots(),
            });
        }

        let mut relocated = BTreeMap::new();
        let mut displaced = Vec::new();
        for (pos, item) in &self.items {
            if grid.is_usable(*pos) {
                relocated.insert(*pos, item.clone());
            } else {
                displaced.push(item.clone());
            }
        }

        let open: Vec<Position> = grid
            .usable_positions()
            .filter(|p| !relocated.contains_key(p))
            .collect();
        for (mut item, slot) in displaced.into_iter().zip(open) {
            item.set_position(slot);
            relocated.insert(slot, item);
        }
        if relocated.len() != item_count {
            return Err(CardError::GridTooSmall {
                item_count,
                usable_slots: grid.usable_slots(),
            });
        }

        self.grid = grid;
        self.items = relocated;
        self.touch();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Locks the grid. Every usable slot must be filled.
    pub fn finalize(&mut self, visible_to_friends: Option<bool>) -> Result<(), CardError> {
        if self.status != CardStatus::Draft {
            return Err(CardError::CardFinalized);
        }
        let missing_positions = self.missing_positions();
        if !missing_positions.is_empty() {
            return Err(CardError::IncompleteGrid { missing_positions });
        }

        self.status = self.status.transition_to(CardStatus::Finalized)?;
        if let Some(visible) = visible_to_friends {
            self.visible_to_friends = visible;
        }
        self.touch();
        Ok(())
    }

    pub fn archive(&mut self) -> Result<(), CardError> {
        if !self.is_finalized() {
            return Err(CardError::CardNotFinalized);
        }
        if self.is_archived {
            return Err(CardError::AlreadyArchived);
        }
        self.is_archived = true;
        self.touch();
        Ok(())
    }

    pub fn set_visibility(&mut self, visible: bool) {
        self.visible_to_friends = visible;
        self.touch();
    }

    /// Replaces title and category. Allowed in every state.
    pub fn update_meta(
        &mut self,
        title: Option<String>,
        category: Option<CardCategory>,
    ) -> Result<(), CardError> {
        self.title = normalize_title(title)?;
        self.category = category;
        self.touch();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Progress (finalized only)
    // ─────────────────────────────────────────────────────────────────────────

    pub fn complete_item(
        &mut self,
        position: Position,
        notes: Option<String>,
        proof_url: Option<String>,
    ) -> Result<(), CardError> {
        self.progress_item(position)?.complete(notes, proof_url)?;
        self.touch();
        Ok(())
    }

    pub fn uncomplete_item(&mut self, position: Position) -> Result<(), CardError> {
        self.progress_item(position)?.uncomplete();
        self.touch();
        Ok(())
    }

    /// Sets or clears (`None`) an item's notes, completed or not.
    pub fn update_notes(
        &mut self,
        position: Position,
        notes: Option<String>,
    ) -> Result<(), CardError> {
        self.progress_item(position)?.set_notes(notes)?;
        self.touch();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_draft(&self) -> Result<(), CardError> {
        if self.status.is_structurally_mutable() {
            Ok(())
        } else {
            Err(CardError::CardFinalized)
        }
    }

    fn progress_item(&mut self, position: Position) -> Result<&mut CardItem, CardError> {
        if !self.status.accepts_progress() {
            return Err(CardError::CardNotFinalized);
        }
        self.items
            .get_mut(&position)
            .ok_or(CardError::item_not_found(position))
    }

    fn lowest_free_position(&self) -> Result<Position, CardError> {
        self.grid
            .usable_positions()
            .find(|p| !self.items.contains_key(p))
            .ok_or(CardError::CardFull {
                usable_slots: self.grid.usable_slots(),
            })
    }

    fn touch(&mut self) {
        self.version = self.version.next();
        self.updated_at = Timestamp::now();
    }
}

/// Wire shape of [`Card`]; deserialization goes through
/// [`Card::reconstitute`].
#[derive(Deserialize)]
struct CardRecord {
    id: CardId,
    owner_id: UserId,
    year: i32,
    title: Option<String>,
    category: Option<CardCategory>,
    grid: GridConfig,
    items: BTreeMap<Position, CardItem>,
    status: CardStatus,
    is_archived: bool,
    visible_to_friends: bool,
    version: CardVersion,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl TryFrom<CardRecord> for Card {
    type Error = CardError;

    fn try_from(record: CardRecord) -> Result<Self, Self::Error> {
        if let Some((key, item)) = record.items.iter().find(|(key, item)| **key != item.position()) {
            return Err(CardError::validation(
                "items",
                format!("item keyed {} claims position {}", key, item.position()),
            ));
        }
        Card::reconstitute(
            record.id,
            record.owner_id,
            record.year,
            record.title,
            record.category,
            record.grid,
            record.items.into_values().collect(),
            record.status,
            record.is_archived,
            record.visible_to_friends,
            record.version,
            record.created_at,
            record.updated_at,
        )
    }
}

impl OwnedByUser for Card {
    fn owner_id(&self) -> &UserId {
        &self.owner_id
    }
}

/// Trims a title; blank means no title.
pub fn normalize_title(title: Option<String>) -> Result<Option<String>, CardError> {
    let Some(raw) = title else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let len = trimmed.chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(CardError::TitleTooLong {
            max: MAX_TITLE_LENGTH,
            actual: len,
        });
    }
    Ok(Some(trimmed.to_string()))
}

/// Case-insensitive title comparison after trimming.
pub fn titles_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Checks `year` against `[min_year, current_year + 1]`.
pub fn validate_year(year: i32, min_year: i32, current_year: i32) -> Result<(), CardError> {
    let max = current_year + 1;
    if year < min_year || year > max {
        return Err(CardError::InvalidYear {
            year,
            min: min_year,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn owner() -> UserId {
        UserId::new("owner-1").unwrap()
    }

    fn draft(size: u8, free: bool) -> Card {
        let grid = GridConfig::new(GridSize::new(size).unwrap(), free, None).unwrap();
        Card::new(CardId::new(), owner(), 2025, None, None, grid).unwrap()
    }

    fn filled(size: u8, free: bool) -> Card {
        let mut card = draft(size, free);
        for i in 0..card.grid().usable_slots() {
            card.add_item(&format!("goal {}", i), None).unwrap();
        }
        card
    }

    fn finalized(size: u8, free: bool) -> Card {
        let mut card = filled(size, free);
        card.finalize(None).unwrap();
        card
    }

    // ─── Construction ────────────────────────────────────────────────────────

    #[test]
    fn new_card_is_empty_draft() {
        let card = draft(5, true);
        assert_eq!(card.status(), CardStatus::Draft);
        assert_eq!(card.item_count(), 0);
        assert!(!card.is_archived());
        assert!(!card.visible_to_friends());
        assert_eq!(card.version(), CardVersion::initial());
    }

    #[test]
    fn new_rejects_long_title() {
        let grid = GridConfig::default();
        let result = Card::new(
            CardId::new(),
            owner(),
            2025,
            Some("t".repeat(MAX_TITLE_LENGTH + 1)),
            None,
            grid,
        );
        assert!(matches!(result, Err(CardError::TitleTooLong { .. })));
    }

    #[test]
    fn validate_year_bounds() {
        assert!(validate_year(2020, 2020, 2025).is_ok());
        assert!(validate_year(2026, 2020, 2025).is_ok());
        assert!(matches!(
            validate_year(2027, 2020, 2025),
            Err(CardError::InvalidYear { max: 2026, .. })
        ));
        assert!(validate_year(2019, 2020, 2025).is_err());
    }

    #[test]
    fn titles_match_ignores_case_and_whitespace() {
        assert!(titles_match(" My Year ", "my year"));
        assert!(!titles_match("my year", "my years"));
    }

    // ─── Add / update / remove ───────────────────────────────────────────────

    #[test]
    fn add_item_fills_lowest_free_slot_skipping_free() {
        let mut card = draft(3, true);
        for expected in [0, 1, 2, 3, 5, 6, 7, 8] {
            assert_eq!(card.add_item("goal", None).unwrap(), expected);
        }
    }

    #[test]
    fn add_item_rejects_free_position() {
        let mut card = draft(5, true);
        assert!(matches!(
            card.add_item("goal", Some(12)),
            Err(CardError::InvalidPosition { position: 12 })
        ));
    }

    #[test]
    fn add_item_rejects_out_of_range_position() {
        let mut card = draft(2, false);
        assert!(matches!(
            card.add_item("goal", Some(4)),
            Err(CardError::InvalidPosition { position: 4 })
        ));
    }

    #[test]
    fn add_item_rejects_occupied_position() {
        let mut card = draft(5, true);
        card.add_item("first", Some(3)).unwrap();
        assert!(matches!(
            card.add_item("second", Some(3)),
            Err(CardError::PositionOccupied { position: 3 })
        ));
    }

    #[test]
    fn add_item_reports_full_before_position_checks() {
        let mut card = filled(2, true);
        assert!(matches!(
            card.add_item("extra", Some(12)),
            Err(CardError::CardFull { usable_slots: 3 })
        ));
    }

    #[test]
    fn add_item_bumps_version() {
        let mut card = draft(3, true);
        let before = card.version();
        card.add_item("goal", None).unwrap();
        assert_eq!(card.version(), before.next());
    }

    #[test]
    fn update_item_moves_and_edits() {
        let mut card = draft(3, true);
        card.add_item("old", Some(0)).unwrap();
        let pos = card.update_item(0, Some("new"), Some(8)).unwrap();

        assert_eq!(pos, 8);
        assert!(card.item_at(0).is_none());
        assert_eq!(card.item_at(8).unwrap().content(), "new");
        assert_eq!(card.item_at(8).unwrap().position(), 8);
    }

    #[test]
    fn update_item_onto_occupied_fails_without_change() {
        let mut card = draft(3, true);
        card.add_item("a", Some(0)).unwrap();
        card.add_item("b", Some(1)).unwrap();

        assert!(matches!(
            card.update_item(0, Some("changed"), Some(1)),
            Err(CardError::PositionOccupied { position: 1 })
        ));
        assert_eq!(card.item_at(0).unwrap().content(), "a");
    }

    #[test]
    fn update_missing_item_fails() {
        let mut card = draft(3, true);
        assert!(matches!(
            card.update_item(2, Some("x"), None),
            Err(CardError::ItemNotFound { position: 2 })
        ));
    }

    #[test]
    fn remove_item_leaves_gap() {
        let mut card = draft(3, true);
        card.add_item("a", None).unwrap();
        card.add_item("b", None).unwrap();
        card.remove_item(0).unwrap();

        assert!(card.item_at(0).is_none());
        assert_eq!(card.item_at(1).unwrap().content(), "b");
        assert!(matches!(card.remove_item(0), Err(CardError::ItemNotFound { .. })));
    }

    // ─── Shuffle / swap ──────────────────────────────────────────────────────

    #[test]
    fn shuffle_keeps_occupied_positions_and_contents() {
        let mut card = draft(5, true);
        for i in 0..10 {
            card.add_item(&format!("goal {}", i), None).unwrap();
        }
        let positions_before: Vec<_> = card.items().map(|i| i.position()).collect();
        let mut contents_before = card.contents().into_iter().map(String::from).collect::<Vec<_>>();

        let mut rng = StdRng::seed_from_u64(7);
        card.shuffle(&mut rng).unwrap();

        let positions_after: Vec<_> = card.items().map(|i| i.position()).collect();
        let mut contents_after = card.contents().into_iter().map(String::from).collect::<Vec<_>>();
        contents_before.sort();
        contents_after.sort();

        assert_eq!(positions_before, positions_after);
        assert_eq!(contents_before, contents_after);
        assert!(card.item_at(12).is_none());
    }

    #[test]
    fn swap_exchanges_item_with_empty_cell() {
        let mut card = draft(3, true);
        card.add_item("a", Some(0)).unwrap();
        card.swap(0, 8).unwrap();

        assert!(card.item_at(0).is_none());
        assert_eq!(card.item_at(8).unwrap().content(), "a");
    }

    #[test]
    fn swap_rejects_free_cell() {
        let mut card = draft(3, true);
        card.add_item("a", Some(0)).unwrap();
        assert!(matches!(
            card.swap(0, 4),
            Err(CardError::InvalidPosition { position: 4 })
        ));
    }

    #[test]
    fn swap_with_itself_is_noop() {
        let mut card = draft(3, true);
        card.add_item("a", Some(0)).unwrap();
        let version = card.version();
        card.swap(0, 0).unwrap();
        assert_eq!(card.version(), version);
        assert_eq!(card.item_at(0).unwrap().content(), "a");
    }

    // ─── Config updates ──────────────────────────────────────────────────────

    #[test]
    fn update_config_shrink_relocates_displaced_items() {
        let mut card = draft(5, true);
        card.add_item("keep", Some(1)).unwrap();
        card.add_item("move", Some(20)).unwrap();

        card.update_config(GridUpdate {
            size: Some(GridSize::new(3).unwrap()),
            ..GridUpdate::default()
        })
        .unwrap();

        assert_eq!(card.grid().size().get(), 3);
        assert_eq!(card.grid().free_position(), Some(4));
        assert_eq!(card.item_at(1).unwrap().content(), "keep");
        assert_eq!(card.item_at(0).unwrap().content(), "move");
    }

    #[test]
    fn update_config_enabling_free_displaces_occupant() {
        let mut card = draft(3, false);
        card.add_item("center", Some(4)).unwrap();

        card.update_config(GridUpdate {
            has_free_space: Some(true),
            ..GridUpdate::default()
        })
        .unwrap();

        assert!(card.item_at(4).is_none());
        assert_eq!(card.item_at(0).unwrap().content(), "center");
    }

    #[test]
    fn update_config_enabling_free_on_full_grid_fails() {
        let mut card = filled(3, false);
        assert_eq!(
            card.update_config(GridUpdate {
                has_free_space: Some(true),
                ..GridUpdate::default()
            }),
            Err(CardError::NoSpaceForFree)
        );
        assert!(!card.grid().has_free_space());
    }

    #[test]
    fn update_config_shrinking_below_item_count_fails() {
        let mut card = filled(4, false);
        assert!(matches!(
            card.update_config(GridUpdate {
                size: Some(GridSize::new(2).unwrap()),
                ..GridUpdate::default()
            }),
            Err(CardError::GridTooSmall {
                item_count: 16,
                usable_slots: 4
            })
        ));
    }

    #[test]
    fn update_config_sets_and_clears_header() {
        let mut card = draft(3, true);
        card.update_config(GridUpdate {
            header_text: Some(Some(" GOALS ".to_string())),
            ..GridUpdate::default()
        })
        .unwrap();
        assert_eq!(card.grid().header_text(), Some("GOALS"));

        card.update_config(GridUpdate::default()).unwrap();
        assert_eq!(card.grid().header_text(), Some("GOALS"));

        card.update_config(GridUpdate {
            header_text: Some(None),
            ..GridUpdate::default()
        })
        .unwrap();
        assert_eq!(card.grid().header_text(), None);
    }

    // ─── Finalize ────────────────────────────────────────────────────────────

    #[test]
    fn finalize_requires_full_grid() {
        let mut card = draft(2, true);
        card.add_item("a", None).unwrap();

        assert_eq!(
            card.finalize(None),
            Err(CardError::IncompleteGrid {
                missing_positions: vec![2, 3]
            })
        );
        assert_eq!(card.status(), CardStatus::Draft);
    }

    #[test]
    fn finalize_sets_visibility() {
        let mut card = filled(3, true);
        card.finalize(Some(true)).unwrap();
        assert!(card.is_finalized());
        assert!(card.visible_to_friends());
    }

    #[test]
    fn finalize_is_one_way() {
        let mut card = finalized(3, true);
        assert_eq!(card.finalize(None), Err(CardError::CardFinalized));
        assert_eq!(card.add_item("x", None), Err(CardError::CardFinalized));
        assert_eq!(card.remove_item(0), Err(CardError::CardFinalized));
        assert_eq!(card.swap(0, 1), Err(CardError::CardFinalized));
        assert_eq!(
            card.update_item(0, Some("x"), None),
            Err(CardError::CardFinalized)
        );
        assert_eq!(
            card.update_config(GridUpdate::default()),
            Err(CardError::CardFinalized)
        );
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(card.shuffle(&mut rng), Err(CardError::CardFinalized));
    }

    // ─── Progress ────────────────────────────────────────────────────────────

    #[test]
    fn progress_requires_finalized() {
        let mut card = filled(3, true);
        assert_eq!(
            card.complete_item(0, None, None),
            Err(CardError::CardNotFinalized)
        );
        assert_eq!(card.uncomplete_item(0), Err(CardError::CardNotFinalized));
        assert_eq!(card.update_notes(0, None), Err(CardError::CardNotFinalized));
    }

    #[test]
    fn complete_and_uncomplete_item() {
        let mut card = finalized(3, true);
        card.complete_item(0, Some("done".to_string()), None).unwrap();
        assert!(card.item_at(0).unwrap().is_completed());

        card.uncomplete_item(0).unwrap();
        let item = card.item_at(0).unwrap();
        assert!(!item.is_completed());
        assert_eq!(item.notes(), Some("done"));
    }

    #[test]
    fn update_notes_none_clears() {
        let mut card = finalized(3, true);
        card.update_notes(1, Some("halfway".to_string())).unwrap();
        assert_eq!(card.item_at(1).unwrap().notes(), Some("halfway"));
        card.update_notes(1, None).unwrap();
        assert_eq!(card.item_at(1).unwrap().notes(), None);
    }

    #[test]
    fn complete_missing_item_fails() {
        let mut card = finalized(3, true);
        assert_eq!(
            card.complete_item(4, None, None),
            Err(CardError::ItemNotFound { position: 4 })
        );
    }

    // ─── Archive / visibility / meta ─────────────────────────────────────────

    #[test]
    fn archive_requires_finalized_and_is_not_repeatable() {
        let mut card = filled(3, true);
        assert_eq!(card.archive(), Err(CardError::CardNotFinalized));

        card.finalize(None).unwrap();
        card.archive().unwrap();
        assert!(card.is_archived());
        assert_eq!(card.archive(), Err(CardError::AlreadyArchived));
    }

    #[test]
    fn archived_card_accepts_progress() {
        let mut card = finalized(3, true);
        card.archive().unwrap();
        card.complete_item(0, None, None).unwrap();
        assert!(card.item_at(0).unwrap().is_completed());
    }

    #[test]
    fn can_view_respects_sharing() {
        let stranger = UserId::new("stranger").unwrap();
        let mut card = finalized(3, true);
        assert!(card.can_view(&owner()));
        assert!(!card.can_view(&stranger));

        card.set_visibility(true);
        assert!(card.can_view(&stranger));
        assert!(card.authorize(&stranger).is_err());
    }

    #[test]
    fn update_meta_replaces_title_and_category() {
        let mut card = finalized(3, true);
        card.update_meta(Some("  Big year ".to_string()), Some(CardCategory::Travel))
            .unwrap();
        assert_eq!(card.title(), Some("Big year"));
        assert_eq!(card.category(), Some(CardCategory::Travel));

        card.update_meta(None, None).unwrap();
        assert_eq!(card.title(), None);
    }

    #[test]
    fn authorize_maps_to_forbidden() {
        let card = draft(3, true);
        let other = UserId::new("other").unwrap();
        assert_eq!(card.authorize(&other), Err(CardError::Forbidden));
        assert!(card.authorize(&owner()).is_ok());
    }

    // ─── Properties ──────────────────────────────────────────────────────────

    // ─────────────────────────────────────────────────────────────────────────
    // Reconstitution
    // ─────────────────────────────────────────────────────────────────────────

    fn rebuild(
        card: &Card,
        items: Vec<CardItem>,
        status: CardStatus,
        archived: bool,
    ) -> Result<Card, CardError> {
        Card::reconstitute(
            *card.id(),
            card.owner_id().clone(),
            card.year(),
            card.title().map(String::from),
            card.category(),
            card.grid().clone(),
            items,
            status,
            archived,
            card.visible_to_friends(),
            card.version(),
            *card.created_at(),
            *card.updated_at(),
        )
    }

    fn item(position: Position) -> CardItem {
        CardItem::new(position, "goal").unwrap()
    }

    #[test]
    fn reconstitute_accepts_a_consistent_card() {
        let mut card = filled(3, true);
        card.finalize(None).unwrap();
        card.archive().unwrap();
        let items = card.items().cloned().collect();

        let rebuilt = rebuild(&card, items, CardStatus::Finalized, true).unwrap();
        assert_eq!(rebuilt, card);
    }

    #[test]
    fn reconstitute_rejects_items_off_the_grid() {
        let card = draft(3, true);
        assert_eq!(
            rebuild(&card, vec![item(12)], CardStatus::Draft, false),
            Err(CardError::InvalidPosition { position: 12 })
        );
        assert_eq!(
            rebuild(&card, vec![item(4)], CardStatus::Draft, false),
            Err(CardError::InvalidPosition { position: 4 })
        );
    }

    #[test]
    fn reconstitute_rejects_shared_positions() {
        let card = draft(3, true);
        assert_eq!(
            rebuild(&card, vec![item(1), item(1)], CardStatus::Draft, false),
            Err(CardError::PositionOccupied { position: 1 })
        );
    }

    #[test]
    fn reconstitute_rejects_inconsistent_status() {
        let card = draft(2, false);
        assert!(matches!(
            rebuild(&card, vec![item(0)], CardStatus::Finalized, false),
            Err(CardError::IncompleteGrid { .. })
        ));
        assert_eq!(
            rebuild(&card, Vec::new(), CardStatus::Draft, true),
            Err(CardError::CardNotFinalized)
        );
    }

    #[test]
    fn deserialize_rejects_card_that_breaks_invariants() {
        let mut card = filled(2, false);
        card.finalize(None).unwrap();
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(serde_json::from_value::<Card>(json.clone()).unwrap(), card);

        let mut unfinished = json.clone();
        unfinished["items"].as_object_mut().unwrap().remove("3");
        assert!(serde_json::from_value::<Card>(unfinished).is_err());

        let mut mislabeled = json.clone();
        let moved = mislabeled["items"]["0"].clone();
        mislabeled["items"].as_object_mut().unwrap().insert("9".to_string(), moved);
        assert!(serde_json::from_value::<Card>(mislabeled).is_err());

        let mut blank_title = json;
        blank_title["title"] = serde_json::Value::String("   ".to_string());
        assert!(serde_json::from_value::<Card>(blank_title).is_err());
    }

    proptest! {
        #[test]
        fn finalize_succeeds_iff_full(size in 2u8..=5, free in any::<bool>(), fill in 0usize..=25) {
            let mut card = draft(size, free);
            let target = fill.min(card.grid().usable_slots());
            for i in 0..target {
                card.add_item(&format!("g{}", i), None).unwrap();
            }
            let full = target == card.grid().usable_slots();
            prop_assert_eq!(card.finalize(None).is_ok(), full);
        }

        #[test]
        fn card_full_exactly_when_saturated(size in 2u8..=5, free in any::<bool>()) {
            let mut card = draft(size, free);
            let usable = card.grid().usable_slots();
            for i in 0..usable {
                let added = card.add_item(&format!("g{}", i), None);
                prop_assert!(added.is_ok());
            }
            let is_card_full = matches!(card.add_item("extra", None), Err(CardError::CardFull { .. }));
            prop_assert!(is_card_full);
        }

        #[test]
        fn shuffle_never_touches_free_cell(seed in any::<u64>(), count in 0usize..=24) {
            let mut card = draft(5, true);
            for i in 0..count {
                card.add_item(&format!("g{}", i), None).unwrap();
            }
            let mut before: Vec<String> = card.contents().into_iter().map(String::from).collect();
            let mut rng = StdRng::seed_from_u64(seed);
            card.shuffle(&mut rng).unwrap();

            prop_assert!(card.item_at(12).is_none());
            let mut after: Vec<String> = card.contents().into_iter().map(String::from).collect();
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
        }
    }
}
