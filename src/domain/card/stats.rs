//! Progress statistics and bingo line detection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{CardItem, GridConfig, LineKind, Position};

/// Progress snapshot for a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardStats {
    pub total_items: usize,
    pub completed_items: usize,
    /// `completed_items / total_items`, 0.0 for an empty card.
    pub completion_ratio: f64,
    pub bingo_count: usize,
    pub completed_lines: Vec<LineKind>,
}

impl CardStats {
    pub fn compute(grid: &GridConfig, items: &BTreeMap<Position, CardItem>) -> Self {
        let total_items = items.len();
        let completed_items = items.values().filter(|i| i.is_completed()).count();
        let completion_ratio = if total_items == 0 {
            0.0
        } else {
            completed_items as f64 / total_items as f64
        };

        let completed_lines = completed_lines(grid, |pos| {
            items.get(&pos).is_some_and(CardItem::is_completed)
        });

        Self {
            total_items,
            completed_items,
            completion_ratio,
            bingo_count: completed_lines.len(),
            completed_lines,
        }
    }
}

/// Lines whose every cell is either the FREE cell or satisfies `is_complete`.
pub fn completed_lines<F>(grid: &GridConfig, is_complete: F) -> Vec<LineKind>
where
    F: Fn(Position) -> bool,
{
    grid.lines()
        .into_iter()
        .filter(|line| {
            line.positions
                .iter()
                .all(|&pos| grid.is_free(pos) || is_complete(pos))
        })
        .map(|line| line.kind)
        .collect()
}
