//! Grid geometry: size, FREE cell placement, position mapping and lines.
//!
//! Positions are row-major indices into an NxN board:
//! `row = pos / size`, `col = pos % size`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::CardError;

/// Index of a cell on the board, row-major.
pub type Position = u8;

/// Smallest supported board edge.
pub const MIN_GRID_SIZE: u8 = 2;

/// Largest supported board edge.
pub const MAX_GRID_SIZE: u8 = 5;

/// Board edge used when the caller does not choose one.
pub const DEFAULT_GRID_SIZE: u8 = 5;

/// Maximum length (in characters) for the cosmetic header label.
pub const MAX_HEADER_LENGTH: usize = 20;

/// Edge length of a square board, restricted to 2..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GridSize(u8);

impl GridSize {
    /// Creates a grid size, rejecting anything outside 2..=5.
    pub fn new(size: u8) -> Result<Self, CardError> {
        if (MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&size) {
            Ok(Self(size))
        } else {
            Err(CardError::InvalidGridSize(size))
        }
    }

    /// Returns the edge length.
    pub fn get(&self) -> u8 {
        self.0
    }

    /// Total number of cells (size²).
    pub fn cell_count(&self) -> usize {
        usize::from(self.0) * usize::from(self.0)
    }

    /// Where the FREE cell goes on a board of this size.
    ///
    /// Odd sizes use the true centre. Even sizes have no centre cell, so the
    /// upper-left cell of the central 2x2 block is used.
    pub fn free_position(&self) -> Position {
        let n = self.0;
        if n % 2 == 1 {
            (n * n) / 2
        } else {
            let mid = n / 2 - 1;
            mid * n + mid
        }
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self(DEFAULT_GRID_SIZE)
    }
}

impl TryFrom<u8> for GridSize {
    type Error = CardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        GridSize::new(value)
    }
}

impl From<GridSize> for u8 {
    fn from(size: GridSize) -> Self {
        size.0
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.0, self.0)
    }
}

/// Which line of the board a set of positions forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum LineKind {
    Row(u8),
    Column(u8),
    /// Top-left to bottom-right.
    Diagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
}

/// A complete row, column or diagonal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub positions: Vec<Position>,
}

/// Validated grid shape.
///
/// # Invariants
///
/// - `free_position`, when present, is inside the board
/// - `header_text`, when present, is trimmed and 1..=20 characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridConfigRecord")]
pub struct GridConfig {
    size: GridSize,
    free_position: Option<Position>,
    header_text: Option<String>,
}

impl GridConfig {
    /// Creates a grid config with the FREE cell at its standard slot.
    pub fn new(
        size: GridSize,
        has_free_space: bool,
        header_text: Option<String>,
    ) -> Result<Self, CardError> {
        Ok(Self {
            size,
            free_position: has_free_space.then(|| size.free_position()),
            header_text: normalize_header(header_text)?,
        })
    }

    /// Rebuilds a config from persisted values, re-checking every invariant.
    pub fn reconstitute(
        size: GridSize,
        free_position: Option<Position>,
        header_text: Option<String>,
    ) -> Result<Self, CardError> {
        if let Some(pos) = free_position {
            if usize::from(pos) >= size.cell_count() {
                return Err(CardError::InvalidPosition { position: pos });
            }
        }
        if let Some(header) = header_text.as_deref() {
            if normalize_header(Some(header.to_string()))?.as_deref() != Some(header) {
                return Err(CardError::InvalidHeader(
                    "header must be trimmed".to_string(),
                ));
            }
        }
        Ok(Self {
            size,
            free_position,
            header_text,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn has_free_space(&self) -> bool {
        self.free_position.is_some()
    }

    pub fn free_position(&self) -> Option<Position> {
        self.free_position
    }

    pub fn header_text(&self) -> Option<&str> {
        self.header_text.as_deref()
    }

    /// size²
    pub fn total_positions(&self) -> usize {
        self.size.cell_count()
    }

    /// size² minus the FREE cell, if any.
    pub fn usable_slots(&self) -> usize {
        self.total_positions() - usize::from(self.has_free_space())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Position queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_in_range(&self, position: Position) -> bool {
        usize::from(position) < self.total_positions()
    }

    pub fn is_free(&self, position: Position) -> bool {
        self.free_position == Some(position)
    }

    /// True if an item may be placed at `position`.
    pub fn is_usable(&self, position: Position) -> bool {
        self.is_in_range(position) && !self.is_free(position)
    }

    /// Validates that an item may be placed at `position`.
    pub fn check_usable(&self, position: Position) -> Result<(), CardError> {
        if self.is_usable(position) {
            Ok(())
        } else {
            Err(CardError::InvalidPosition { position })
        }
    }

    /// All usable positions in ascending order.
    pub fn usable_positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.total_positions())
            .map(|p| p as Position)
            .filter(move |p| !self.is_free(*p))
    }

    /// Maps a position to `(row, col)`.
    pub fn row_col(&self, position: Position) -> (u8, u8) {
        let n = self.size.get();
        (position / n, position % n)
    }

    /// Maps `(row, col)` back to a position.
    pub fn position_at(&self, row: u8, col: u8) -> Position {
        row * self.size.get() + col
    }

    /// Every row, every column, then both diagonals.
    pub fn lines(&self) -> Vec<Line> {
        let n = self.size.get();
        let mut lines = Vec::with_capacity(usize::from(n) * 2 + 2);

        for row in 0..n {
            lines.push(Line {
                kind: LineKind::Row(row),
                positions: (0..n).map(|col| self.position_at(row, col)).collect(),
            });
        }
        for col in 0..n {
            lines.push(Line {
                kind: LineKind::Column(col),
                positions: (0..n).map(|row| self.position_at(row, col)).collect(),
            });
        }
        lines.push(Line {
            kind: LineKind::Diagonal,
            positions: (0..n).map(|i| self.position_at(i, i)).collect(),
        });
        lines.push(Line {
            kind: LineKind::AntiDiagonal,
            positions: (0..n).map(|i| self.position_at(i, n - 1 - i)).collect(),
        });

        lines
    }
}

/// Wire shape of [`GridConfig`]; deserialization goes through
/// [`GridConfig::reconstitute`].
#[derive(Deserialize)]
struct GridConfigRecord {
    size: GridSize,
    free_position: Option<Position>,
    header_text: Option<String>,
}

impl TryFrom<GridConfigRecord> for GridConfig {
    type Error = CardError;

    fn try_from(record: GridConfigRecord) -> Result<Self, Self::Error> {
        GridConfig::reconstitute(record.size, record.free_position, record.header_text)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        let size = GridSize::default();
        Self {
            size,
            free_position: Some(size.free_position()),
            header_text: None,
        }
    }
}

/// Trims a header label and enforces its length bound.
pub fn normalize_header(header: Option<String>) -> Result<Option<String>, CardError> {
    let Some(raw) = header else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CardError::InvalidHeader("header cannot be blank".to_string()));
    }
    let len = trimmed.chars().count();
    if len > MAX_HEADER_LENGTH {
        return Err(CardError::InvalidHeader(format!(
            "header must be {} characters or less, got {}",
            MAX_HEADER_LENGTH, len
        )));
    }
    Ok(Some(trimmed.to_string()))
}
