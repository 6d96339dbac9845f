use core::fmt;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::NEUMANN_OFFSETS;

/// A `(row, col)` cell coordinate. Positions are unsigned, so a [Position] is never
/// left of or above the grid; the lower and right bounds are checked by the owning
/// [Grid](crate::grid::Grid).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Position {
        Position { row, col }
    }

    pub fn manhattan_distance(&self, other: &Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Applies a signed offset, returning [None] if the result would leave the first quadrant.
    pub fn offset(&self, d_row: isize, d_col: isize) -> Option<Position> {
        Some(Position {
            row: self.row.checked_add_signed(d_row)?,
            col: self.col.checked_add_signed(d_col)?,
        })
    }

    /// The von Neumann neighbourhood in the fixed order up, down, left, right. Neighbours
    /// with a negative coordinate are skipped; upper bounds are left to the caller.
    pub fn neumann_neighborhood(&self) -> SmallVec<[Position; 4]> {
        NEUMANN_OFFSETS
            .iter()
            .filter_map(|&(d_row, d_col)| self.offset(d_row, d_col))
            .collect()
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Position::new(row, col)
    }
}

impl From<[usize; 2]> for Position {
    fn from([row, col]: [usize; 2]) -> Self {
        Position::new(row, col)
    }
}

impl From<Position> for [usize; 2] {
    fn from(p: Position) -> Self {
        [p.row, p.col]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
