//! Trinary occupancy state of a grid cell.

use serde::{Deserialize, Serialize};

/// Occupancy state of a single cell.
///
/// The numeric values are the ones carried on the wire by occupancy grid
/// messages: `100` occupied, `0` free, `-1` unknown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i8)]
pub enum CellState {
    /// Traversable cell
    Free = 0,

    /// Obstacle
    Occupied = 100,

    /// Neither threshold was crossed
    #[default]
    Unknown = -1,
}

impl CellState {
    /// Wire value of this state.
    #[inline]
    pub fn value(self) -> i8 {
        self as i8
    }

    /// Single character representation for debugging
    pub fn as_char(self) -> char {
        match self {
            CellState::Free => '.',
            CellState::Occupied => '#',
            CellState::Unknown => '?',
        }
    }
}
