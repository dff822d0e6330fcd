//! Core value types shared by the codec, the server and the capture flow.
//!
//! All map geometry follows the ROS map_server convention:
//! - Cell (0, 0) is the **bottom-left** cell of the grid
//! - [`MapMetaData::origin`] is the world pose of that cell's corner
//! - Cells are stored row-major, bottom row first
//!
//! ## Type Categories
//!
//! - [`Pose2D`]: Origin pose (x, y, yaw) of a map
//! - [`CellState`]: Trinary occupancy (Occupied / Free / Unknown)
//! - [`OccupancyGrid`]: Immutable grid value with [`Header`] and [`MapMetaData`]
//! - [`CellCounts`]: Per-state cell statistics

mod cell;
mod grid;
mod pose;

pub use cell::CellState;
pub use grid::{CellCounts, DEFAULT_FRAME_ID, Header, MapMetaData, OccupancyGrid, now_us};
pub use pose::Pose2D;
