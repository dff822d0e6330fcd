//! Immutable occupancy grid value.
//!
//! An [`OccupancyGrid`] is never mutated after construction. Whoever needs a
//! different grid builds a new value; the server swaps whole values, so a
//! reader holding an `Arc<OccupancyGrid>` always sees one consistent map.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::cell::CellState;
use super::pose::Pose2D;
use crate::error::DecodeError;

/// Frame id attached to served maps unless configured otherwise.
pub const DEFAULT_FRAME_ID: &str = "map";

/// Current wall-clock time in microseconds since the Unix epoch.
pub fn now_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Message header carried by served grids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Coordinate frame of the map.
    pub frame_id: String,
    /// Time the grid was loaded into the server (microseconds, 0 = never).
    pub stamp_us: u64,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            frame_id: DEFAULT_FRAME_ID.to_string(),
            stamp_us: 0,
        }
    }
}

/// Geometry of a grid without its cells.
///
/// Published on the metadata channel as a lightweight change notification.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapMetaData {
    /// Time the grid was loaded (microseconds since epoch, 0 = not loaded yet).
    pub map_load_time_us: u64,
    /// Meters per cell edge.
    pub resolution: f64,
    /// Cells along X.
    pub width: u32,
    /// Cells along Y.
    pub height: u32,
    /// World pose of the lower-left cell.
    pub origin: Pose2D,
}

impl MapMetaData {
    /// Metadata for a grid that has not been loaded by a server yet.
    pub fn new(width: u32, height: u32, resolution: f64, origin: Pose2D) -> Self {
        Self {
            map_load_time_us: 0,
            resolution,
            width,
            height,
            origin,
        }
    }

    /// Number of cells described by this metadata.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Cell counts by state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCounts {
    /// Free cells.
    pub free: usize,
    /// Occupied cells.
    pub occupied: usize,
    /// Unknown cells.
    pub unknown: usize,
}

impl CellCounts {
    /// Total classified cells.
    pub fn known(&self) -> usize {
        self.free + self.occupied
    }

    /// Total cells.
    pub fn total(&self) -> usize {
        self.known() + self.unknown
    }
}

/// 2D occupancy grid.
///
/// Row-major storage starting at the bottom-left cell:
/// `index = y * width + x`, with `y = 0` being the bottom row.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyGrid {
    header: Header,
    info: MapMetaData,
    cells: Arc<[CellState]>,
}

impl OccupancyGrid {
    /// Build a grid from metadata and cells.
    ///
    /// Fails with [`DecodeError::DimensionMismatch`] unless
    /// `cells.len() == width * height` and both dimensions are positive.
    pub fn new(info: MapMetaData, cells: Vec<CellState>) -> Result<Self, DecodeError> {
        if info.width == 0 || info.height == 0 || cells.len() != info.cell_count() {
            return Err(DecodeError::DimensionMismatch {
                width: info.width,
                height: info.height,
                channels: 1,
                samples: cells.len(),
            });
        }

        Ok(Self {
            header: Header::default(),
            info,
            cells: cells.into(),
        })
    }

    /// Copy of this grid with a new frame id.
    pub fn with_frame_id(&self, frame_id: &str) -> Self {
        Self {
            header: Header {
                frame_id: frame_id.to_string(),
                stamp_us: self.header.stamp_us,
            },
            info: self.info,
            cells: Arc::clone(&self.cells),
        }
    }

    /// Copy of this grid stamped as loaded at `stamp_us` in `frame_id`.
    ///
    /// Cells are shared with `self`, not copied.
    pub fn stamped(&self, frame_id: &str, stamp_us: u64) -> Self {
        Self {
            header: Header {
                frame_id: frame_id.to_string(),
                stamp_us,
            },
            info: MapMetaData {
                map_load_time_us: stamp_us,
                ..self.info
            },
            cells: Arc::clone(&self.cells),
        }
    }

    /// Message header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Coordinate frame id.
    pub fn frame_id(&self) -> &str {
        &self.header.frame_id
    }

    /// Grid geometry.
    pub fn info(&self) -> &MapMetaData {
        &self.info
    }

    /// Grid width in cells.
    pub fn width(&self) -> u32 {
        self.info.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> u32 {
        self.info.height
    }

    /// Resolution in meters per cell.
    pub fn resolution(&self) -> f64 {
        self.info.resolution
    }

    /// World pose of the lower-left cell.
    pub fn origin(&self) -> Pose2D {
        self.info.origin
    }

    /// All cells, bottom row first.
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// Cells as wire values (100 / 0 / -1).
    pub fn data(&self) -> Vec<i8> {
        self.cells.iter().map(|c| c.value()).collect()
    }

    /// Index of cell `(x, y)` in [`cells`](Self::cells).
    #[inline]
    pub fn cell_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.info.width as usize + x as usize
    }

    /// State of cell `(x, y)`, `None` outside the grid.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<CellState> {
        if x < self.info.width && y < self.info.height {
            Some(self.cells[self.cell_index(x, y)])
        } else {
            None
        }
    }

    /// World coordinates of the center of cell `(x, y)`.
    ///
    /// The origin yaw is not applied, matching how map consumers index grids.
    pub fn cell_to_world(&self, x: u32, y: u32) -> (f64, f64) {
        let res = self.info.resolution;
        (
            self.info.origin.x + (x as f64 + 0.5) * res,
            self.info.origin.y + (y as f64 + 0.5) * res,
        )
    }

    /// Text rendering, top row first, one [`CellState::as_char`] per cell.
    pub fn to_ascii(&self) -> String {
        let width = self.info.width as usize;
        let mut out = String::with_capacity((width + 1) * self.info.height as usize);
        for row in self.cells.chunks(width).rev() {
            out.extend(row.iter().map(|c| c.as_char()));
            out.push('\n');
        }
        out
    }

    /// Count cells by state.
    pub fn count_cells(&self) -> CellCounts {
        let mut counts = CellCounts::default();
        for cell in self.cells.iter() {
            match cell {
                CellState::Free => counts.free += 1,
                CellState::Occupied => counts.occupied += 1,
                CellState::Unknown => counts.unknown += 1,
            }
        }
        counts
    }
}
