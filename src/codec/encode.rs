//! Grid-to-image encoder.

use super::raster::Raster;
use super::threshold::{intensity_to_sample, state_to_intensity};
use crate::config::{
    DEFAULT_FREE_THRESH, DEFAULT_NEGATE, DEFAULT_OCCUPIED_THRESH, MapYaml, validate_thresholds,
};
use crate::core::OccupancyGrid;
use crate::error::ConfigError;

/// Encoded map: single-channel raster plus the sidecar record.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedMap {
    /// Gray raster, top row first.
    pub raster: Raster,
    /// Sidecar metadata. `image` is left empty for the caller to fill in.
    pub yaml: MapYaml,
}

/// Turns grids into rasters.
///
/// The negate flag and thresholds are recorded in the sidecar so the saved
/// image decodes back to the same occupied/free cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapEncoder {
    /// Write occupied cells white and free cells black.
    pub negate: bool,
    /// Occupied threshold recorded in the sidecar.
    pub occupied_thresh: f64,
    /// Free threshold recorded in the sidecar.
    pub free_thresh: f64,
}

impl Default for MapEncoder {
    fn default() -> Self {
        Self {
            negate: DEFAULT_NEGATE,
            occupied_thresh: DEFAULT_OCCUPIED_THRESH,
            free_thresh: DEFAULT_FREE_THRESH,
        }
    }
}

impl MapEncoder {
    /// Create an encoder with explicit settings.
    pub fn new(negate: bool, occupied_thresh: f64, free_thresh: f64) -> Self {
        Self {
            negate,
            occupied_thresh,
            free_thresh,
        }
    }

    /// Check that the recorded thresholds could be loaded back.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_thresholds(self.occupied_thresh, self.free_thresh)
    }

    /// Encode a grid.
    pub fn encode(&self, grid: &OccupancyGrid) -> EncodedMap {
        let width = grid.width();
        let height = grid.height();

        // Grid row height-1-r becomes image row r
        let raster = Raster::from_fn_gray(width, height, |x, r| {
            let state = grid.cells()[grid.cell_index(x, height - 1 - r)];
            intensity_to_sample(state_to_intensity(state, self.negate))
        });

        let yaml = MapYaml {
            image: String::new(),
            resolution: grid.resolution(),
            origin: grid.origin().to_array(),
            negate: self.negate,
            occupied_thresh: self.occupied_thresh,
            free_thresh: self.free_thresh,
            mode: None,
        };

        EncodedMap { raster, yaml }
    }
}
