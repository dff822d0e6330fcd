//! Decode configuration.

use super::defaults::{DEFAULT_FREE_THRESH, DEFAULT_NEGATE, DEFAULT_OCCUPIED_THRESH};
use crate::core::{DEFAULT_FRAME_ID, Pose2D};
use crate::error::ConfigError;

/// Check that both thresholds lie in (0, 1) and `free < occupied`.
pub fn validate_thresholds(occupied_thresh: f64, free_thresh: f64) -> Result<(), ConfigError> {
    let in_range = |t: f64| t > 0.0 && t < 1.0;
    if !in_range(occupied_thresh) || !in_range(free_thresh) || free_thresh >= occupied_thresh {
        return Err(ConfigError::InvalidThreshold {
            occupied: occupied_thresh,
            free: free_thresh,
        });
    }
    Ok(())
}

/// Check that the resolution is positive and finite.
pub fn validate_resolution(resolution: f64) -> Result<(), ConfigError> {
    if !(resolution.is_finite() && resolution > 0.0) {
        return Err(ConfigError::InvalidResolution(resolution));
    }
    Ok(())
}

/// Parameters for turning a raster into an occupancy grid.
///
/// `negate` and the thresholds only steer the per-pixel classification;
/// they are not stored in the decoded grid.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeConfig {
    /// Meters per pixel.
    pub resolution: f64,
    /// Treat darker pixels as free instead of occupied.
    pub negate: bool,
    /// Occupancy probability above which a cell is occupied.
    pub occupied_thresh: f64,
    /// Occupancy probability below which a cell is free.
    pub free_thresh: f64,
    /// World pose of the lower-left pixel.
    pub origin: Pose2D,
    /// Frame id stamped on the decoded grid.
    pub frame_id: String,
}

impl DecodeConfig {
    /// Config with the given resolution and defaults for everything else.
    pub fn new(resolution: f64) -> Self {
        Self {
            resolution,
            negate: DEFAULT_NEGATE,
            occupied_thresh: DEFAULT_OCCUPIED_THRESH,
            free_thresh: DEFAULT_FREE_THRESH,
            origin: Pose2D::identity(),
            frame_id: DEFAULT_FRAME_ID.to_string(),
        }
    }

    /// Set the negate flag.
    pub fn with_negate(mut self, negate: bool) -> Self {
        self.negate = negate;
        self
    }

    /// Set both thresholds.
    pub fn with_thresholds(mut self, occupied_thresh: f64, free_thresh: f64) -> Self {
        self.occupied_thresh = occupied_thresh;
        self.free_thresh = free_thresh;
        self
    }

    /// Set the origin pose.
    pub fn with_origin(mut self, origin: Pose2D) -> Self {
        self.origin = origin;
        self
    }

    /// Set the frame id.
    pub fn with_frame_id(mut self, frame_id: impl Into<String>) -> Self {
        self.frame_id = frame_id.into();
        self
    }

    /// Validate resolution and thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_resolution(self.resolution)?;
        validate_thresholds(self.occupied_thresh, self.free_thresh)
    }
}
