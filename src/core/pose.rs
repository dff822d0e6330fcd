//! Map origin pose.

use serde::{Deserialize, Serialize};

/// A 2D pose anchoring the lower-left corner of a map in world coordinates.
///
/// Unlike a robot pose the yaw is kept exactly as configured (no angle
/// normalization) so it survives a YAML round-trip unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in meters.
    pub x: f64,
    /// Y position in meters.
    pub y: f64,
    /// Rotation in radians, CCW positive from X-axis.
    pub yaw: f64,
}

impl Pose2D {
    /// Create a new pose.
    #[inline]
    pub const fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    /// Pose at the world origin with zero yaw.
    #[inline]
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Pose as the `[x, y, yaw]` triple used by map YAML files.
    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.yaw]
    }
}

impl From<[f64; 3]> for Pose2D {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}
