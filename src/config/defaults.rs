//! Default values for serde deserialization.

/// Occupied threshold used when none is configured.
pub const DEFAULT_OCCUPIED_THRESH: f64 = 0.65;

/// Free threshold used when none is configured.
pub const DEFAULT_FREE_THRESH: f64 = 0.1;

/// Negate flag used when none is configured.
pub const DEFAULT_NEGATE: bool = false;

pub fn occupied_thresh() -> f64 {
    DEFAULT_OCCUPIED_THRESH
}

pub fn free_thresh() -> f64 {
    DEFAULT_FREE_THRESH
}

pub fn origin() -> [f64; 3] {
    [0.0, 0.0, 0.0]
}

pub fn frame_id() -> String {
    crate::core::DEFAULT_FRAME_ID.to_string()
}

pub fn wait_timeout_ms() -> u64 {
    0
}
