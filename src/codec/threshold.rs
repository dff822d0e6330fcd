//! Per-pixel threshold codec.
//!
//! ```text
//! occ = negate ? intensity : 1 - intensity
//!
//! occ >  occupied_thresh  → Occupied
//! occ <  free_thresh      → Free
//! otherwise               → Unknown   (equality on either side included)
//! ```

use crate::core::CellState;

/// Intensity of an unknown cell (mid-gray).
pub const UNKNOWN_INTENSITY: f64 = 0.5;

/// Classify one pixel intensity in [0, 1].
#[inline]
pub fn pixel_to_state(
    intensity: f64,
    negate: bool,
    occupied_thresh: f64,
    free_thresh: f64,
) -> CellState {
    let occ = if negate { intensity } else { 1.0 - intensity };

    if occ > occupied_thresh {
        CellState::Occupied
    } else if occ < free_thresh {
        CellState::Free
    } else {
        CellState::Unknown
    }
}

/// Intensity in [0, 1] that decodes back to `state` under the same `negate`.
///
/// Unknown maps to mid-gray, which any sane threshold pair classifies as
/// unknown again.
#[inline]
pub fn state_to_intensity(state: CellState, negate: bool) -> f64 {
    match (state, negate) {
        (CellState::Occupied, false) => 0.0,
        (CellState::Occupied, true) => 1.0,
        (CellState::Free, false) => 1.0,
        (CellState::Free, true) => 0.0,
        (CellState::Unknown, _) => UNKNOWN_INTENSITY,
    }
}

/// 8-bit sample value (possibly a channel average) to intensity.
#[inline]
pub fn sample_to_intensity(sample: f64) -> f64 {
    sample / 255.0
}

/// Intensity to the nearest 8-bit sample.
#[inline]
pub fn intensity_to_sample(intensity: f64) -> u8 {
    (intensity * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_is_free_black_is_occupied() {
        assert_eq!(pixel_to_state(1.0, false, 0.65, 0.1), CellState::Free);
        assert_eq!(pixel_to_state(0.0, false, 0.65, 0.1), CellState::Occupied);
        assert_eq!(pixel_to_state(0.5, false, 0.65, 0.1), CellState::Unknown);
    }

    #[test]
    fn test_negate_inverts_polarity() {
        assert_eq!(pixel_to_state(1.0, true, 0.65, 0.1), CellState::Occupied);
        assert_eq!(pixel_to_state(0.0, true, 0.65, 0.1), CellState::Free);
    }

    #[test]
    fn test_equal_to_occupied_thresh_is_unknown() {
        // occ = 1 - 0.25 = 0.75 exactly
        assert_eq!(pixel_to_state(0.25, false, 0.75, 0.1), CellState::Unknown);
        // Just past the threshold
        assert_eq!(pixel_to_state(0.2499, false, 0.75, 0.1), CellState::Occupied);
        // Negated: occ = intensity
        assert_eq!(pixel_to_state(0.75, true, 0.75, 0.1), CellState::Unknown);
    }

    #[test]
    fn test_equal_to_free_thresh_is_unknown() {
        // occ = 1 - 0.75 = 0.25 exactly
        assert_eq!(pixel_to_state(0.75, false, 0.65, 0.25), CellState::Unknown);
        assert_eq!(pixel_to_state(0.7501, false, 0.65, 0.25), CellState::Free);
        assert_eq!(pixel_to_state(0.25, true, 0.65, 0.25), CellState::Unknown);
    }

    #[test]
    fn test_state_to_intensity_inverts_classification() {
        for negate in [false, true] {
            for state in [CellState::Occupied, CellState::Free, CellState::Unknown] {
                let intensity = state_to_intensity(state, negate);
                assert_eq!(pixel_to_state(intensity, negate, 0.65, 0.1), state);
            }
        }
    }

    #[test]
    fn test_sample_conversion() {
        assert_eq!(intensity_to_sample(0.0), 0);
        assert_eq!(intensity_to_sample(1.0), 255);
        assert_eq!(intensity_to_sample(UNKNOWN_INTENSITY), 128);
        assert_eq!(sample_to_intensity(255.0), 1.0);
        assert_eq!(sample_to_intensity(127.5), 0.5);
    }

    #[test]
    fn test_unknown_sample_decodes_unknown() {
        let intensity = sample_to_intensity(intensity_to_sample(UNKNOWN_INTENSITY) as f64);
        assert_eq!(
            pixel_to_state(intensity, false, 0.65, 0.1),
            CellState::Unknown
        );
    }
}
