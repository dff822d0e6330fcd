//! Image-to-grid decoder.
//!
//! Image row 0 is the visual top of the map while grid row 0 is the bottom,
//! so raster row `r` lands in grid row `height - 1 - r`.

use std::path::Path;

use super::raster::{Raster, read_raster};
use super::threshold::{pixel_to_state, sample_to_intensity};
use crate::config::DecodeConfig;
use crate::core::{CellState, MapMetaData, OccupancyGrid};
use crate::error::DecodeError;

/// Decode a raster into an occupancy grid.
///
/// Multi-channel pixels are reduced to one intensity by an unweighted
/// average over all channels. Fails with [`DecodeError::InvalidConfig`] for a
/// bad resolution or thresholds, and with [`DecodeError::DimensionMismatch`]
/// when the declared dimensions disagree with the samples present.
pub fn decode(raster: &Raster, config: &DecodeConfig) -> Result<OccupancyGrid, DecodeError> {
    config.validate()?;

    if !raster.is_consistent() {
        return Err(DecodeError::DimensionMismatch {
            width: raster.width,
            height: raster.height,
            channels: raster.channels as u32,
            samples: raster.samples.len(),
        });
    }

    let width = raster.width;
    let height = raster.height;
    let mut cells = vec![CellState::Unknown; width as usize * height as usize];

    for r in 0..height {
        // Flip vertically: bottom image row becomes grid row 0
        let grid_row = (height - 1 - r) as usize;
        let row_start = grid_row * width as usize;

        for x in 0..width {
            let intensity = sample_to_intensity(raster.pixel_average(x, r));
            cells[row_start + x as usize] = pixel_to_state(
                intensity,
                config.negate,
                config.occupied_thresh,
                config.free_thresh,
            );
        }
    }

    let info = MapMetaData::new(width, height, config.resolution, config.origin);
    let grid = OccupancyGrid::new(info, cells)?;
    Ok(grid.with_frame_id(&config.frame_id))
}

/// Read an image file and decode it.
///
/// A file that cannot be read or decoded yields
/// [`DecodeError::SourceUnreadable`], never an empty map.
pub fn decode_file<P: AsRef<Path>>(
    path: P,
    config: &DecodeConfig,
) -> Result<OccupancyGrid, DecodeError> {
    let path = path.as_ref();
    config.validate()?;
    let raster = read_raster(path)?;
    let grid = decode(&raster, config)?;

    log::debug!(
        "Decoded {} ({}x{}, {} channel(s)) @ {:.3} m/pix",
        path.display(),
        raster.width,
        raster.height,
        raster.channels,
        config.resolution
    );
    Ok(grid)
}
