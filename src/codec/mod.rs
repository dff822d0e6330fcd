//! Conversion between raster images and occupancy grids.
//!
//! ```text
//! image bytes ──[raster::read_raster]──► Raster ──[decode]──► OccupancyGrid
//! OccupancyGrid ──[MapEncoder::encode]──► Raster + MapYaml ──[RasterFormat::encode]──► bytes
//! ```
//!
//! The per-pixel policy lives in [`threshold`]; everything else is layout
//! (channel averaging and the vertical flip between image rows and grid rows).

pub mod decode;
pub mod encode;
pub mod raster;
pub mod threshold;

pub use decode::{decode, decode_file};
pub use encode::{EncodedMap, MapEncoder};
pub use raster::{Raster, RasterFormat, read_raster};
pub use threshold::{intensity_to_sample, pixel_to_state, sample_to_intensity, state_to_intensity};
