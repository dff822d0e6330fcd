//! Test utilities for map-server integration tests.
//!
//! Helpers for building rasters and writing map image + YAML pairs.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use map_server::{Raster, RasterFormat};

/// Occupied, free and "unknown gray" samples as a map editor would draw them.
pub const BLACK: u8 = 0;
pub const WHITE: u8 = 255;
pub const GRAY: u8 = 205;

/// Room: black border, white interior, a gray block in the top-left corner.
pub fn room_raster(width: u32, height: u32) -> Raster {
    Raster::from_fn_gray(width, height, |x, y| {
        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
            BLACK
        } else if x < width / 3 && y < height / 3 {
            GRAY
        } else {
            WHITE
        }
    })
}

/// Raster with a single uniform sample.
pub fn uniform_raster(width: u32, height: u32, sample: u8) -> Raster {
    Raster::from_fn_gray(width, height, |_, _| sample)
}

/// Encode `raster` and write it to `dir/name`.
pub fn write_image(dir: &Path, name: &str, raster: &Raster) -> PathBuf {
    let path = dir.join(name);
    let format = RasterFormat::from_path(&path).expect("png or pgm extension");
    fs::write(&path, format.encode(raster).expect("encode raster")).expect("write image");
    path
}

/// Write `<stem>.pgm` and `<stem>.yaml` describing it.
pub fn write_map(dir: &Path, stem: &str, raster: &Raster, resolution: f64, origin: [f64; 3]) -> PathBuf {
    write_map_with(dir, stem, raster, &format!(
        "resolution: {}\norigin: [{}, {}, {}]\nnegate: 0\noccupied_thresh: 0.65\nfree_thresh: 0.196\n",
        resolution, origin[0], origin[1], origin[2]
    ))
}

/// Write `<stem>.pgm` and `<stem>.yaml` with custom YAML fields (everything but `image`).
pub fn write_map_with(dir: &Path, stem: &str, raster: &Raster, yaml_fields: &str) -> PathBuf {
    write_image(dir, &format!("{}.pgm", stem), raster);
    let yaml_path = dir.join(format!("{}.yaml", stem));
    fs::write(&yaml_path, format!("image: {}.pgm\n{}", stem, yaml_fields)).expect("write yaml");
    yaml_path
}
