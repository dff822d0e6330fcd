//! Raster buffers and byte-level image I/O.
//!
//! A [`Raster`] is the boundary between this crate and the `image` codecs:
//! a rectangle of 8-bit samples, top row first, `channels` interleaved
//! samples per pixel.

use std::path::Path;

use image::codecs::png::PngEncoder;
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::error::{ImageError, ParameterError, ParameterErrorKind};
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Decoded image samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    /// Pixels per row.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Samples per pixel (1 = gray, 2 = gray+alpha, 3 = RGB, 4 = RGBA).
    pub channels: u8,
    /// Row-major samples, top row first.
    pub samples: Vec<u8>,
}

impl Raster {
    /// Create a raster from raw parts. Consistency is checked by consumers.
    pub fn new(width: u32, height: u32, channels: u8, samples: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels,
            samples,
        }
    }

    /// Single-channel raster filled by `f(x, y)` with `y = 0` the top row.
    pub fn from_fn_gray(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Self {
        let mut samples = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y));
            }
        }
        Self::new(width, height, 1, samples)
    }

    /// Number of samples implied by the declared dimensions.
    #[inline]
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    /// Declared dimensions are positive and match the samples present.
    pub fn is_consistent(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.channels > 0
            && self.samples.len() == self.expected_len()
    }

    /// Samples of pixel `(x, y)`, `y = 0` being the top row.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let channels = self.channels as usize;
        let start = (y as usize * self.width as usize + x as usize) * channels;
        &self.samples[start..start + channels]
    }

    /// Unweighted average over all channel samples of pixel `(x, y)`.
    #[inline]
    pub fn pixel_average(&self, x: u32, y: u32) -> f64 {
        let pixel = self.pixel(x, y);
        let sum: u32 = pixel.iter().map(|&s| s as u32).sum();
        sum as f64 / pixel.len() as f64
    }

    fn color_type(&self) -> Option<ExtendedColorType> {
        match self.channels {
            1 => Some(ExtendedColorType::L8),
            2 => Some(ExtendedColorType::La8),
            3 => Some(ExtendedColorType::Rgb8),
            4 => Some(ExtendedColorType::Rgba8),
            _ => None,
        }
    }
}

impl From<DynamicImage> for Raster {
    fn from(img: DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        let (channels, samples) = match img {
            DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (2, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
            // 16-bit and float images are reduced to 8-bit samples first
            other => {
                let color = other.color();
                match (color.has_color(), color.has_alpha()) {
                    (true, true) => (4, other.into_rgba8().into_raw()),
                    (true, false) => (3, other.into_rgb8().into_raw()),
                    (false, true) => (2, other.into_luma_alpha8().into_raw()),
                    (false, false) => (1, other.into_luma8().into_raw()),
                }
            }
        };
        Self::new(width, height, channels, samples)
    }
}

/// Read and decode an image file. The format is chosen from the extension.
pub fn read_raster<P: AsRef<Path>>(path: P) -> Result<Raster, DecodeError> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|e| DecodeError::SourceUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(Raster::from(img))
}

/// Byte-level raster format of saved maps.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    /// Portable Network Graphics
    Png,
    /// Binary (P5) portable graymap
    #[default]
    Pgm,
}

impl RasterFormat {
    /// Format for a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(RasterFormat::Png),
            "pgm" => Some(RasterFormat::Pgm),
            _ => None,
        }
    }

    /// Format selected by the extension of `path`.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
            RasterFormat::Pgm => "pgm",
        }
    }

    /// Encode a raster into file bytes.
    pub fn encode(self, raster: &Raster) -> Result<Vec<u8>, ImageError> {
        let color = match raster.color_type() {
            Some(color) if raster.is_consistent() => color,
            _ => {
                return Err(ImageError::Parameter(ParameterError::from_kind(
                    ParameterErrorKind::DimensionMismatch,
                )));
            }
        };

        let mut bytes = Vec::new();
        match self {
            RasterFormat::Png => {
                PngEncoder::new(&mut bytes).write_image(
                    &raster.samples,
                    raster.width,
                    raster.height,
                    color,
                )?;
            }
            RasterFormat::Pgm => {
                PnmEncoder::new(&mut bytes)
                    .with_subtype(PnmSubtype::Graymap(SampleEncoding::Binary))
                    .write_image(&raster.samples, raster.width, raster.height, color)?;
            }
        }
        Ok(bytes)
    }
}
