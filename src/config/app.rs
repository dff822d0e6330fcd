//! Application configuration (TOML).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::decode::validate_thresholds;
use super::defaults;
use crate::capture::{CaptureMode, CaptureSettings};
use crate::codec::{MapEncoder, RasterFormat};
use crate::error::ConfigError;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub capture: CaptureSection,
}

/// Map server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSection {
    /// Frame id attached to served maps
    #[serde(default = "defaults::frame_id")]
    pub frame_id: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            frame_id: defaults::frame_id(),
        }
    }
}

/// Map capture settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureSection {
    /// Raster format of the saved image
    #[serde(default)]
    pub format: RasterFormat,

    /// Capture the first map only, or every published map
    #[serde(default)]
    pub mode: CaptureMode,

    /// Negate flag used when encoding and recorded in the YAML
    #[serde(default)]
    pub negate: bool,

    /// Occupied threshold recorded in the YAML
    #[serde(default = "defaults::occupied_thresh")]
    pub occupied_thresh: f64,

    /// Free threshold recorded in the YAML
    #[serde(default = "defaults::free_thresh")]
    pub free_thresh: f64,

    /// Maximum wait for the first map in milliseconds (0 = until cancelled)
    #[serde(default = "defaults::wait_timeout_ms")]
    pub wait_timeout_ms: u64,
}

impl Default for CaptureSection {
    fn default() -> Self {
        Self {
            format: RasterFormat::default(),
            mode: CaptureMode::default(),
            negate: false,
            occupied_thresh: defaults::occupied_thresh(),
            free_thresh: defaults::free_thresh(),
            wait_timeout_ms: defaults::wait_timeout_ms(),
        }
    }
}

impl CaptureSection {
    /// Encoder configured with this section's negate flag and thresholds.
    pub fn encoder(&self) -> MapEncoder {
        MapEncoder::new(self.negate, self.occupied_thresh, self.free_thresh)
    }

    /// Capture settings for the given output basename.
    pub fn settings(&self, basename: impl Into<String>) -> CaptureSettings {
        CaptureSettings {
            basename: basename.into(),
            format: self.format,
            mode: self.mode,
            encoder: self.encoder(),
            wait_timeout: (self.wait_timeout_ms > 0)
                .then(|| std::time::Duration::from_millis(self.wait_timeout_ms)),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.frame_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue("frame_id is empty".to_string()));
        }
        validate_thresholds(self.capture.occupied_thresh, self.capture.free_thresh)
    }
}
