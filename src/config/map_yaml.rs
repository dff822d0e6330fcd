//! Map description file (ROS map_server YAML format).
//!
//! ```yaml
//! image: office.pgm
//! resolution: 0.05
//! origin: [-10.0, -10.0, 0.0]
//! negate: 0
//! occupied_thresh: 0.65
//! free_thresh: 0.1
//! ```
//!
//! `image` is resolved relative to the YAML file. `negate` is accepted as
//! `0`/`1` or `true`/`false` and always written as `0`/`1`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::decode::{DecodeConfig, validate_resolution, validate_thresholds};
use super::defaults;
use crate::core::Pose2D;
use crate::error::ConfigError;

/// Sidecar metadata describing how to decode a map image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapYaml {
    /// Image filename (relative to the YAML file, or absolute).
    pub image: String,

    /// Map resolution in meters per pixel.
    pub resolution: f64,

    /// Origin of map [x, y, yaw] - world pose of the bottom-left pixel.
    #[serde(default = "defaults::origin")]
    pub origin: [f64; 3],

    /// Whether white/black free/occupied semantics are reversed.
    #[serde(default, with = "negate_flag")]
    pub negate: bool,

    /// Occupancy probability above which a cell is occupied.
    #[serde(default = "defaults::occupied_thresh")]
    pub occupied_thresh: f64,

    /// Occupancy probability below which a cell is free.
    #[serde(default = "defaults::free_thresh")]
    pub free_thresh: f64,

    /// Interpretation mode; only `trinary` is supported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl MapYaml {
    /// Load and validate a map description.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a map description.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let yaml: MapYaml = serde_yaml::from_str(content)?;
        yaml.validate()?;
        Ok(yaml)
    }

    /// Check resolution, thresholds and mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "map YAML has an empty image field".to_string(),
            ));
        }
        validate_resolution(self.resolution)?;
        validate_thresholds(self.occupied_thresh, self.free_thresh)?;

        match self.mode.as_deref() {
            None | Some("trinary") => Ok(()),
            Some(other) => Err(ConfigError::InvalidValue(format!(
                "unsupported map mode '{}' (only 'trinary' is supported)",
                other
            ))),
        }
    }

    /// Path of the image, resolved against the directory of `yaml_path`.
    pub fn image_path(&self, yaml_path: &Path) -> PathBuf {
        let image = Path::new(&self.image);
        if image.is_absolute() {
            return image.to_path_buf();
        }
        yaml_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(image)
    }

    /// Origin as a pose.
    pub fn origin_pose(&self) -> Pose2D {
        Pose2D::from(self.origin)
    }

    /// Decode configuration described by this file.
    pub fn to_decode_config(&self, frame_id: &str) -> DecodeConfig {
        DecodeConfig::new(self.resolution)
            .with_negate(self.negate)
            .with_thresholds(self.occupied_thresh, self.free_thresh)
            .with_origin(self.origin_pose())
            .with_frame_id(frame_id)
    }

    /// Serialize with a short header comment.
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        let body = serde_yaml::to_string(self)?;
        Ok(format!("# Map saved by map-server\n\n{}", body))
    }
}

/// `negate` as `0`/`1` on write, integer or boolean on read.
mod negate_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Flag::deserialize(deserializer)? {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        })
    }
}
