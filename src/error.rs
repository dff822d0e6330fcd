//! Error types for the map server

use std::path::PathBuf;
use std::time::Duration;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Raster-to-grid decoding errors
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Declared dimensions disagree with the samples actually present
    #[error(
        "Dimension mismatch: {width}x{height} with {channels} channel(s) declared, {samples} samples present"
    )]
    DimensionMismatch {
        /// Declared width
        width: u32,
        /// Declared height
        height: u32,
        /// Declared channels per pixel
        channels: u32,
        /// Samples present
        samples: usize,
    },

    /// The byte-level image decode failed
    #[error("Failed to read map image {}: {reason}", path.display())]
    SourceUnreadable {
        /// Image path
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// Resolution or thresholds rejected before decoding
    #[error("Invalid decode configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Thresholds outside (0, 1) or `free_thresh >= occupied_thresh`
    #[error("Invalid thresholds: occupied_thresh={occupied}, free_thresh={free}")]
    InvalidThreshold {
        /// Occupied threshold
        occupied: f64,
        /// Free threshold
        free: f64,
    },

    /// Resolution must be positive and finite
    #[error("Invalid resolution: {0}")]
    InvalidResolution(f64),

    /// Unsupported option value
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// I/O error while reading a config file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// Failure classes of a map load request
#[derive(Debug, thiserror::Error)]
pub enum LoadMapError {
    /// The map description file does not exist
    #[error("Map does not exist: {}", .0.display())]
    MapDoesNotExist(PathBuf),

    /// The map description could not be parsed or validated
    #[error("Invalid map metadata: {0}")]
    InvalidMapMetadata(#[from] ConfigError),

    /// The referenced image could not be decoded
    #[error("Invalid map data: {0}")]
    InvalidMapData(#[from] DecodeError),
}

/// Map server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No grid has been loaded yet
    #[error("Map server not ready: no map loaded")]
    NotReady,

    /// A load request failed; the previous map is still served
    #[error("Map load failed: {0}")]
    Load(#[from] LoadMapError),
}

/// Map capture errors
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// An output file could not be written
    #[error("Failed to write {}: {source}", path.display())]
    WriteFailed {
        /// Destination path
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// Byte-level raster encoding failed
    #[error("Failed to encode map image: {0}")]
    Encode(String),

    /// Encoder thresholds would produce a sidecar that cannot be loaded back
    #[error("Invalid capture settings: {0}")]
    InvalidSettings(#[from] ConfigError),

    /// Capture was cancelled before any map arrived
    #[error("Capture cancelled")]
    Cancelled,

    /// No map arrived within the configured wait
    #[error("No map received within {0:?}")]
    Timeout(Duration),

    /// The map channel was closed by the publisher
    #[error("Map channel closed")]
    ChannelClosed,
}

/// In-process service endpoint errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The service thread is gone
    #[error("Map service not responding (channel closed)")]
    Disconnected,

    /// No response within the timeout
    #[error("Map service timed out after {0:?}")]
    Timeout(Duration),
}

/// Crate-level error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Decode error
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Server error
    #[error(transparent)]
    Server(#[from] ServerError),

    /// Capture error
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// Service error
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
