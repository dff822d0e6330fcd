//! Configuration records for decoding maps and running the server.
//!
//! Every record is captured once and passed into the component that needs it;
//! nothing reads configuration from global state.
//!
//! | Record | Source | Used by |
//! |--------|--------|---------|
//! | [`DecodeConfig`] | map YAML or CLI | [`crate::codec::decode`] |
//! | [`MapYaml`] | `<map>.yaml` sidecar | load requests, capture output |
//! | [`AppConfig`] | TOML file | binary, server, capture |
//!
//! ## Example TOML
//!
//! ```toml
//! [server]
//! frame_id = "map"
//!
//! [capture]
//! format = "png"          # png | pgm
//! mode = "once"           # once | continuous
//! occupied_thresh = 0.65
//! free_thresh = 0.1
//! wait_timeout_ms = 5000  # 0 = wait until cancelled
//! ```

mod app;
mod decode;
mod defaults;
mod map_yaml;

pub use app::{AppConfig, CaptureSection, ServerSection};
pub use decode::{DecodeConfig, validate_resolution, validate_thresholds};
pub use defaults::{DEFAULT_FREE_THRESH, DEFAULT_NEGATE, DEFAULT_OCCUPIED_THRESH};
pub use map_yaml::MapYaml;
