//! map-server - Occupancy grid map server
//!
//! Loads a raster image plus its YAML description, turns it into a trinary
//! occupancy grid (free / occupied / unknown), serves it to consumers, and
//! captures published grids back to image + YAML files.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      bin/                           │  ← Executable
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌──────────────────────────┬──────────────────────────┐
//! │         server/          │         capture/         │  ← Flows
//! │  (store, load, service)  │   (subscribe, save)      │
//! └──────────────────────────┴──────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   transport/                        │  ← Latched topics
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     codec/                          │  ← Image <-> grid
//! │        (threshold, decode, encode, raster)          │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                core/ + config/                      │  ← Foundation
//! │      (grid types, map YAML, app TOML config)        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use map_server::{MapServer, MapTopics};
//!
//! let topics = MapTopics::new();
//! let server = MapServer::with_topics("map", &topics);
//! let updates = topics.map.subscribe();
//!
//! server.load_map_file("maps/office.yaml")?;
//! let grid = server.query()?;
//! assert_eq!(updates.recv()?.width(), grid.width());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// ============================================================================
// Foundation
// ============================================================================
pub mod config;
pub mod core;
pub mod error;

// ============================================================================
// Image <-> grid conversion
// ============================================================================
pub mod codec;

// ============================================================================
// Publication and flows
// ============================================================================
pub mod capture;
pub mod server;
pub mod transport;

// ============================================================================
// Convenience re-exports
// ============================================================================

pub use capture::{CaptureMode, CaptureSettings, MapCapture, SavedMap};
pub use codec::{EncodedMap, MapEncoder, Raster, RasterFormat, decode, decode_file};
pub use config::{AppConfig, DecodeConfig, MapYaml};
pub use core::{CellCounts, CellState, Header, MapMetaData, OccupancyGrid, Pose2D};
pub use error::{
    CaptureError, ConfigError, DecodeError, Error, LoadMapError, Result, ServerError, ServiceError,
};
pub use server::{MapRequest, MapResponse, MapServer, MapService, ServerState, ServiceClient};
pub use transport::{LatchedTopic, MapTopics, Publisher};
