//! Map store and server.
//!
//! [`MapServer`] holds at most one [`OccupancyGrid`] and hands out shared
//! snapshots of it. Every load replaces the whole grid and notifies the two
//! latched channels (`map`, `map_metadata`).
//!
//! ```text
//!   load_map_file ──► decode ──► load ──► swap Arc ──► publish map
//!                                                 └──► publish map_metadata
//!   query ──────────────────────────────► clone Arc
//! ```

mod service;

pub use service::{MapRequest, MapResponse, MapService, ServiceClient};

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::codec::decode_file;
use crate::config::{DecodeConfig, MapYaml};
use crate::core::{DEFAULT_FRAME_ID, MapMetaData, OccupancyGrid, now_us};
use crate::error::{LoadMapError, ServerError};
use crate::transport::{MapTopics, Publisher};

/// Server lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerState {
    /// Nothing loaded yet
    Empty,
    /// A grid is being served
    Ready,
}

/// Holds the current map and publishes every replacement.
pub struct MapServer {
    frame_id: String,
    current: RwLock<Option<Arc<OccupancyGrid>>>,
    /// Serializes swap + fan-out so notifications never straddle two loads
    load_lock: Mutex<()>,
    map_pub: Arc<dyn Publisher<OccupancyGrid>>,
    metadata_pub: Arc<dyn Publisher<MapMetaData>>,
}

impl MapServer {
    /// Create an empty server publishing through the given channels.
    pub fn new(
        frame_id: impl Into<String>,
        map_pub: Arc<dyn Publisher<OccupancyGrid>>,
        metadata_pub: Arc<dyn Publisher<MapMetaData>>,
    ) -> Self {
        Self {
            frame_id: frame_id.into(),
            current: RwLock::new(None),
            load_lock: Mutex::new(()),
            map_pub,
            metadata_pub,
        }
    }

    /// Create an empty server publishing on in-process latched topics.
    pub fn with_topics(frame_id: impl Into<String>, topics: &MapTopics) -> Self {
        Self::new(
            frame_id,
            topics.map.clone() as Arc<dyn Publisher<OccupancyGrid>>,
            topics.metadata.clone() as Arc<dyn Publisher<MapMetaData>>,
        )
    }

    /// Frame id stamped on every served grid.
    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServerState {
        if self.current.read().is_some() {
            ServerState::Ready
        } else {
            ServerState::Empty
        }
    }

    /// Replace the served grid and publish it.
    ///
    /// The grid is stamped with this server's frame id and the current time
    /// (header stamp and `map_load_time_us`). Returns the snapshot now served.
    pub fn load(&self, grid: OccupancyGrid) -> Arc<OccupancyGrid> {
        let _guard = self.load_lock.lock();

        let grid = Arc::new(grid.stamped(&self.frame_id, now_us()));
        *self.current.write() = Some(Arc::clone(&grid));

        self.map_pub.publish(Arc::clone(&grid));
        self.metadata_pub.publish(Arc::new(*grid.info()));
        log::debug!(
            "Published on '{}' ({} subscriber(s)) and '{}' ({} subscriber(s))",
            self.map_pub.topic(),
            self.map_pub.subscriber_count(),
            self.metadata_pub.topic(),
            self.metadata_pub.subscriber_count()
        );

        let counts = grid.count_cells();
        log::info!(
            "Map loaded: {}x{} @ {:.3} m/cell, origin ({:.2}, {:.2}), {} occupied / {} free / {} unknown",
            grid.width(),
            grid.height(),
            grid.resolution(),
            grid.origin().x,
            grid.origin().y,
            counts.occupied,
            counts.free,
            counts.unknown
        );
        grid
    }

    /// Current grid, or [`ServerError::NotReady`] if nothing was loaded.
    ///
    /// Never blocks waiting for a load.
    pub fn query(&self) -> Result<Arc<OccupancyGrid>, ServerError> {
        self.current.read().clone().ok_or(ServerError::NotReady)
    }

    /// Load a map described by a YAML file.
    ///
    /// On failure the previously served grid stays in place.
    pub fn load_map_file<P: AsRef<Path>>(
        &self,
        yaml_path: P,
    ) -> Result<Arc<OccupancyGrid>, ServerError> {
        let yaml_path = yaml_path.as_ref();
        self.read_map_file(yaml_path)
            .map(|grid| self.load(grid))
            .map_err(|e| {
                log::error!("Failed to load map {}: {}", yaml_path.display(), e);
                ServerError::Load(e)
            })
    }

    /// Load a bare image with an explicit decode configuration.
    ///
    /// Used for the `<image> <resolution>` form where no YAML exists.
    pub fn load_image_file<P: AsRef<Path>>(
        &self,
        image_path: P,
        config: &DecodeConfig,
    ) -> Result<Arc<OccupancyGrid>, ServerError> {
        let image_path = image_path.as_ref();
        let result = config
            .validate()
            .map_err(LoadMapError::from)
            .and_then(|()| {
                if !image_path.exists() {
                    return Err(LoadMapError::MapDoesNotExist(image_path.to_path_buf()));
                }
                Ok(decode_file(image_path, config)?)
            });

        match result {
            Ok(grid) => Ok(self.load(grid)),
            Err(e) => {
                log::error!("Failed to load map image {}: {}", image_path.display(), e);
                Err(ServerError::Load(e))
            }
        }
    }

    fn read_map_file(&self, yaml_path: &Path) -> Result<OccupancyGrid, LoadMapError> {
        if !yaml_path.is_file() {
            return Err(LoadMapError::MapDoesNotExist(yaml_path.to_path_buf()));
        }
        let yaml = MapYaml::load(yaml_path)?;
        let image_path = yaml.image_path(yaml_path);
        log::debug!(
            "Map description {} -> image {}",
            yaml_path.display(),
            image_path.display()
        );
        Ok(decode_file(&image_path, &yaml.to_decode_config(&self.frame_id))?)
    }
}

impl Default for MapServer {
    fn default() -> Self {
        Self::with_topics(DEFAULT_FRAME_ID, &MapTopics::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CellState, Pose2D};

    fn grid(width: u32, height: u32, state: CellState) -> OccupancyGrid {
        let info = MapMetaData::new(width, height, 0.1, Pose2D::new(1.0, -2.0, 0.0));
        OccupancyGrid::new(info, vec![state; (width * height) as usize]).unwrap()
    }

    #[test]
    fn test_query_before_load_is_not_ready() {
        let server = MapServer::default();
        assert_eq!(server.state(), ServerState::Empty);
        assert!(matches!(server.query(), Err(ServerError::NotReady)));
    }

    #[test]
    fn test_load_then_query() {
        let server = MapServer::default();
        server.load(grid(4, 3, CellState::Free));

        assert_eq!(server.state(), ServerState::Ready);
        let served = server.query().unwrap();
        assert_eq!(served.width(), 4);
        assert_eq!(served.height(), 3);
        assert_eq!(served.resolution(), 0.1);
        assert_eq!(served.origin(), Pose2D::new(1.0, -2.0, 0.0));
        assert_eq!(served.frame_id(), "map");
        assert!(served.info().map_load_time_us > 0);
        assert_eq!(served.header().stamp_us, served.info().map_load_time_us);
    }

    #[test]
    fn test_load_publishes_both_channels() {
        let topics = MapTopics::new();
        let server = MapServer::with_topics("world", &topics);
        let map_rx = topics.map.subscribe();
        let meta_rx = topics.metadata.subscribe();

        let served = server.load(grid(2, 2, CellState::Occupied));

        assert_eq!(topics.map.subscriber_count(), 1);
        let published = map_rx.try_recv().unwrap();
        assert!(Arc::ptr_eq(&published, &served));
        assert_eq!(published.frame_id(), "world");
        assert_eq!(*meta_rx.try_recv().unwrap(), *served.info());
    }

    #[test]
    fn test_load_replaces_whole_grid() {
        let server = MapServer::default();
        let first = server.load(grid(2, 2, CellState::Free));
        server.load(grid(5, 1, CellState::Occupied));

        let current = server.query().unwrap();
        assert_eq!(current.width(), 5);
        // Old snapshot is untouched
        assert_eq!(first.width(), 2);
        assert!(first.cells().iter().all(|&c| c == CellState::Free));
    }

    #[test]
    fn test_missing_map_file() {
        let server = MapServer::default();
        let result = server.load_map_file("/nonexistent/map.yaml");
        assert!(matches!(
            result,
            Err(ServerError::Load(LoadMapError::MapDoesNotExist(_)))
        ));
        assert_eq!(server.state(), ServerState::Empty);
    }

    #[test]
    fn test_missing_image_keeps_state() {
        let server = MapServer::default();
        let config = DecodeConfig::new(0.05);
        let result = server.load_image_file("/nonexistent/map.pgm", &config);
        assert!(matches!(
            result,
            Err(ServerError::Load(LoadMapError::MapDoesNotExist(_)))
        ));
        assert!(server.query().is_err());
    }

    #[test]
    fn test_invalid_legacy_resolution() {
        let server = MapServer::default();
        let config = DecodeConfig::new(-1.0);
        let result = server.load_image_file("/nonexistent/map.pgm", &config);
        assert!(matches!(
            result,
            Err(ServerError::Load(LoadMapError::InvalidMapMetadata(_)))
        ));
    }
}
