//! Map server integration tests: loading from files, latched channels and
//! the service endpoint.

mod common;

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use common::*;
use map_server::{
    CellState, LoadMapError, MapMetaData, MapRequest, MapServer, MapService, MapTopics,
    OccupancyGrid, Pose2D, ServerError, ServerState,
};
use tempfile::TempDir;

#[test]
fn test_load_yaml_map_and_query() {
    let dir = TempDir::new().unwrap();
    let yaml = write_map(dir.path(), "room", &room_raster(20, 12), 0.05, [-1.0, -0.5, 0.0]);

    let server = MapServer::with_topics("map", &MapTopics::new());
    assert!(matches!(server.query(), Err(ServerError::NotReady)));

    server.load_map_file(&yaml).unwrap();
    let grid = server.query().unwrap();

    assert_eq!(server.state(), ServerState::Ready);
    assert_eq!(grid.width(), 20);
    assert_eq!(grid.height(), 12);
    assert_eq!(grid.resolution(), 0.05);
    assert_eq!(grid.origin(), Pose2D::new(-1.0, -0.5, 0.0));
    assert_eq!(grid.frame_id(), "map");
    assert_eq!(grid.cells().len(), 20 * 12);

    // Border is occupied, interior bottom-right is free
    assert_eq!(grid.get(0, 0), Some(CellState::Occupied));
    assert_eq!(grid.get(15, 3), Some(CellState::Free));
    // Gray block sits at the image top-left, i.e. the grid's top rows
    assert_eq!(grid.get(2, 10), Some(CellState::Unknown));
}

#[test]
fn test_white_map_scenario() {
    let dir = TempDir::new().unwrap();
    let raster = uniform_raster(10, 10, WHITE);
    let fields = "resolution: 0.1\norigin: [0.0, 0.0, 0.0]\noccupied_thresh: 0.65\nfree_thresh: 0.1\n";
    let plain = write_map_with(dir.path(), "white", &raster, &format!("{}negate: 0\n", fields));
    let negated = write_map_with(dir.path(), "white_neg", &raster, &format!("{}negate: 1\n", fields));

    let server = MapServer::default();

    let grid = server.load_map_file(&plain).unwrap();
    assert_eq!((grid.width(), grid.height()), (10, 10));
    assert_eq!(grid.resolution(), 0.1);
    assert_eq!(grid.count_cells().free, 100);

    let grid = server.load_map_file(&negated).unwrap();
    assert_eq!(grid.count_cells().occupied, 100);
}

#[test]
fn test_late_subscribers_get_current_values() {
    let dir = TempDir::new().unwrap();
    let yaml = write_map(dir.path(), "room", &room_raster(8, 8), 0.1, [0.0, 0.0, 0.0]);

    let topics = MapTopics::new();
    let server = MapServer::with_topics("map", &topics);
    let loaded = server.load_map_file(&yaml).unwrap();

    let map_rx = topics.map.subscribe();
    let meta_rx = topics.metadata.subscribe();

    let map = map_rx.recv_timeout(Duration::from_secs(1)).unwrap();
    let meta = meta_rx.recv_timeout(Duration::from_secs(1)).unwrap();
    assert!(Arc::ptr_eq(&map, &loaded));
    assert_eq!(*meta, *loaded.info());
    assert_eq!(meta.map_load_time_us, loaded.header().stamp_us);
}

#[test]
fn test_subscriber_sees_every_load_in_order() {
    let dir = TempDir::new().unwrap();
    let small = write_map(dir.path(), "small", &room_raster(4, 4), 0.1, [0.0, 0.0, 0.0]);
    let large = write_map(dir.path(), "large", &room_raster(9, 6), 0.1, [0.0, 0.0, 0.0]);

    let topics = MapTopics::new();
    let server = MapServer::with_topics("map", &topics);
    let rx = topics.map.subscribe();

    server.load_map_file(&small).unwrap();
    server.load_map_file(&large).unwrap();

    let widths: Vec<u32> = rx.try_iter().map(|g| g.width()).collect();
    assert_eq!(widths, vec![4, 9]);
}

#[test]
fn test_failed_load_keeps_previous_map() {
    let dir = TempDir::new().unwrap();
    let good = write_map(dir.path(), "good", &room_raster(6, 5), 0.05, [0.0, 0.0, 0.0]);

    let topics = MapTopics::new();
    let server = MapServer::with_topics("map", &topics);
    let before = server.load_map_file(&good).unwrap();
    let rx = topics.map.subscribe();
    let _ = rx.try_recv();

    // Metadata problem
    let bad_yaml = dir.path().join("bad.yaml");
    fs::write(&bad_yaml, "image: good.pgm\nresolution: -1\n").unwrap();
    assert!(matches!(
        server.load_map_file(&bad_yaml),
        Err(ServerError::Load(LoadMapError::InvalidMapMetadata(_)))
    ));

    // Image problem
    let broken_image = dir.path().join("broken.yaml");
    fs::write(dir.path().join("broken.pgm"), b"not an image").unwrap();
    fs::write(&broken_image, "image: broken.pgm\nresolution: 0.05\n").unwrap();
    assert!(matches!(
        server.load_map_file(&broken_image),
        Err(ServerError::Load(LoadMapError::InvalidMapData(_)))
    ));

    // Missing file
    assert!(matches!(
        server.load_map_file(dir.path().join("missing.yaml")),
        Err(ServerError::Load(LoadMapError::MapDoesNotExist(_)))
    ));

    let after = server.query().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_legacy_image_with_resolution() {
    let dir = TempDir::new().unwrap();
    let image = write_image(dir.path(), "legacy.png", &room_raster(7, 7));

    let server = MapServer::default();
    let config = map_server::DecodeConfig::new(0.2);
    let grid = server.load_image_file(&image, &config).unwrap();

    assert_eq!(grid.resolution(), 0.2);
    assert_eq!(grid.origin(), Pose2D::identity());
    assert_eq!(grid.get(0, 0), Some(CellState::Occupied));
}

#[test]
fn test_service_endpoint() {
    let dir = TempDir::new().unwrap();
    let yaml = write_map(dir.path(), "room", &room_raster(5, 5), 0.05, [1.0, 2.0, 0.0]);

    let server = Arc::new(MapServer::default());
    let running = Arc::new(AtomicBool::new(true));
    let (service, client) =
        MapService::spawn(Arc::clone(&server), running, Duration::from_secs(2)).unwrap();

    assert!(matches!(
        client.call(MapRequest::GetMap).unwrap(),
        Err(ServerError::NotReady)
    ));

    let loaded = client.load_map(&yaml).unwrap();
    assert_eq!(loaded.origin(), Pose2D::new(1.0, 2.0, 0.0));

    let fetched = client.get_map().unwrap();
    assert!(Arc::ptr_eq(&loaded, &fetched));
    assert_eq!(server.state(), ServerState::Ready);

    drop(client);
    service.join().unwrap();
}

/// Uniform grid whose fill is derivable from its width, so readers can spot
/// cells from one load mixed with metadata from another.
fn sized_grid(width: u32, height: u32) -> OccupancyGrid {
    let state = if width % 2 == 0 {
        CellState::Occupied
    } else {
        CellState::Free
    };
    let info = MapMetaData::new(width, height, 0.05, Pose2D::new(width as f64, 0.0, 0.0));
    OccupancyGrid::new(info, vec![state; (width * height) as usize]).unwrap()
}

fn assert_consistent(grid: &OccupancyGrid) {
    assert_eq!(grid.cells().len(), (grid.width() * grid.height()) as usize);
    assert_eq!(grid.origin().x, grid.width() as f64);
    let expected = if grid.width() % 2 == 0 {
        CellState::Occupied
    } else {
        CellState::Free
    };
    assert!(grid.cells().iter().all(|&c| c == expected));
}

#[test]
fn test_concurrent_loads_and_queries() {
    const WRITERS: u32 = 4;
    const LOADS_PER_WRITER: u32 = 25;

    let topics = MapTopics::new();
    let server = Arc::new(MapServer::with_topics("map", &topics));
    let map_rx = topics.map.subscribe();
    let meta_rx = topics.metadata.subscribe();

    server.load(sized_grid(1, 1));
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let server = Arc::clone(&server);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    let grid = server.query().unwrap();
                    assert_consistent(&grid);
                    assert_eq!(grid.header().stamp_us, grid.info().map_load_time_us);
                }
            })
        })
        .collect();

    let writers: Vec<_> = (0..WRITERS)
        .map(|w| {
            let server = Arc::clone(&server);
            thread::spawn(move || {
                for i in 0..LOADS_PER_WRITER {
                    let width = 2 + w * 7 + i % 5;
                    let height = 1 + (i * 3 + w) % 11;
                    server.load(sized_grid(width, height));
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }
    done.store(true, Ordering::Release);
    for reader in readers {
        reader.join().unwrap();
    }

    // Both channels saw every load, in the same order
    let maps: Vec<_> = map_rx.try_iter().collect();
    let metas: Vec<_> = meta_rx.try_iter().collect();
    assert_eq!(maps.len(), (1 + WRITERS * LOADS_PER_WRITER) as usize);
    assert_eq!(maps.len(), metas.len());
    for (map, meta) in maps.iter().zip(metas.iter()) {
        assert_consistent(map);
        assert_eq!(*map.info(), **meta);
    }

    // The last notification is what queries return
    let current = server.query().unwrap();
    assert!(Arc::ptr_eq(maps.last().unwrap(), &current));
}
