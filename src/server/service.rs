//! In-process request/response endpoint.
//!
//! A worker thread owns an `Arc<MapServer>` and answers requests sent through
//! a channel. Each request carries its own response channel, and callers wait
//! on it with a timeout.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};

use super::MapServer;
use crate::core::OccupancyGrid;
use crate::error::{ServerError, ServiceError};

/// How often the worker checks the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Requests understood by the map service.
#[derive(Debug, Clone, PartialEq)]
pub enum MapRequest {
    /// Return the current map.
    GetMap,
    /// Replace the current map with the one described by a YAML file.
    LoadMap {
        /// Map description file.
        path: PathBuf,
    },
}

/// Result of a request: the grid served after the request, or why it failed.
pub type MapResponse = Result<Arc<OccupancyGrid>, ServerError>;

struct RequestWithResponse {
    request: MapRequest,
    response_tx: Sender<MapResponse>,
}

/// Handle to the service worker thread.
pub struct MapService {
    handle: JoinHandle<()>,
}

impl MapService {
    /// Start the worker.
    ///
    /// The worker exits when `running` is cleared or when every
    /// [`ServiceClient`] has been dropped.
    pub fn spawn(
        server: Arc<MapServer>,
        running: Arc<AtomicBool>,
        timeout: Duration,
    ) -> std::io::Result<(Self, ServiceClient)> {
        let (tx, rx) = unbounded();
        let handle = thread::Builder::new()
            .name("map-service".into())
            .spawn(move || service_loop(&server, &rx, &running))?;

        Ok((Self { handle }, ServiceClient { tx, timeout }))
    }

    /// Wait for the worker to exit.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

fn service_loop(server: &MapServer, rx: &Receiver<RequestWithResponse>, running: &AtomicBool) {
    log::info!("Map service started");

    while running.load(Ordering::Relaxed) {
        let msg = match rx.recv_timeout(POLL_INTERVAL) {
            Ok(msg) => msg,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        log::debug!("Map service request: {:?}", msg.request);
        let response = match msg.request {
            MapRequest::GetMap => server.query(),
            MapRequest::LoadMap { path } => server.load_map_file(&path),
        };
        // Caller may have timed out already
        let _ = msg.response_tx.send(response);
    }

    log::info!("Map service stopped");
}

/// Client side of the map service. Cheap to clone.
#[derive(Clone)]
pub struct ServiceClient {
    tx: Sender<RequestWithResponse>,
    timeout: Duration,
}

impl ServiceClient {
    /// Send a request and wait for its response.
    pub fn call(&self, request: MapRequest) -> Result<MapResponse, ServiceError> {
        let (response_tx, response_rx) = bounded(1);

        self.tx
            .send(RequestWithResponse {
                request,
                response_tx,
            })
            .map_err(|_| ServiceError::Disconnected)?;

        response_rx
            .recv_timeout(self.timeout)
            .map_err(|e| match e {
                RecvTimeoutError::Timeout => ServiceError::Timeout(self.timeout),
                RecvTimeoutError::Disconnected => ServiceError::Disconnected,
            })
    }

    /// Fetch the current map.
    pub fn get_map(&self) -> crate::Result<Arc<OccupancyGrid>> {
        Ok(self.call(MapRequest::GetMap)??)
    }

    /// Ask the server to load a new map.
    pub fn load_map(&self, path: impl Into<PathBuf>) -> crate::Result<Arc<OccupancyGrid>> {
        Ok(self.call(MapRequest::LoadMap { path: path.into() })??)
    }
}
