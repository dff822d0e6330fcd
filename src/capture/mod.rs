//! Map capture flow.
//!
//! Subscribes to the full-grid channel and saves what arrives as an image
//! plus a YAML sidecar that [`MapServer::load_map_file`] can read back.
//!
//! [`MapServer::load_map_file`]: crate::server::MapServer::load_map_file

mod writer;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use serde::{Deserialize, Serialize};

use crate::codec::{MapEncoder, RasterFormat};
use crate::core::OccupancyGrid;
use crate::error::CaptureError;

/// How often the wait checks cancellation and the timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Which published grids get saved.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Save the first grid, then stop
    #[default]
    Once,
    /// Save every grid until cancelled, overwriting the previous files
    Continuous,
}

/// Capture parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureSettings {
    /// Output path without extension; `<basename>.<ext>` and `<basename>.yaml` are written.
    pub basename: String,
    /// Image format.
    pub format: RasterFormat,
    /// Once or continuous.
    pub mode: CaptureMode,
    /// Grid-to-image encoder.
    pub encoder: MapEncoder,
    /// Give up if no grid arrives within this time. `None` waits until cancelled.
    pub wait_timeout: Option<Duration>,
}

impl CaptureSettings {
    /// Single PGM capture with default encoding and no timeout.
    pub fn new(basename: impl Into<String>) -> Self {
        Self {
            basename: basename.into(),
            format: RasterFormat::default(),
            mode: CaptureMode::default(),
            encoder: MapEncoder::default(),
            wait_timeout: None,
        }
    }

    pub fn with_format(mut self, format: RasterFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_mode(mut self, mode: CaptureMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_encoder(mut self, encoder: MapEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = Some(timeout);
        self
    }

    /// Destination of the image.
    pub fn image_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.basename, self.format.extension()))
    }

    /// Destination of the YAML sidecar.
    pub fn yaml_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.yaml", self.basename))
    }
}

/// Files produced by one capture.
#[derive(Clone, Debug, PartialEq)]
pub struct SavedMap {
    pub image_path: PathBuf,
    pub yaml_path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Saves published grids to disk.
pub struct MapCapture {
    settings: CaptureSettings,
    /// Set after the first successful save, never reset
    saved: Arc<AtomicBool>,
    saved_count: AtomicUsize,
}

impl MapCapture {
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            settings,
            saved: Arc::new(AtomicBool::new(false)),
            saved_count: AtomicUsize::new(0),
        }
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Completion flag, shared so other threads can observe it.
    pub fn completion_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.saved)
    }

    /// Whether at least one map was saved.
    pub fn is_saved(&self) -> bool {
        self.saved.load(Ordering::Acquire)
    }

    /// Number of maps saved so far.
    pub fn saved_count(&self) -> usize {
        self.saved_count.load(Ordering::Relaxed)
    }

    /// Encode and write one grid.
    ///
    /// Success is reported only after both the image and the YAML are in place.
    /// Encoder thresholds that a later load would reject are refused up front.
    pub fn save(&self, grid: &OccupancyGrid) -> Result<SavedMap, CaptureError> {
        self.settings.encoder.validate()?;

        let image_path = self.settings.image_path();
        let yaml_path = self.settings.yaml_path();

        let image_name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CaptureError::WriteFailed {
                path: image_path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "output basename has no file name",
                ),
            })?;

        log::info!(
            "Received a {}x{} map @ {:.3} m/pix",
            grid.width(),
            grid.height(),
            grid.resolution()
        );

        let mut encoded = self.settings.encoder.encode(grid);
        let image_bytes = self
            .settings
            .format
            .encode(&encoded.raster)
            .map_err(|e| CaptureError::Encode(e.to_string()))?;

        // Sidecar refers to the image by name so the pair can be moved together
        encoded.yaml.image = image_name;
        let yaml_text = encoded
            .yaml
            .to_yaml_string()
            .map_err(|e| CaptureError::Encode(e.to_string()))?;

        writer::write_files(&[
            (image_path.as_path(), image_bytes.as_slice()),
            (yaml_path.as_path(), yaml_text.as_bytes()),
        ])?;

        self.saved_count.fetch_add(1, Ordering::Relaxed);
        if !self.saved.swap(true, Ordering::AcqRel) {
            log::debug!("Capture completion flag set");
        }
        log::info!(
            "Map saved to {} and {}",
            image_path.display(),
            yaml_path.display()
        );

        Ok(SavedMap {
            image_path,
            yaml_path,
            width: grid.width(),
            height: grid.height(),
        })
    }

    /// Wait for grids on `maps` and save them according to the mode.
    ///
    /// Returns the number of maps saved. Clearing `running` stops the wait;
    /// that is [`CaptureError::Cancelled`] if nothing was saved yet.
    pub fn run(
        &self,
        maps: &Receiver<Arc<OccupancyGrid>>,
        running: &AtomicBool,
    ) -> Result<usize, CaptureError> {
        let started = Instant::now();
        let mut saved = 0usize;

        log::info!("Waiting for the map ({:?} mode)", self.settings.mode);

        loop {
            if !running.load(Ordering::Relaxed) {
                return if saved > 0 {
                    Ok(saved)
                } else {
                    Err(CaptureError::Cancelled)
                };
            }

            match maps.recv_timeout(POLL_INTERVAL) {
                Ok(grid) => {
                    self.save(&grid)?;
                    saved += 1;
                    if self.settings.mode == CaptureMode::Once {
                        return Ok(saved);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if saved == 0
                        && let Some(limit) = self.settings.wait_timeout
                        && started.elapsed() >= limit
                    {
                        log::warn!("No map received within {:?}", limit);
                        return Err(CaptureError::Timeout(limit));
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return if saved > 0 {
                        Ok(saved)
                    } else {
                        Err(CaptureError::ChannelClosed)
                    };
                }
            }
        }
    }

    /// Run the capture on its own named thread.
    pub fn spawn(
        self: Arc<Self>,
        maps: Receiver<Arc<OccupancyGrid>>,
        running: Arc<AtomicBool>,
    ) -> std::io::Result<JoinHandle<Result<usize, CaptureError>>> {
        thread::Builder::new()
            .name("map-capture".into())
            .spawn(move || self.run(&maps, &running))
    }
}
