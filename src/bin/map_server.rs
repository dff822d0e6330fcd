//! map_server command-line tool
//!
//! # Usage
//!
//! ```bash
//! # Decode a map and print a summary
//! map_server info maps/office.yaml
//!
//! # Summary plus a text rendering of the grid
//! map_server info maps/office.yaml --preview
//!
//! # Bare image with an explicit resolution (other values at defaults)
//! map_server info maps/office.pgm --resolution 0.05
//!
//! # Load a map and save it again as PNG + YAML
//! map_server convert maps/office.yaml -f out/office --format png
//!
//! # With a config file
//! map_server --config map_server.toml convert maps/office.yaml -f out/office
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Args, Parser, Subcommand};

use map_server::{
    AppConfig, DecodeConfig, Error, MapCapture, MapServer, MapTopics, OccupancyGrid,
    RasterFormat, Result,
};

/// Occupancy grid map server tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a map and print a summary
    Info {
        #[command(flatten)]
        map: MapArgs,

        /// Also print the grid as text ('#' occupied, '.' free, '?' unknown)
        #[arg(long)]
        preview: bool,
    },

    /// Load a map through the server and capture it to image + YAML
    Convert {
        #[command(flatten)]
        map: MapArgs,

        /// Output basename; writes <basename>.<ext> and <basename>.yaml
        #[arg(short = 'f', long = "file")]
        output: String,

        /// Output image format (overrides the config file)
        #[arg(long, value_enum)]
        format: Option<RasterFormat>,

        /// Write occupied cells white and free cells black
        #[arg(long)]
        negate: bool,
    },
}

#[derive(Args, Debug)]
struct MapArgs {
    /// Map YAML file, or a bare image when --resolution is given
    map: PathBuf,

    /// Resolution in meters per pixel of a bare image map
    #[arg(long)]
    resolution: Option<f64>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            AppConfig::load(path)?
        }
        None => AppConfig::default(),
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    match cli.command {
        Command::Info { map, preview } => info(&config, &map, preview),
        Command::Convert {
            map,
            output,
            format,
            negate,
        } => convert(&config, &map, output, format, negate, running),
    }
}

/// Load `map` into `server`, either from YAML or as a bare image.
fn load(server: &MapServer, map: &MapArgs) -> Result<Arc<OccupancyGrid>> {
    let grid = match map.resolution {
        Some(resolution) => {
            let decode = DecodeConfig::new(resolution).with_frame_id(server.frame_id());
            server.load_image_file(&map.map, &decode)?
        }
        None => server.load_map_file(&map.map)?,
    };
    Ok(grid)
}

fn info(config: &AppConfig, map: &MapArgs, preview: bool) -> Result<()> {
    let server = MapServer::with_topics(&config.server.frame_id, &MapTopics::new());
    let grid = load(&server, map)?;
    let counts = grid.count_cells();
    let origin = grid.origin();

    println!("map:        {}", map.map.display());
    println!("frame_id:   {}", grid.frame_id());
    println!("size:       {} x {} cells", grid.width(), grid.height());
    println!("resolution: {} m/cell", grid.resolution());
    println!(
        "extent:     {:.2} x {:.2} m",
        grid.width() as f64 * grid.resolution(),
        grid.height() as f64 * grid.resolution()
    );
    println!(
        "origin:     ({}, {}, {})",
        origin.x, origin.y, origin.yaw
    );
    println!(
        "cells:      {} free, {} occupied, {} unknown ({} total)",
        counts.free,
        counts.occupied,
        counts.unknown,
        counts.total()
    );
    if preview {
        print!("\n{}", grid.to_ascii());
    }
    Ok(())
}

fn convert(
    config: &AppConfig,
    map: &MapArgs,
    output: String,
    format: Option<RasterFormat>,
    negate: bool,
    running: Arc<AtomicBool>,
) -> Result<()> {
    let topics = MapTopics::new();
    let server = MapServer::with_topics(&config.server.frame_id, &topics);

    let mut settings = config.capture.settings(output);
    if let Some(format) = format {
        settings.format = format;
    }
    if negate {
        settings.encoder.negate = true;
    }

    let capture = Arc::new(MapCapture::new(settings));
    let handle = Arc::clone(&capture).spawn(topics.map.subscribe(), Arc::clone(&running))?;

    let loaded = load(&server, map);
    if loaded.is_err() {
        running.store(false, Ordering::Relaxed);
    }

    let captured = handle
        .join()
        .map_err(|_| Error::Other("Capture thread panicked".to_string()))?;
    loaded?;
    let saved = captured?;

    log::info!("Done: {} map(s) saved", saved);
    Ok(())
}
