//! # Disk I/O Demo
//!
//! Loads files through both disk drivers the way a game does at startup and
//! during streaming:
//! - the blocking driver reads each file immediately
//! - the async driver queues the same reads and delivers them from a
//!   simulated frame loop
//! - optionally, a small report is written back under the root

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use redlilium_core::memory::MemoryBlock;
use redlilium_io::{
    IoDriver, IoDriverConfig, IoDriverDual, IoDriverEvents, IoError, OperationMode, PathKind,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPathKind {
    Assets,
    Relative,
    Absolute,
}

impl From<CliPathKind> for PathKind {
    fn from(kind: CliPathKind) -> Self {
        match kind {
            CliPathKind::Assets => PathKind::Assets,
            CliPathKind::Relative => PathKind::Relative,
            CliPathKind::Absolute => PathKind::Absolute,
        }
    }
}

/// RedLilium disk I/O demo.
#[derive(Parser, Debug)]
#[command(
    name = "disk_io_demo",
    about = "Read files through the blocking and async disk drivers",
    version
)]
struct Args {
    /// Files to load.
    #[arg(required = true)]
    files: Vec<String>,

    /// How file names are resolved.
    #[arg(long, default_value = "relative", value_enum)]
    kind: CliPathKind,

    /// Root directory (overrides the config file).
    #[arg(long)]
    root: Option<String>,

    /// TOML file with driver settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a summary to `disk_io_report.txt` under the root.
    #[arg(long)]
    report: bool,

    /// Simulated frame time in milliseconds.
    #[arg(long, default_value = "16")]
    frame_ms: u64,

    /// Give up after this many frames.
    #[arg(long, default_value = "600")]
    max_frames: u64,
}

/// Logs each completion as it is delivered.
struct LoaderEvents;

impl IoDriverEvents for LoaderEvents {
    fn on_read_complete(&mut self, uri: &str, block: Option<MemoryBlock>) {
        let size = block.as_ref().map_or(0, MemoryBlock::size);
        log::info!("[async] loaded '{uri}' ({size} bytes)");
    }

    fn on_open_error(&mut self, uri: &str) {
        log::warn!("[async] could not open '{uri}'");
    }

    fn on_read_error(&mut self, uri: &str) {
        log::warn!("[async] could not read '{uri}'");
    }

    fn on_write_complete(&mut self, uri: &str, bytes_written: usize) {
        log::info!("[async] wrote '{uri}' ({bytes_written} bytes)");
    }

    fn on_write_error(&mut self, uri: &str) {
        log::warn!("[async] could not write '{uri}'");
    }
}

fn main() -> Result<(), IoError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    redlilium_core::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => IoDriverConfig::load(path)?,
        None => IoDriverConfig::default(),
    };
    if let Some(root) = &args.root {
        config.root_uri = root.clone();
    }

    let (mut io, pool) = IoDriverDual::start(&config, Some(Box::new(LoaderEvents)))?;
    let kind = PathKind::from(args.kind);

    // Startup path: everything is available before the first frame.
    let started = Instant::now();
    let mut total = 0;
    for file in &args.files {
        if let Some(Some(block)) = io.driver(OperationMode::Blocking).read(file, kind).ready() {
            log::info!("[blocking] loaded '{file}' ({} bytes)", block.size());
            total += block.size();
        }
    }
    log::info!(
        "Blocking pass: {total} bytes in {:?}, {} live blocks",
        started.elapsed(),
        pool.live_blocks()
    );

    // Streaming path: requests complete on later frames.
    for file in &args.files {
        io.driver(OperationMode::Async).read(file, kind);
    }
    if args.report {
        let report = format!(
            "root: {}\nfiles: {}\nblocking bytes: {total}\n",
            io.blocking.root_uri(),
            args.files.len()
        );
        match pool.copy_block(report.as_bytes()) {
            Ok(block) => {
                io.driver(OperationMode::Async)
                    .write("disk_io_report.txt", &block, PathKind::Relative);
            }
            Err(err) => log::error!("Cannot allocate report block: {err}"),
        }
    }

    let frame = Duration::from_millis(args.frame_ms);
    let mut frames = 0;
    while io.async_driver.in_flight() > 0 && frames < args.max_frames {
        io.run_async_loop();
        frames += 1;
        std::thread::sleep(frame);
    }
    if io.async_driver.in_flight() > 0 {
        log::warn!(
            "{} request(s) still pending after {frames} frames",
            io.async_driver.in_flight()
        );
    } else {
        log::info!("Async pass finished after {frames} frame(s)");
    }

    io.shutdown();
    log::info!("Shut down with {} live blocks", pool.live_blocks());
    Ok(())
}
