//! Pipeline orchestration.
//!
//! Wires the enumerator, work queue, and workers together: spawns N render
//! workers sharing one queue, feeds them every tile the enumerator yields,
//! sends N shutdown sentinels, waits for the queue to drain, and joins every
//! worker before returning the merged tally.
//!
//! Cancellation is fail-fast: the cancel token is checked on every push, and
//! a cancelled run returns immediately without draining or cleaning up
//! already-submitted work. In-flight renders are atomic from the
//! orchestrator's point of view.

use crate::coord::BoundingBox;
use crate::pyramid::{RenderRequest, TilePyramid};
use crate::queue::{WorkItem, WorkQueue};
use crate::render::{EngineBundle, RenderError, RenderWorker, TileFormat, WorkerReport};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tracing::{info, warn};

/// Default number of render workers.
pub const DEFAULT_WORKERS: usize = 8;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 512;

/// Shared cancellation flag, set from a signal handler and polled by the
/// orchestrator between pushes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the run.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Errors that abort the whole pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An external interrupt arrived during enumeration.
    #[error("run cancelled during tile enumeration")]
    Cancelled,

    /// Creating the tile directory tree failed.
    #[error("tile directory error: {0}")]
    Io(#[from] io::Error),

    /// A worker's engine bundle could not be constructed.
    #[error("failed to construct render engine: {0}")]
    Engine(#[from] RenderError),

    /// A worker thread panicked instead of reporting.
    #[error("render worker '{0}' panicked")]
    WorkerPanicked(String),
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Renderer name tag, carried into every request for observability
    pub name: String,
    /// Root of the tile directory tree
    pub tile_dir: PathBuf,
    /// Area to render
    pub bbox: BoundingBox,
    /// Zoom range, inclusive on both ends
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Number of render workers
    pub threads: usize,
    /// Tile edge length in pixels
    pub tile_size: u32,
    /// Tile image format (determines the file extension)
    pub format: TileFormat,
    /// Enable debug-only per-tile diagnostics (empty-tile size heuristic)
    pub diagnostics: bool,
}

impl PipelineConfig {
    pub fn new(
        name: impl Into<String>,
        tile_dir: impl Into<PathBuf>,
        bbox: BoundingBox,
        min_zoom: u8,
        max_zoom: u8,
    ) -> Self {
        Self {
            name: name.into(),
            tile_dir: tile_dir.into(),
            bbox,
            min_zoom,
            max_zoom,
            threads: DEFAULT_WORKERS,
            tile_size: DEFAULT_TILE_SIZE,
            format: TileFormat::Png,
            diagnostics: false,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_format(mut self, format: TileFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

/// Merged result of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Tile requests enqueued by the enumerator
    pub enqueued: usize,
    /// Tiles rendered by the engines
    pub rendered: usize,
    /// Tiles skipped because their file already existed
    pub skipped: usize,
    /// Tiles whose render call failed
    pub failed: usize,
}

impl PipelineSummary {
    fn add(&mut self, report: WorkerReport) {
        self.rendered += report.rendered;
        self.skipped += report.skipped;
        self.failed += report.failed;
    }
}

/// Run the full pipeline.
///
/// `make_engine` is called once per worker (with the worker index) on the
/// calling thread; the returned bundle moves into that worker's thread and
/// is never shared. The call blocks until every enqueued item (sentinels
/// included) has been acknowledged and every worker has stopped.
///
/// Render failures do not abort the run; they are tallied per worker and
/// surfaced in the summary's `failed` count.
pub fn run_pipeline<F>(
    config: &PipelineConfig,
    mut make_engine: F,
    cancel: &CancelToken,
) -> Result<PipelineSummary, PipelineError>
where
    F: FnMut(usize) -> Result<EngineBundle, RenderError>,
{
    info!(
        "rendering tiles: name={} bbox=[{}] zoom={}..{} threads={} size={} format={} dir={}",
        config.name,
        config.bbox,
        config.min_zoom,
        config.max_zoom,
        config.threads,
        config.tile_size,
        config.format,
        config.tile_dir.display()
    );

    std::fs::create_dir_all(&config.tile_dir)?;

    // At least one worker must exist to consume the sentinels, or the drain
    // barrier would never clear.
    let threads = config.threads.max(1);
    let queue = Arc::new(WorkQueue::new());
    let mut workers = Vec::with_capacity(threads);

    for i in 0..threads {
        let bundle = make_engine(i)?;
        let worker = RenderWorker::new(
            Arc::clone(&queue),
            bundle,
            config.max_zoom,
            config.tile_size,
            config.diagnostics,
        );
        let name = format!("render-worker-{}", i);
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || worker.run())?;
        info!("started render worker {}", name);
        workers.push((name, handle));
    }

    let pyramid = TilePyramid::new(
        config.bbox,
        config.min_zoom,
        config.max_zoom,
        config.tile_size,
        &config.tile_dir,
        config.format.extension(),
        config.name.as_str(),
    );

    let mut summary = PipelineSummary::default();
    for item in pyramid {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let request: RenderRequest = item?;
        queue.push(WorkItem::Tile(request));
        summary.enqueued += 1;
    }

    for _ in 0..threads {
        queue.push(WorkItem::Shutdown);
    }

    queue.await_drain();

    for (name, handle) in workers {
        let report = handle
            .join()
            .map_err(|_| PipelineError::WorkerPanicked(name))?;
        summary.add(report);
    }

    if summary.failed > 0 {
        warn!(
            "{} of {} tiles failed to render",
            summary.failed, summary.enqueued
        );
    }
    info!(
        "pipeline complete: {} enqueued, {} rendered, {} skipped, {} failed",
        summary.enqueued, summary.rendered, summary.skipped, summary.failed
    );

    Ok(summary)
}
