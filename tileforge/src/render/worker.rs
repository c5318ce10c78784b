//! Render worker loop.
//!
//! A worker pulls items off the shared [`WorkQueue`] until it pops a
//! shutdown sentinel: Running until the sentinel arrives, Stopped after.
//! For each tile it computes the tile's geographic bounds via its own
//! projection, reprojects them with its own coordinate transform, and asks
//! its own render engine to materialize the file, unless the file already
//! exists, in which case the tile is skipped. Nothing in this bundle is
//! shared across workers.
//!
//! A render failure does not kill the worker: the failing tile coordinate is
//! logged and counted, and the loop continues. Every popped item is
//! acknowledged exactly once regardless of outcome.

use crate::coord::{BoundingBox, PixelPoint, TileCoord};
use crate::projection::MercatorProjection;
use crate::pyramid::RenderRequest;
use crate::queue::{WorkItem, WorkQueue};
use crate::render::{CoordTransform, RenderEngine, RenderError, MIN_RENDER_BUFFER_PX};
use std::sync::Arc;
use tracing::{debug, error};

/// File sizes (bytes) of known fully-transparent/blank encoder outputs.
/// Diagnostic only: flagged at debug level, never treated as an error.
const EMPTY_TILE_SIZES: [u64; 3] = [103, 126, 222];

/// The exclusively-owned resources of one worker: a render engine handle and
/// the coordinate transform into that engine's native frame.
pub struct EngineBundle {
    pub engine: Box<dyn RenderEngine>,
    pub transform: Box<dyn CoordTransform>,
}

/// Per-worker tally, merged by the orchestrator after join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// Tiles rendered by the engine
    pub rendered: usize,
    /// Tiles skipped because the destination file already existed
    pub skipped: usize,
    /// Tiles whose render call failed
    pub failed: usize,
}

/// One consumer of the work queue.
pub struct RenderWorker {
    queue: Arc<WorkQueue>,
    projection: MercatorProjection,
    bundle: EngineBundle,
    tile_size: u32,
    diagnostics: bool,
    report: WorkerReport,
}

impl RenderWorker {
    /// Build a worker around its own resource bundle.
    ///
    /// The projection table covers `[0, max_zoom]`; each worker builds its
    /// own rather than sharing one.
    pub fn new(
        queue: Arc<WorkQueue>,
        bundle: EngineBundle,
        max_zoom: u8,
        tile_size: u32,
        diagnostics: bool,
    ) -> Self {
        Self {
            queue,
            projection: MercatorProjection::new(max_zoom + 1, tile_size),
            bundle,
            tile_size,
            diagnostics,
            report: WorkerReport::default(),
        }
    }

    /// Consume items until the shutdown sentinel, then return the tally.
    pub fn run(mut self) -> WorkerReport {
        loop {
            match self.queue.pop() {
                WorkItem::Shutdown => {
                    self.queue.mark_done();
                    return self.report;
                }
                WorkItem::Tile(request) => {
                    self.process(&request);
                    self.queue.mark_done();
                }
            }
        }
    }

    fn process(&mut self, request: &RenderRequest) {
        let exists = request.uri.is_file();
        if exists {
            self.report.skipped += 1;
        } else if let Err(e) = self.render(request) {
            error!(
                "failed to render tile {} to {}: {}",
                request.coord,
                request.uri.display(),
                e
            );
            self.report.failed += 1;
            return;
        } else {
            self.report.rendered += 1;
        }

        if self.diagnostics {
            if let Ok(meta) = std::fs::metadata(&request.uri) {
                if EMPTY_TILE_SIZES.contains(&meta.len()) {
                    debug!("({} : {}, empty)", request.name, request.coord);
                }
            }
        }
        debug!(
            "({} : {}{})",
            request.name,
            request.coord,
            if exists { ", exists" } else { "" }
        );
    }

    fn render(&mut self, request: &RenderRequest) -> Result<(), RenderError> {
        let geo = tile_geo_bounds(&self.projection, request.coord, self.tile_size);
        let extent = self.bundle.transform.forward(&geo);
        self.bundle.engine.ensure_buffer(MIN_RENDER_BUFFER_PX);
        self.bundle.engine.render_to_file(&extent, &request.uri)
    }
}

/// Geographic bounds of a tile, from the unrounded inverse projection of its
/// bottom-left and top-right pixel corners.
pub fn tile_geo_bounds(
    projection: &MercatorProjection,
    coord: TileCoord,
    tile_size: u32,
) -> BoundingBox {
    let size = tile_size as i64;
    let x = coord.x as i64;
    let y = coord.y as i64;

    // Bottom-left then top-right corner, in pixel space.
    let p0 = PixelPoint::new(x * size, (y + 1) * size);
    let p1 = PixelPoint::new((x + 1) * size, y * size);

    let sw = projection.to_geo(p0, coord.zoom);
    let ne = projection.to_geo(p1, coord.zoom);

    BoundingBox::new(sw.lon, sw.lat, ne.lon, ne.lat)
}
