//! Render engine abstraction.
//!
//! The actual rasterization of a map style is owned by an external engine
//! (mapnik or similar). The pipeline only depends on this
//! trait: given an extent in the engine's native coordinate reference system
//! and a destination path, the engine produces and saves one tile image.

use crate::render::RenderError;
use std::path::Path;

/// Minimum render margin, in pixels, requested around every tile extent so
/// labels and strokes that straddle tile boundaries are not clipped.
pub const MIN_RENDER_BUFFER_PX: u32 = 128;

/// An axis-aligned rectangle in the render engine's native coordinate
/// reference system (produced by a [`CoordTransform`]).
///
/// [`CoordTransform`]: crate::render::CoordTransform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

/// A handle to a map render engine.
///
/// One handle is exclusively owned by one worker for the worker's lifetime;
/// handles are assumed non-thread-safe internally and are never shared, so
/// the trait requires `Send` (to move into the worker thread) but not
/// `Sync`. Output pixel size, image format, and encoding options (quality,
/// compression, lossless mode) are fixed at handle construction.
pub trait RenderEngine: Send {
    /// Guarantee at least `pixels` of render margin around later extents.
    /// Calls with a smaller value than the current margin are no-ops.
    fn ensure_buffer(&mut self, pixels: u32);

    /// Rasterize `extent` and save the image to `path` in the engine's
    /// configured format. Blocks until the engine returns.
    fn render_to_file(&mut self, extent: &Extent, path: &Path) -> Result<(), RenderError>;
}
