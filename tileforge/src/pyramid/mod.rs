//! Tile-pyramid enumeration.
//!
//! Decomposes a geographic bounding box into the (zoom, x, y) tile
//! coordinates that cover it across a zoom range, creating the on-disk
//! directory skeleton (`{tile_dir}/{z}/{x}`) as it goes and yielding one
//! [`RenderRequest`] per surviving coordinate.
//!
//! The enumeration is a bounding rectangle of tile indices, not a precise
//! polygon intersection: for boxes much smaller than a tile it may yield
//! tiles that do not intersect the box at all. Over-coverage is accepted;
//! under-coverage never happens. Indices that fall outside `[0, 2^z)` at the
//! box edges are expected and discarded silently.

use crate::coord::{BoundingBox, TileCoord};
use crate::projection::MercatorProjection;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A unit of work for one tile: consumed exactly once by exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Renderer name tag carried through for observability
    pub name: String,
    /// Destination file path `{tile_dir}/{z}/{x}/{y}.{ext}`
    pub uri: PathBuf,
    /// Identity of the tile
    pub coord: TileCoord,
}

/// Lazy, finite, single-pass iterator over the tiles covering a bounding
/// box for every zoom level in `[min_zoom, max_zoom]` ascending.
///
/// Not restartable: build a fresh pyramid (it owns its own projection) for
/// each run. Directory-creation failures surface as the iterator item.
pub struct TilePyramid {
    projection: MercatorProjection,
    bbox: BoundingBox,
    max_zoom: u8,
    tile_size: u32,
    tile_dir: PathBuf,
    tile_ext: String,
    name: String,

    zoom: u8,
    // Inclusive tile-index bounds for the current zoom, derived from the
    // projected box corners by truncating division.
    x_max: i64,
    y_min: i64,
    y_max: i64,
    x: i64,
    y: i64,
    zoom_ready: bool,
    x_dir_ready: bool,
    poisoned: bool,
}

impl TilePyramid {
    /// Create an enumerator for `bbox` over `[min_zoom, max_zoom]`.
    ///
    /// `tile_dir` must already exist (the orchestrator creates the root);
    /// per-zoom and per-column subdirectories are created lazily and
    /// idempotently during iteration.
    pub fn new(
        bbox: BoundingBox,
        min_zoom: u8,
        max_zoom: u8,
        tile_size: u32,
        tile_dir: impl Into<PathBuf>,
        tile_ext: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            projection: MercatorProjection::new(max_zoom + 1, tile_size),
            bbox,
            max_zoom,
            tile_size,
            tile_dir: tile_dir.into(),
            tile_ext: tile_ext.into(),
            name: name.into(),
            zoom: min_zoom,
            x_max: 0,
            y_min: 0,
            y_max: 0,
            x: 0,
            y: 0,
            zoom_ready: false,
            x_dir_ready: false,
            poisoned: false,
        }
    }

    fn zoom_dir(&self) -> PathBuf {
        self.tile_dir.join(self.zoom.to_string())
    }

    fn column_dir(&self) -> PathBuf {
        self.zoom_dir().join(self.x.to_string())
    }

    fn tile_uri(&self) -> PathBuf {
        self.column_dir()
            .join(format!("{}.{}", self.y, self.tile_ext))
    }

    /// Project the box corners at the current zoom and derive the inclusive
    /// tile-index rectangle.
    fn enter_zoom(&mut self) -> io::Result<()> {
        let size = self.tile_size as i64;
        let px0 = self
            .projection
            .to_pixel(self.bbox.north_west(), self.zoom);
        let px1 = self
            .projection
            .to_pixel(self.bbox.south_east(), self.zoom);

        self.x = px0.x / size;
        self.x_max = px1.x / size;
        self.y_min = px0.y / size;
        self.y_max = px1.y / size;
        self.y = self.y_min;
        self.x_dir_ready = false;

        create_dir_idempotent(&self.zoom_dir())
    }

    fn advance_column(&mut self) {
        self.x += 1;
        self.y = self.y_min;
        self.x_dir_ready = false;
    }
}

impl Iterator for TilePyramid {
    type Item = io::Result<RenderRequest>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }

        loop {
            if self.zoom > self.max_zoom {
                return None;
            }

            if !self.zoom_ready {
                if let Err(e) = self.enter_zoom() {
                    self.poisoned = true;
                    return Some(Err(e));
                }
                self.zoom_ready = true;
            }

            if self.x > self.x_max {
                self.zoom += 1;
                self.zoom_ready = false;
                continue;
            }

            let axis = TileCoord::axis_tiles(self.zoom) as i64;

            if self.x < 0 || self.x >= axis {
                self.advance_column();
                continue;
            }

            if !self.x_dir_ready {
                if let Err(e) = create_dir_idempotent(&self.column_dir()) {
                    self.poisoned = true;
                    return Some(Err(e));
                }
                self.x_dir_ready = true;
            }

            if self.y > self.y_max {
                self.advance_column();
                continue;
            }

            if self.y < 0 || self.y >= axis {
                self.y += 1;
                continue;
            }

            let request = RenderRequest {
                name: self.name.clone(),
                uri: self.tile_uri(),
                coord: TileCoord::new(self.x as u32, self.y as u32, self.zoom),
            };
            self.y += 1;
            return Some(Ok(request));
        }
    }
}

fn create_dir_idempotent(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}
