//! Tile rendering: the engine seam, coordinate transforms, image formats,
//! and the worker loop that drives them.
//!
//! The pipeline treats rasterization as an external capability behind the
//! [`RenderEngine`] trait; [`FlatColorEngine`] is a bundled stand-in that
//! fills tiles with a single color. Each worker owns its engine handle,
//! coordinate transform, and projection exclusively; none of them are
//! shared across threads.

mod engine;
mod error;
mod flat;
mod format;
mod transform;
mod worker;

pub use engine::{Extent, RenderEngine, MIN_RENDER_BUFFER_PX};
pub use error::RenderError;
pub use flat::FlatColorEngine;
pub use format::{TileFormat, UnknownFormat};
pub use transform::{CoordTransform, IdentityTransform, LonLatToWebMercator};
pub use worker::{tile_geo_bounds, EngineBundle, RenderWorker, WorkerReport};
