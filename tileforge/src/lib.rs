//! tileforge: tile-pyramid render pipeline.
//!
//! Decomposes a geographic bounding box into square Web Mercator raster
//! tiles across a zoom range and drives a bounded pool of workers that
//! render each tile to a predictable on-disk path, skipping tiles that
//! already exist. Rasterization itself is an external capability behind the
//! [`render::RenderEngine`] trait, and packaging the finished tree into a
//! container archive is external behind [`container::ContainerPackager`].
//!
//! # Example
//!
//! ```no_run
//! use tileforge::coord::BoundingBox;
//! use tileforge::pipeline::{run_pipeline, CancelToken, PipelineConfig};
//! use tileforge::render::{EngineBundle, FlatColorEngine, LonLatToWebMercator, TileFormat};
//!
//! let config = PipelineConfig::new(
//!     "basemap",
//!     "tiles",
//!     BoundingBox::new(10.0, 10.0, 11.0, 11.0),
//!     1,
//!     5,
//! )
//! .with_threads(8)
//! .with_tile_size(512)
//! .with_format(TileFormat::Png);
//!
//! let summary = run_pipeline(
//!     &config,
//!     |_| {
//!         Ok(EngineBundle {
//!             engine: Box::new(FlatColorEngine::new(512, TileFormat::Png)),
//!             transform: Box::new(LonLatToWebMercator),
//!         })
//!     },
//!     &CancelToken::new(),
//! )?;
//! println!("rendered {} tiles", summary.rendered);
//! # Ok::<(), tileforge::pipeline::PipelineError>(())
//! ```

pub mod container;
pub mod coord;
pub mod logging;
pub mod pipeline;
pub mod projection;
pub mod pyramid;
pub mod queue;
pub mod render;

/// Version of the tileforge library and CLI, injected from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
