//! Error types for tile rendering.

use std::io;
use thiserror::Error;

/// Errors surfaced by render engines and the render worker.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The external render engine failed to rasterize an extent.
    #[error("render engine failure: {0}")]
    Engine(String),

    /// Encoding the rasterized tile to the requested image format failed.
    #[error("failed to encode tile image: {0}")]
    Encoding(String),

    /// Writing the tile file failed.
    #[error("failed to write tile file: {0}")]
    Io(#[from] io::Error),
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::Encoding(err.to_string())
    }
}
