//! Bundled flat-color render engine.
//!
//! A stand-in engine that fills every tile with a single color and encodes
//! it in the requested format. It exercises the whole [`RenderEngine`] seam
//! (extent, buffer, per-format encoding options) without an external
//! rasterizer, which makes it useful for pipeline smoke runs and as the
//! default engine of the CLI when no real rasterizer is wired in.

use crate::render::{Extent, RenderEngine, RenderError, TileFormat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::trace;

/// Default fill color: a neutral light gray.
const DEFAULT_COLOR: [u8; 4] = [232, 232, 226, 255];

/// JPEG encoder quality for rendered tiles.
const JPEG_QUALITY: u8 = 100;

/// Render engine that produces solid-color tiles.
#[derive(Debug, Clone)]
pub struct FlatColorEngine {
    tile_size: u32,
    format: TileFormat,
    color: Rgba<u8>,
    buffer_px: u32,
}

impl FlatColorEngine {
    /// Create an engine emitting `tile_size`-square tiles in `format`.
    pub fn new(tile_size: u32, format: TileFormat) -> Self {
        Self {
            tile_size,
            format,
            color: Rgba(DEFAULT_COLOR),
            buffer_px: 0,
        }
    }

    /// Override the fill color (RGBA).
    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = Rgba(color);
        self
    }

    /// Current render margin in pixels.
    pub fn buffer_px(&self) -> u32 {
        self.buffer_px
    }

    fn encode(&self, image: &RgbaImage, path: &Path) -> Result<(), RenderError> {
        let writer = BufWriter::new(File::create(path)?);
        match self.format {
            TileFormat::Jpg => {
                // JPEG has no alpha channel.
                let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
                let mut encoder = JpegEncoder::new_with_quality(writer, JPEG_QUALITY);
                encoder.encode(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )?;
            }
            TileFormat::Webp => {
                let encoder = WebPEncoder::new_lossless(writer);
                encoder.encode(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgba8,
                )?;
            }
            // Palette reduction for png8/png256 is a real-rasterizer
            // concern; the bundled engine encodes all png variants as
            // full-color PNG with maximum compression.
            _ => {
                let encoder = PngEncoder::new_with_quality(
                    writer,
                    CompressionType::Best,
                    FilterType::Adaptive,
                );
                encoder.write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgba8,
                )?;
            }
        }
        Ok(())
    }
}

impl RenderEngine for FlatColorEngine {
    fn ensure_buffer(&mut self, pixels: u32) {
        if self.buffer_px < pixels {
            self.buffer_px = pixels;
        }
    }

    fn render_to_file(&mut self, extent: &Extent, path: &Path) -> Result<(), RenderError> {
        trace!(
            "flat fill of [{}, {}, {}, {}] -> {}",
            extent.min_x,
            extent.min_y,
            extent.max_x,
            extent.max_y,
            path.display()
        );
        let image = RgbaImage::from_pixel(self.tile_size, self.tile_size, self.color);
        self.encode(&image, path)
    }
}
