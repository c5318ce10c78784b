//! Spherical Web Mercator ("Google") tile projection.
//!
//! Converts between geographic coordinates (longitude/latitude in degrees)
//! and pixel coordinates on the square world grid that doubles in resolution
//! per zoom level. All per-zoom constants are precomputed once at
//! construction and never mutated afterwards.
//!
//! `to_pixel` and `to_geo` are *not* exact inverses: `to_pixel` rounds to the
//! nearest integer pixel, so a round trip may drift by up to one pixel of
//! geographic distance at that zoom. Tile enumeration only depends on
//! `to_pixel` being consistent, never on round-trip exactness.

use crate::coord::{GeoPoint, PixelPoint};
use std::f64::consts::PI;

/// Clamp applied to `sin(latitude)` before the inverse Gudermannian so the
/// logarithm stays finite at the poles.
const SIN_LAT_CLAMP: f64 = 0.9999;

/// Per-zoom projection constants derived from `tile_size * 2^zoom`.
#[derive(Debug, Clone, Copy)]
struct ZoomScale {
    /// Pixels per degree of longitude (`c / 360`)
    pixels_per_degree: f64,
    /// Pixels per radian (`c / 2π`)
    pixels_per_radian: f64,
    /// Pixel offset of the projection center (`c / 2`)
    center: f64,
}

/// Web Mercator projection with precomputed constants for a zoom range.
///
/// Cheap to build and exclusively owned by whoever built it; workers each
/// construct their own rather than sharing one.
#[derive(Debug, Clone)]
pub struct MercatorProjection {
    scales: Vec<ZoomScale>,
}

impl MercatorProjection {
    /// Precompute constants for every zoom level in `[0, levels)`.
    ///
    /// `levels` is an exclusive upper bound: pass `max_zoom + 1` to make
    /// `max_zoom` usable.
    pub fn new(levels: u8, tile_size: u32) -> Self {
        let mut scales = Vec::with_capacity(levels as usize);
        let mut c = tile_size as f64;
        for _ in 0..levels {
            scales.push(ZoomScale {
                pixels_per_degree: c / 360.0,
                pixels_per_radian: c / (2.0 * PI),
                center: c / 2.0,
            });
            c *= 2.0;
        }
        Self { scales }
    }

    /// Number of precomputed zoom levels.
    pub fn levels(&self) -> u8 {
        self.scales.len() as u8
    }

    /// Project a geographic point to integer pixel coordinates at `zoom`.
    ///
    /// Longitude maps linearly; latitude goes through the inverse
    /// Gudermannian with `sin(lat)` clamped to `[-0.9999, 0.9999]`. The
    /// result is rounded to the nearest pixel.
    ///
    /// # Panics
    ///
    /// Panics if `zoom` is not within the precomputed range. An
    /// out-of-range zoom is a programming-contract violation, not a
    /// recoverable error.
    pub fn to_pixel(&self, point: GeoPoint, zoom: u8) -> PixelPoint {
        let scale = &self.scales[zoom as usize];
        let x = (scale.center + point.lon * scale.pixels_per_degree).round();
        let f = point
            .lat
            .to_radians()
            .sin()
            .clamp(-SIN_LAT_CLAMP, SIN_LAT_CLAMP);
        let y =
            (scale.center + 0.5 * ((1.0 + f) / (1.0 - f)).ln() * -scale.pixels_per_radian).round();
        PixelPoint::new(x as i64, y as i64)
    }

    /// Unproject pixel coordinates at `zoom` back to a geographic point.
    ///
    /// Exact algebraic inverse of the unrounded forward mapping; the result
    /// is not rounded.
    ///
    /// # Panics
    ///
    /// Panics if `zoom` is not within the precomputed range.
    pub fn to_geo(&self, pixel: PixelPoint, zoom: u8) -> GeoPoint {
        let scale = &self.scales[zoom as usize];
        let lon = (pixel.x as f64 - scale.center) / scale.pixels_per_degree;
        let g = (pixel.y as f64 - scale.center) / -scale.pixels_per_radian;
        let lat = (2.0 * g.exp().atan() - 0.5 * PI).to_degrees();
        GeoPoint::new(lon, lat)
    }
}
