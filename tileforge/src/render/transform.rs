//! Coordinate transforms between the tiling scheme's geographic frame and a
//! render engine's native coordinate reference system.
//!
//! Built once per worker from the target map's declared spatial reference
//! and owned exclusively by that worker.

use crate::coord::BoundingBox;
use crate::render::Extent;

/// Reprojects a geographic bounding box into an engine-native extent.
pub trait CoordTransform: Send {
    /// Forward-project `bbox` (longitude/latitude degrees) into the target
    /// frame.
    fn forward(&self, bbox: &BoundingBox) -> Extent;
}

/// Pass-through for engines whose native frame is geographic degrees
/// (EPSG:4326).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl CoordTransform for IdentityTransform {
    fn forward(&self, bbox: &BoundingBox) -> Extent {
        Extent::new(bbox.west, bbox.south, bbox.east, bbox.north)
    }
}

/// WGS84 spherical radius in meters used by the Web Mercator projection.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// EPSG:4326 → EPSG:3857: geographic degrees to spherical Web Mercator
/// meters, the native frame of most tiled map styles.
#[derive(Debug, Clone, Copy, Default)]
pub struct LonLatToWebMercator;

impl LonLatToWebMercator {
    fn project(lon: f64, lat: f64) -> (f64, f64) {
        let x = lon.to_radians() * EARTH_RADIUS_M;
        let y = (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln() * EARTH_RADIUS_M;
        (x, y)
    }
}

impl CoordTransform for LonLatToWebMercator {
    fn forward(&self, bbox: &BoundingBox) -> Extent {
        let (min_x, min_y) = Self::project(bbox.west, bbox.south);
        let (max_x, max_y) = Self::project(bbox.east, bbox.north);
        Extent::new(min_x, min_y, max_x, max_y)
    }
}
