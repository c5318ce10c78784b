//! Coordinate types for the Web Mercator tiling scheme.
//!
//! Provides the geographic, pixel, and tile coordinate value types shared by
//! the projection, enumerator, and render workers, plus the valid-domain
//! constants for longitude, latitude, and zoom.

mod types;

pub use types::{
    BoundingBox, GeoPoint, PixelPoint, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON,
    MIN_ZOOM,
};
