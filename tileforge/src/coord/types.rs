//! Coordinate type definitions.

use std::fmt;

/// Valid longitude range in degrees.
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Web Mercator projectable latitude range in degrees.
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Zoom levels accepted by the CLI surface.
pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 17;

/// A geographic point in degrees.
///
/// Longitude is valid in `[-180, 180]`, latitude in the Mercator
/// projectable range `[-85.05112878, 85.05112878]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Longitude in degrees, positive east
    pub lon: f64,
    /// Latitude in degrees, positive north
    pub lat: f64,
}

impl GeoPoint {
    /// Create a geographic point without range checking.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Clamp both components into the valid Mercator domain.
    pub fn clamped(self) -> Self {
        Self {
            lon: self.lon.clamp(MIN_LON, MAX_LON),
            lat: self.lat.clamp(MIN_LAT, MAX_LAT),
        }
    }
}

/// A point in pixel units at a specific zoom level.
///
/// Derived from a [`GeoPoint`] by the projection; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

impl PixelPoint {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Tile coordinates in the Web Mercator ("Google" / slippy map) grid.
///
/// The identity of a tile: it maps 1:1 to the on-disk path
/// `{tile_dir}/{zoom}/{x}/{y}.{ext}`. For a given zoom `z` both indices
/// must satisfy `0 <= i < 2^z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// X index (east-west), 0 at west
    pub x: u32,
    /// Y index (north-south), 0 at north
    pub y: u32,
    /// Zoom level
    pub zoom: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Number of tiles along one axis at this zoom level.
    #[inline]
    pub fn axis_tiles(zoom: u8) -> u64 {
        1u64 << zoom
    }

    /// Whether both indices are inside `[0, 2^zoom)`.
    pub fn is_valid(&self) -> bool {
        let n = Self::axis_tiles(self.zoom);
        (self.x as u64) < n && (self.y as u64) < n
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// An axis-aligned geographic rectangle bounding the area to render.
///
/// Normalized on construction: west/east clamped to `[-180, 180]`,
/// south/north clamped to the Mercator-valid latitude range. Owned by the
/// caller for a whole run and read-only to every component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Create a bounding box, clamping every edge into the valid domain.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west: west.clamp(MIN_LON, MAX_LON),
            south: south.clamp(MIN_LAT, MAX_LAT),
            east: east.clamp(MIN_LON, MAX_LON),
            north: north.clamp(MIN_LAT, MAX_LAT),
        }
    }

    /// The whole Mercator-projectable extent.
    pub fn world() -> Self {
        Self::new(MIN_LON, MIN_LAT, MAX_LON, MAX_LAT)
    }

    /// Northwest corner.
    pub fn north_west(&self) -> GeoPoint {
        GeoPoint::new(self.west, self.north)
    }

    /// Southeast corner.
    pub fn south_east(&self) -> GeoPoint {
        GeoPoint::new(self.east, self.south)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}, {}", self.west, self.south, self.east, self.north)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_clamped_inside_range_is_unchanged() {
        let p = GeoPoint::new(10.5, -42.0).clamped();
        assert_eq!(p.lon, 10.5);
        assert_eq!(p.lat, -42.0);
    }

    #[test]
    fn test_geo_point_clamped_at_poles() {
        let p = GeoPoint::new(200.0, 90.0).clamped();
        assert_eq!(p.lon, MAX_LON);
        assert_eq!(p.lat, MAX_LAT);

        let q = GeoPoint::new(-200.0, -90.0).clamped();
        assert_eq!(q.lon, MIN_LON);
        assert_eq!(q.lat, MIN_LAT);
    }

    #[test]
    fn test_tile_coord_validity_bounds() {
        assert!(TileCoord::new(0, 0, 0).is_valid());
        assert!(!TileCoord::new(1, 0, 0).is_valid());
        assert!(TileCoord::new(31, 31, 5).is_valid());
        assert!(!TileCoord::new(32, 0, 5).is_valid());
        assert!(!TileCoord::new(0, 32, 5).is_valid());
    }

    #[test]
    fn test_tile_coord_display_is_zoom_x_y() {
        let coord = TileCoord::new(4, 7, 5);
        assert_eq!(coord.to_string(), "5/4/7");
    }

    #[test]
    fn test_axis_tiles_doubles_per_zoom() {
        assert_eq!(TileCoord::axis_tiles(0), 1);
        assert_eq!(TileCoord::axis_tiles(1), 2);
        assert_eq!(TileCoord::axis_tiles(10), 1024);
    }

    #[test]
    fn test_bounding_box_clamps_out_of_domain_edges() {
        let bbox = BoundingBox::new(-360.0, -90.0, 360.0, 90.0);
        assert_eq!(bbox.west, MIN_LON);
        assert_eq!(bbox.south, MIN_LAT);
        assert_eq!(bbox.east, MAX_LON);
        assert_eq!(bbox.north, MAX_LAT);
    }

    #[test]
    fn test_bounding_box_world_covers_full_extent() {
        let world = BoundingBox::world();
        assert_eq!(world.north_west(), GeoPoint::new(MIN_LON, MAX_LAT));
        assert_eq!(world.south_east(), GeoPoint::new(MAX_LON, MIN_LAT));
    }

    #[test]
    fn test_bounding_box_display_is_comma_separated() {
        let bbox = BoundingBox::new(10.0, 10.0, 11.0, 11.0);
        assert_eq!(bbox.to_string(), "10, 10, 11, 11");
    }
}
