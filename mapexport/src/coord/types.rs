//! Coordinate type definitions

use std::fmt;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Zoom levels accepted anywhere in the pipeline
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 24;

/// Edge length of one raster tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A geographic rectangle given by its north-west and south-east corners.
///
/// When `east < west` the rectangle crosses the antimeridian and its eastern
/// edge lies at `east + 360`. A point or a line (zero height or width) is a
/// valid rectangle; the planner still covers it with at least one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    north: f64,
    west: f64,
    south: f64,
    east: f64,
}

impl GeoBounds {
    /// Builds bounds from edge values in degrees.
    ///
    /// Longitudes outside ±180 are accepted (map widgets report them after
    /// panning across the antimeridian) and normalized.
    pub fn new(north: f64, west: f64, south: f64, east: f64) -> Result<Self, CoordError> {
        for lat in [north, south] {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(CoordError::InvalidLatitude(lat));
            }
        }
        for lon in [west, east] {
            if !lon.is_finite() {
                return Err(CoordError::InvalidLongitude(lon));
            }
        }
        if north < south {
            return Err(CoordError::InvertedLatitudes { north, south });
        }

        // Keep a span of 360° or more as "whole world" instead of folding it to zero.
        if east - west >= 360.0 {
            return Ok(Self {
                north,
                west: MIN_LON,
                south,
                east: MAX_LON,
            });
        }

        Ok(Self {
            north,
            west: normalize_lon(west),
            south,
            east: normalize_lon(east),
        })
    }

    /// Builds bounds from two corners.
    pub fn from_corners(north_west: LatLon, south_east: LatLon) -> Result<Self, CoordError> {
        Self::new(north_west.lat, north_west.lon, south_east.lat, south_east.lon)
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn north_west(&self) -> LatLon {
        LatLon::new(self.north, self.west)
    }

    pub fn south_east(&self) -> LatLon {
        LatLon::new(self.south, self.east)
    }

    /// Returns true if the rectangle crosses the antimeridian.
    pub fn crosses_antimeridian(&self) -> bool {
        self.east < self.west
    }

    /// Longitudinal extent in degrees (0 to 360).
    pub fn lon_span(&self) -> f64 {
        if self.crosses_antimeridian() {
            self.east + 360.0 - self.west
        } else {
            self.east - self.west
        }
    }

    /// Eastern edge unwrapped so that it is never less than `west`.
    pub fn unwrapped_east(&self) -> f64 {
        self.west + self.lon_span()
    }

    /// Geographic center of the rectangle.
    pub fn center(&self) -> LatLon {
        let lon = normalize_lon(self.west + self.lon_span() / 2.0);
        LatLon::new((self.north + self.south) / 2.0, lon)
    }
}

impl fmt::Display for GeoBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.5}, {:.5}] - [{:.5}, {:.5}]",
            self.north, self.west, self.south, self.east
        )
    }
}

/// Wraps a longitude into `[-180, 180]`, keeping `180` itself.
fn normalize_lon(lon: f64) -> f64 {
    if (MIN_LON..=MAX_LON).contains(&lon) {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == MIN_LON && lon > 0.0 {
        MAX_LON
    } else {
        wrapped
    }
}

/// Address of one tile in the power-of-two tile pyramid.
///
/// Field order gives the derived ordering `(zoom, row, col)`, which is the
/// order tiles are laid out in an export container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileAddress {
    /// Zoom level
    pub zoom: u8,
    /// Y coordinate (north-south), 0 at north
    pub row: u32,
    /// X coordinate (east-west), 0 at west
    pub col: u32,
}

impl TileAddress {
    /// Creates an address from zoom, column (x) and row (y).
    pub fn new(zoom: u8, col: u32, row: u32) -> Self {
        Self { zoom, row, col }
    }

    /// Number of tiles along one axis at this address's zoom.
    #[inline]
    pub fn grid_size(&self) -> u64 {
        1u64 << self.zoom
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "z={} x={} y={}", self.zoom, self.col, self.row)
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is not a finite value within ±90
    InvalidLatitude(f64),
    /// Longitude is not a finite value
    InvalidLongitude(f64),
    /// North edge lies south of the south edge
    InvertedLatitudes { north: f64, south: f64 },
    /// Zoom level is outside valid range (0 to 24)
    InvalidZoom(u8),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(f, "Invalid latitude: {} (must be between -90 and 90)", lat)
            }
            CoordError::InvalidLongitude(lon) => {
                write!(f, "Invalid longitude: {} (must be a finite number)", lon)
            }
            CoordError::InvertedLatitudes { north, south } => {
                write!(
                    f,
                    "Invalid bounds: north edge {} lies south of south edge {}",
                    north, south
                )
            }
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between {} and {})",
                    zoom, MIN_ZOOM, MAX_ZOOM
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
