//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and spherical-mercator pixel and tile coordinates used by tiled imagery
//! sources.

mod types;

pub use types::{
    CoordError, GeoBounds, LatLon, TileAddress, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON,
    MIN_ZOOM, TILE_SIZE,
};

use std::f64::consts::PI;

/// Clamps a latitude into the range the mercator projection can represent.
#[inline]
pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(MIN_LAT, MAX_LAT)
}

/// Projects a geographic point into spherical-mercator pixel space.
///
/// The world at `zoom` is `256 * 2^zoom` pixels wide; `(0, 0)` is the
/// north-west corner. Latitude is clamped to the mercator range first.
/// Longitude is not wrapped, so an unwrapped eastern edge (greater than 180)
/// projects past the right edge of the world.
#[inline]
pub fn project(lat: f64, lon: f64, zoom: u8) -> (f64, f64) {
    let world = TILE_SIZE * 2.0_f64.powi(zoom as i32);

    let x = (lon + 180.0) / 360.0 * world;

    let lat_rad = clamp_latitude(lat).to_radians();
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * world;

    (x, y)
}

/// Converts geographic coordinates to the address of the tile containing them.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (clamped to ±85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 24)
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileAddress, CoordError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let (x, y) = project(lat, lon, zoom);
    let last = (1u64 << zoom) - 1;
    let col = ((x / TILE_SIZE).floor() as u64).min(last) as u32;
    let row = ((y / TILE_SIZE).floor() as u64).min(last) as u32;

    Ok(TileAddress::new(zoom, col, row))
}

/// Converts a tile address back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileAddress) -> LatLon {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.col as f64 / n * 360.0 - 180.0;

    let y = tile.row as f64 / n;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();

    LatLon::new(lat, lon)
}

/// Ground resolution of one pixel in meters at the given latitude and zoom.
///
/// Each step down in zoom doubles the value.
#[inline]
pub fn meters_per_pixel(lat: f64, zoom: u8) -> f64 {
    const EQUATOR_LENGTH_M: f64 = 40_075_016.0;
    EQUATOR_LENGTH_M / 2.0_f64.powi(zoom as i32) / TILE_SIZE * lat.to_radians().cos()
}
