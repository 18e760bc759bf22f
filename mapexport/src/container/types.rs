//! Container format types and error definitions.

use crate::coord::{GeoBounds, TileAddress};
use crate::plan::ExportPlan;
use thiserror::Error;

/// File magic: "JNXT"
pub const MAGIC: [u8; 4] = *b"JNXT";

/// Format version written by this crate.
pub const FORMAT_VERSION: u16 = 1;

/// Header size in bytes.
pub const HEADER_LEN: usize = 48;

/// Size of one index record in bytes.
pub const INDEX_RECORD_LEN: usize = 24;

/// EPSG code of the spherical mercator projection.
pub const PROJECTION_WEB_MERCATOR: u32 = 3857;

/// Converts degrees to the container's fixed-point angle unit (`deg × 2^31 / 180`).
///
/// +180° does not fit an `i32` and saturates to `i32::MAX`.
pub fn to_angle_units(degrees: f64) -> i32 {
    let units = (degrees * 2_147_483_648.0 / 180.0).round();
    units.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Converts fixed-point angle units back to degrees.
pub fn from_angle_units(units: i32) -> f64 {
    f64::from(units) * 180.0 / 2_147_483_648.0
}

/// Georeference written into the container header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Georef {
    pub bounds: GeoBounds,
    pub max_zoom: u8,
    pub min_zoom: u8,
    pub level_count: u16,
}

impl Georef {
    /// Georeference matching every level of `plan`.
    pub fn from_plan(plan: &ExportPlan) -> Self {
        Self {
            bounds: *plan.bounds(),
            max_zoom: plan.max_zoom(),
            min_zoom: plan.min_zoom(),
            level_count: u16::try_from(plan.levels().len()).unwrap_or(u16::MAX),
        }
    }
}

/// Fixed 48-byte container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub version: u16,
    pub projection: u32,
    /// North, west, south, east in angle units
    pub north: i32,
    pub west: i32,
    pub south: i32,
    pub east: i32,
    pub max_zoom: u8,
    pub min_zoom: u8,
    pub level_count: u16,
    pub tile_count: u32,
    pub payload_len: u64,
}

impl ContainerHeader {
    /// Byte offset where the payload region starts.
    pub fn payload_offset(&self) -> usize {
        HEADER_LEN + INDEX_RECORD_LEN * self.tile_count as usize
    }

    /// Bounds in degrees `(north, west, south, east)`.
    pub fn bounds_degrees(&self) -> (f64, f64, f64, f64) {
        (
            from_angle_units(self.north),
            from_angle_units(self.west),
            from_angle_units(self.south),
            from_angle_units(self.east),
        )
    }
}

/// One tile record of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub address: TileAddress,
    /// Offset relative to the start of the payload region
    pub offset: u64,
    pub length: u32,
}

/// Errors found while parsing a container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("container is truncated: need {needed} bytes, have {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("bad magic bytes {0:?}")]
    BadMagic([u8; 4]),

    #[error("unsupported container version {0}")]
    UnsupportedVersion(u16),

    #[error("unexpected {field}: {actual} (expected {expected})")]
    BadLayout {
        field: &'static str,
        expected: u64,
        actual: u64,
    },

    #[error("index entry {index} is invalid: {reason}")]
    BadIndex { index: usize, reason: String },
}
