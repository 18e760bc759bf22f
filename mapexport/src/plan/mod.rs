//! Export planning: which tiles to fetch and what it will cost.
//!
//! An export covers the requested zoom and up to [`ZOOM_BAND`] coarser levels
//! beneath it. For each level the planner projects the selected rectangle into
//! spherical-mercator pixel space and covers it with an inclusive tile
//! rectangle. Partially covered edge tiles count in full.
//!
//! ```
//! use mapexport::coord::GeoBounds;
//! use mapexport::plan::{plan_export, estimate_byte_size};
//!
//! let bounds = GeoBounds::new(0.005, -0.005, -0.005, 0.005).unwrap();
//! let plan = plan_export(&bounds, 10, 4).unwrap();
//! assert_eq!(plan.levels().len(), 7);
//! let bytes = estimate_byte_size(plan.total_tiles());
//! assert!(bytes > 0.0);
//! ```

mod options;

pub use options::{export_options, ExportOption};

use crate::coord::{project, CoordError, GeoBounds, TileAddress, MAX_ZOOM, TILE_SIZE};
use std::ops::RangeInclusive;
use thiserror::Error;

/// Number of coarser zoom levels included below the requested zoom.
pub const ZOOM_BAND: u8 = 6;

/// Calibrated average size of one exported tile, in megabytes.
///
/// This is a heuristic for cost display, not a measurement.
pub const AVERAGE_TILE_MB: f64 = 0.02;

/// [`AVERAGE_TILE_MB`] expressed in bytes.
pub const AVERAGE_TILE_BYTES: f64 = AVERAGE_TILE_MB * 1_000_000.0;

/// Tile count above which an export option is flagged as expensive.
pub const DEFAULT_WARN_TILE_COUNT: u64 = 50_000;

/// Errors detected while planning, before any network activity.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    /// The selected rectangle is unusable
    #[error("invalid bounds: {0}")]
    InvalidBounds(#[from] CoordError),

    /// Zoom outside what the layer or the tile pyramid supports
    #[error("zoom {zoom} is outside the supported range {min}..={max}")]
    ZoomOutOfRange { zoom: u8, min: u8, max: u8 },
}

/// Inclusive tile rectangle covering the export bounds at one zoom level.
///
/// Columns past `2^zoom - 1` occur when the bounds cross the antimeridian;
/// [`TileGridPlan::addresses`] wraps them back into the pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGridPlan {
    zoom: u8,
    min_col: u32,
    max_col: u32,
    min_row: u32,
    max_row: u32,
}

impl TileGridPlan {
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn min_col(&self) -> u32 {
        self.min_col
    }

    pub fn max_col(&self) -> u32 {
        self.max_col
    }

    pub fn min_row(&self) -> u32 {
        self.min_row
    }

    pub fn max_row(&self) -> u32 {
        self.max_row
    }

    /// Number of tile columns (at least 1).
    pub fn cols(&self) -> u64 {
        (self.max_col - self.min_col) as u64 + 1
    }

    /// Number of tile rows (at least 1).
    pub fn rows(&self) -> u64 {
        (self.max_row - self.min_row) as u64 + 1
    }

    /// Number of tiles in the rectangle.
    pub fn tile_count(&self) -> u64 {
        self.cols() * self.rows()
    }

    /// Yields every tile address in row-major order (north to south, west to east).
    pub fn addresses(&self) -> impl Iterator<Item = TileAddress> + '_ {
        let n = 1u64 << self.zoom;
        (self.min_row..=self.max_row).flat_map(move |row| {
            (self.min_col..=self.max_col)
                .map(move |col| TileAddress::new(self.zoom, (col as u64 % n) as u32, row))
        })
    }
}

/// Ordered per-level grids for one export, finest zoom first.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    bounds: GeoBounds,
    levels: Vec<TileGridPlan>,
}

impl ExportPlan {
    pub fn bounds(&self) -> &GeoBounds {
        &self.bounds
    }

    /// Levels from the requested zoom down to the minimum zoom.
    pub fn levels(&self) -> &[TileGridPlan] {
        &self.levels
    }

    /// The requested (finest) zoom.
    pub fn max_zoom(&self) -> u8 {
        self.levels.first().map(|l| l.zoom).unwrap_or_default()
    }

    /// The coarsest zoom included.
    pub fn min_zoom(&self) -> u8 {
        self.levels.last().map(|l| l.zoom).unwrap_or_default()
    }

    /// Sum of tile counts over all levels.
    pub fn total_tiles(&self) -> u64 {
        self.levels.iter().map(TileGridPlan::tile_count).sum()
    }
}

/// Computes the coarsest zoom exported together with `zoom`.
///
/// `zoom - 6`, never below the layer's own minimum or 0.
pub fn min_zoom(zoom: u8, layer_min_zoom: u8) -> u8 {
    zoom.saturating_sub(ZOOM_BAND).max(layer_min_zoom)
}

/// Covers `bounds` with an inclusive tile rectangle at `zoom`.
///
/// The north-west corner is floored and the south-east corner ceiled, so any
/// tile touched by the bounds is included. A degenerate rectangle still gets
/// one tile per axis; a full-longitude span gets every column.
pub fn plan_grid(bounds: &GeoBounds, zoom: u8) -> Result<TileGridPlan, PlanningError> {
    if zoom > MAX_ZOOM {
        return Err(PlanningError::ZoomOutOfRange {
            zoom,
            min: 0,
            max: MAX_ZOOM,
        });
    }

    let n = 1u64 << zoom;
    let (west_px, north_px) = project(bounds.north(), bounds.west(), zoom);
    let (east_px, south_px) = project(bounds.south(), bounds.unwrapped_east(), zoom);

    let min_col = ((west_px.max(0.0) / TILE_SIZE).floor() as u64).min(n - 1);
    let end_col = (east_px.max(0.0) / TILE_SIZE).ceil() as u64;
    let cols = end_col.saturating_sub(min_col).clamp(1, n);

    let min_row = ((north_px.max(0.0) / TILE_SIZE).floor() as u64).min(n - 1);
    let end_row = ((south_px.max(0.0) / TILE_SIZE).ceil() as u64).min(n);
    let rows = end_row.saturating_sub(min_row).max(1);

    Ok(TileGridPlan {
        zoom,
        min_col: min_col as u32,
        max_col: (min_col + cols - 1) as u32,
        min_row: min_row as u32,
        max_row: (min_row + rows - 1) as u32,
    })
}

/// Plans every level of an export, from `zoom` down to [`min_zoom`].
pub fn plan_export(
    bounds: &GeoBounds,
    zoom: u8,
    layer_min_zoom: u8,
) -> Result<ExportPlan, PlanningError> {
    if zoom > MAX_ZOOM || layer_min_zoom > zoom {
        return Err(PlanningError::ZoomOutOfRange {
            zoom,
            min: layer_min_zoom,
            max: MAX_ZOOM,
        });
    }

    let levels = (min_zoom(zoom, layer_min_zoom)..=zoom)
        .rev()
        .map(|z| plan_grid(bounds, z))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExportPlan {
        bounds: *bounds,
        levels,
    })
}

/// Total number of tiles needed to cover `bounds` at every zoom in `zooms`.
pub fn estimate_tile_count(
    bounds: &GeoBounds,
    zooms: RangeInclusive<u8>,
) -> Result<u64, PlanningError> {
    zooms
        .map(|z| plan_grid(bounds, z).map(|grid| grid.tile_count()))
        .sum()
}

/// Estimated container size in bytes for `tile_count` tiles.
pub fn estimate_byte_size(tile_count: u64) -> f64 {
    tile_count as f64 * AVERAGE_TILE_BYTES
}
