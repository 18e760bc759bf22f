//! Per-zoom export choices shown to the user before an export starts.

use super::{estimate_tile_count, min_zoom, plan_grid, PlanningError, AVERAGE_TILE_MB};
use crate::coord::{meters_per_pixel, GeoBounds};
use crate::layer::ExportLayer;

/// One selectable export zoom with its estimated cost.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOption {
    /// Finest zoom of the export
    pub zoom: u8,
    /// Ground resolution at the center of the bounds
    pub meters_per_pixel: f64,
    /// Tiles over the whole zoom band of this option
    pub tile_count: u64,
    /// Estimated output size in megabytes
    pub size_mb: f64,
    /// Human-readable summary line
    pub label: String,
    /// Tile count exceeds the advisory threshold
    pub warning: bool,
    /// Explanation shown next to flagged options
    pub tooltip: Option<String>,
}

/// Lists export options for `layer` over `bounds`, finest zoom first.
///
/// Offers every zoom from the layer's maximum native zoom down six levels
/// (never below the layer's minimum). Each option's tile count covers its
/// own zoom band, matching what an export at that zoom would fetch.
pub fn export_options(
    layer: &ExportLayer,
    bounds: &GeoBounds,
    warn_tile_count: u64,
) -> Result<Vec<ExportOption>, PlanningError> {
    let max_level = layer.export_max_zoom();
    let min_level = min_zoom(max_level, layer.export_min_zoom());
    let center_lat = bounds.center().lat;

    // Validate once so the per-level estimates below can't fail half-way.
    plan_grid(bounds, max_level)?;

    (min_level..=max_level)
        .rev()
        .map(|zoom| {
            let band_start = min_zoom(zoom, layer.export_min_zoom());
            let tile_count = estimate_tile_count(bounds, band_start..=zoom)?;
            Ok(build_option(
                zoom,
                meters_per_pixel(center_lat, zoom),
                tile_count,
                warn_tile_count,
            ))
        })
        .collect()
}

fn build_option(
    zoom: u8,
    meters_per_pixel: f64,
    tile_count: u64,
    warn_tile_count: u64,
) -> ExportOption {
    let size_mb = tile_count as f64 * AVERAGE_TILE_MB;
    let size = if size_mb > 1.0 {
        format!("{:.0}", size_mb)
    } else {
        format!("{:.1}", size_mb)
    };
    let warning = tile_count > warn_tile_count;

    ExportOption {
        zoom,
        meters_per_pixel,
        tile_count,
        size_mb,
        label: format!(
            "Zoom {} ({:.2} m/pixel) \u{2014} {} tiles (~{} Mb)",
            zoom, meters_per_pixel, tile_count, size
        ),
        warning,
        tooltip: warning.then(|| format!("> {} tiles", warn_tile_count)),
    }
}
