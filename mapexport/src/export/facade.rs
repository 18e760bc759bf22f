//! One-call export: plan, fetch, assemble.

use super::token::ExportToken;
use crate::config::DEFAULT_SITE;
use crate::container::{assemble, Georef};
use crate::coord::GeoBounds;
use crate::error::ExportError;
use crate::fetch::{ExportState, FetchConfig, FetchOutcome, StateCell, TileFetcher};
use crate::layer::{export_file_name, ExportLayer, SelectedLayer};
use crate::plan::{plan_export, ExportPlan, PlanningError};
use crate::progress::ProgressReporter;
use crate::provider::TileSource;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

static EXPORT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier correlating the log events of one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExportId(u64);

impl ExportId {
    pub fn new() -> Self {
        Self(EXPORT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ExportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "export-{}", self.0)
    }
}

/// What to export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub layer: ExportLayer,
    /// Display name, used for the output file name
    pub layer_name: String,
    /// Finest zoom to export; coarser levels follow automatically
    pub zoom: u8,
    pub bounds: GeoBounds,
    /// Prefix of the output file name
    pub site: String,
}

impl ExportRequest {
    pub fn new(
        layer: ExportLayer,
        layer_name: impl Into<String>,
        zoom: u8,
        bounds: GeoBounds,
    ) -> Self {
        Self {
            layer,
            layer_name: layer_name.into(),
            zoom,
            bounds,
            site: DEFAULT_SITE.to_string(),
        }
    }

    /// Request for the layer picked from the map's layer stack.
    pub fn from_selection(selected: &SelectedLayer, zoom: u8, bounds: GeoBounds) -> Self {
        Self::new(selected.layer.clone(), selected.name.clone(), zoom, bounds)
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = site.into();
        self
    }

    /// Output file name for this request.
    pub fn file_name(&self) -> String {
        export_file_name(&self.site, &self.layer_name, self.zoom)
    }

    /// Plans every level, checking the zoom against the layer's range.
    pub fn plan(&self) -> Result<ExportPlan, PlanningError> {
        let max = self.layer.export_max_zoom();
        let min = self.layer.export_min_zoom();
        if self.zoom > max || self.zoom < min {
            return Err(PlanningError::ZoomOutOfRange {
                zoom: self.zoom,
                min,
                max,
            });
        }
        plan_export(&self.bounds, self.zoom, min)
    }
}

/// A finished container, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Tiles stored in the container; blank tiles are not counted
    pub tile_count: u32,
}

/// How an export that did not fail ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Completed(ExportArtifact),
    Cancelled,
}

impl ExportOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExportOutcome::Cancelled)
    }

    /// The artifact, if the export completed.
    pub fn into_artifact(self) -> Option<ExportArtifact> {
        match self {
            ExportOutcome::Completed(artifact) => Some(artifact),
            ExportOutcome::Cancelled => None,
        }
    }
}

/// Exports `request.bounds` from `source` into a container.
///
/// Claims `token` for the duration of the call; a token already driving
/// another export is rejected with [`ExportError::TokenInUse`]. No bytes are
/// produced unless every planned tile was fetched or found blank.
///
/// ```ignore
/// let token = ExportToken::new();
/// let progress = ProgressReporter::new(|_, total| eprintln!("{total} tiles"));
/// match export_region(source, &request, &progress, &token, &FetchConfig::default()).await? {
///     ExportOutcome::Completed(artifact) => sink.save(&artifact.file_name, &artifact.bytes)?,
///     ExportOutcome::Cancelled => {}
/// }
/// ```
pub async fn export_region<S: TileSource>(
    source: Arc<S>,
    request: &ExportRequest,
    progress: &ProgressReporter,
    token: &ExportToken,
    config: &FetchConfig,
) -> Result<ExportOutcome, ExportError> {
    run_export(source, request, progress, token, config, &StateCell::new()).await
}

pub(crate) async fn run_export<S: TileSource>(
    source: Arc<S>,
    request: &ExportRequest,
    progress: &ProgressReporter,
    token: &ExportToken,
    config: &FetchConfig,
    state: &StateCell,
) -> Result<ExportOutcome, ExportError> {
    let _claim = token.claim()?;
    let export_id = ExportId::new();

    info!(
        export_id = %export_id,
        layer = %request.layer_name,
        zoom = request.zoom,
        bounds = %request.bounds,
        source = source.name(),
        "Export started"
    );

    state.set(ExportState::Planning);
    let plan = match request.plan() {
        Ok(plan) => plan,
        Err(e) => {
            state.set(ExportState::Failed);
            warn!(export_id = %export_id, error = %e, "Export rejected");
            return Err(e.into());
        }
    };

    let fetcher = TileFetcher::new(source, *config).with_state(state.clone());
    let tiles = match fetcher.fetch(&plan, progress, token).await {
        Ok(FetchOutcome::Completed(tiles)) if !token.is_requested() => tiles,
        Ok(_) => {
            state.set(ExportState::Cancelled);
            info!(export_id = %export_id, progress = ?progress.snapshot(), "Export cancelled");
            return Ok(ExportOutcome::Cancelled);
        }
        Err(e) => {
            warn!(export_id = %export_id, error = %e, "Export failed");
            return Err(e);
        }
    };

    let stored = tiles.iter().filter(|t| !t.is_blank()).count();
    // assemble rejects counts that do not fit the header
    let tile_count = u32::try_from(stored).unwrap_or(u32::MAX);

    let bytes = match assemble(tiles, &Georef::from_plan(&plan)) {
        Ok(bytes) => bytes,
        Err(e) => {
            state.set(ExportState::Failed);
            warn!(export_id = %export_id, error = %e, "Export failed");
            return Err(e);
        }
    };

    let artifact = ExportArtifact {
        file_name: request.file_name(),
        bytes,
        tile_count,
    };

    info!(
        export_id = %export_id,
        file = %artifact.file_name,
        tiles = artifact.tile_count,
        bytes = artifact.bytes.len(),
        levels = plan.levels().len(),
        "Export completed"
    );

    state.set(ExportState::Completed);
    Ok(ExportOutcome::Completed(artifact))
}
