//! Integration tests for the export pipeline.
//!
//! These tests drive the public API end to end:
//! - Planning a region over its zoom band
//! - Fetching through the bounded pool from a mock tile source
//! - Assembling the container and parsing it back
//! - Cancellation and permanent fetch failures
//! - Saving the result to disk

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mapexport::container::{ContainerReader, HEADER_LEN, INDEX_RECORD_LEN};
use mapexport::coord::{tile_to_lat_lon, GeoBounds, TileAddress};
use mapexport::error::ExportError;
use mapexport::export::{
    export_region, BlobSink, ExportOutcome, ExportRequest, ExportToken, FileSink,
};
use mapexport::fetch::FetchConfig;
use mapexport::layer::ExportLayer;
use mapexport::plan::{estimate_tile_count, plan_export};
use mapexport::progress::ProgressReporter;
use mapexport::provider::{ProviderError, TileSource};

// =============================================================================
// Test Helpers
// =============================================================================

/// Tile source answering every tile, optionally failing one of them.
struct MockSource {
    failing: Option<TileAddress>,
    jitter: bool,
    requests: AtomicUsize,
}

impl MockSource {
    fn healthy() -> Arc<Self> {
        Arc::new(Self {
            failing: None,
            jitter: false,
            requests: AtomicUsize::new(0),
        })
    }

    fn jittery() -> Arc<Self> {
        Arc::new(Self {
            failing: None,
            jitter: true,
            requests: AtomicUsize::new(0),
        })
    }

    fn failing_at(tile: TileAddress) -> Arc<Self> {
        Arc::new(Self {
            failing: Some(tile),
            jitter: false,
            requests: AtomicUsize::new(0),
        })
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl TileSource for MockSource {
    async fn fetch_tile(&self, tile: TileAddress) -> Result<Vec<u8>, ProviderError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.jitter {
            // Completion order differs from request order
            let millis = u64::from((tile.col * 7 + tile.row * 13) % 5);
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
        if self.failing == Some(tile) {
            return Err(ProviderError::Rejected {
                status: 403,
                url: format!("https://tiles.test/{}/{}/{}.png", tile.zoom, tile.col, tile.row),
            });
        }
        let mut body = format!("tile {}/{}/{}", tile.zoom, tile.col, tile.row).into_bytes();
        // Vary lengths so offsets are not a fixed stride
        body.resize(body.len() + (tile.col as usize % 3), b'.');
        Ok(body)
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn min_zoom(&self) -> u8 {
        0
    }

    fn max_zoom(&self) -> u8 {
        20
    }
}

/// A 0.01° square centered on the equator and prime meridian.
fn equator_bounds() -> GeoBounds {
    GeoBounds::new(0.005, -0.005, -0.005, 0.005).unwrap()
}

fn equator_request() -> ExportRequest {
    let layer = ExportLayer::new("osm").with_min_zoom(4).with_max_native_zoom(18);
    ExportRequest::new(layer, "OpenStreetMap", 10, equator_bounds())
}

fn test_config() -> FetchConfig {
    FetchConfig::new()
        .with_concurrency(4)
        .with_retry_base_delay(Duration::from_millis(1))
}

async fn run(source: Arc<MockSource>, request: &ExportRequest) -> Result<ExportOutcome, ExportError> {
    export_region(
        source,
        request,
        &ProgressReporter::silent(),
        &ExportToken::new(),
        &test_config(),
    )
    .await
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_equator_plan_has_seven_levels() {
    let plan = plan_export(&equator_bounds(), 10, 4).unwrap();

    assert_eq!(plan.levels().len(), 7);
    assert_eq!(plan.min_zoom(), 4);
    assert_eq!(plan.max_zoom(), 10);
    assert_eq!(
        plan.total_tiles(),
        estimate_tile_count(&equator_bounds(), 4..=10).unwrap()
    );
}

#[tokio::test]
async fn test_export_matches_estimate_and_parses() {
    let request = equator_request();
    let source = MockSource::healthy();

    let outcome = run(Arc::clone(&source), &request).await.unwrap();
    let artifact = outcome.into_artifact().expect("export should complete");

    let estimate = estimate_tile_count(&equator_bounds(), 4..=10).unwrap();
    assert_eq!(u64::from(artifact.tile_count), estimate);
    assert_eq!(source.requests() as u64, estimate);
    assert_eq!(artifact.file_name, "mapexport_openstreetmap_z10.jnx");

    let container = ContainerReader::parse(&artifact.bytes).unwrap();
    let header = container.header();
    assert_eq!(u64::from(header.tile_count), estimate);
    assert_eq!(header.min_zoom, 4);
    assert_eq!(header.max_zoom, 10);
    assert_eq!(header.level_count, 7);

    let entries = container.entries();
    assert_eq!(entries.len() as u64, estimate);
    let payload_sum: u64 = entries.iter().map(|e| u64::from(e.length)).sum();
    assert_eq!(payload_sum, header.payload_len);
    assert_eq!(
        artifact.bytes.len() as u64,
        (HEADER_LEN + entries.len() * INDEX_RECORD_LEN) as u64 + payload_sum
    );

    for entry in entries {
        let expected = format!(
            "tile {}/{}/{}",
            entry.address.zoom, entry.address.col, entry.address.row
        );
        assert!(container.tile_data(entry).starts_with(expected.as_bytes()));
    }
}

#[tokio::test]
async fn test_cancel_before_fetch_produces_nothing() {
    let request = equator_request();
    let source = MockSource::healthy();
    let token = ExportToken::new();
    token.request();

    let outcome = export_region(
        Arc::clone(&source),
        &request,
        &ProgressReporter::silent(),
        &token,
        &test_config(),
    )
    .await
    .unwrap();

    assert_eq!(outcome, ExportOutcome::Cancelled);
    assert_eq!(source.requests(), 0);
}

#[tokio::test]
async fn test_permanent_failure_names_tile() {
    let failing = TileAddress::new(10, 5, 5);
    let north_west = tile_to_lat_lon(&failing);
    let south_east = tile_to_lat_lon(&TileAddress::new(10, 6, 6));
    let lat_pad = (north_west.lat - south_east.lat) / 4.0;
    let lon_pad = (south_east.lon - north_west.lon) / 4.0;
    let bounds = GeoBounds::new(
        north_west.lat - lat_pad,
        north_west.lon + lon_pad,
        south_east.lat + lat_pad,
        south_east.lon - lon_pad,
    )
    .unwrap();

    let layer = ExportLayer::new("osm").with_min_zoom(4).with_max_native_zoom(18);
    let request = ExportRequest::new(layer, "OpenStreetMap", 10, bounds);
    assert_eq!(request.plan().unwrap().levels()[0].tile_count(), 1);

    let err = run(MockSource::failing_at(failing), &request)
        .await
        .unwrap_err();

    match &err {
        ExportError::Fetch { tile, attempts, .. } => {
            assert_eq!(*tile, failing);
            assert_eq!(*attempts, 1);
        }
        other => panic!("expected a fetch error, got {other:?}"),
    }
    assert_eq!(err.failed_tile(), Some(failing));
    assert!(err.to_string().contains("z=10 x=5 y=5"));
}

#[tokio::test]
async fn test_assembly_is_deterministic() {
    let request = equator_request();

    let first = run(MockSource::jittery(), &request).await.unwrap();
    let second = run(MockSource::jittery(), &request).await.unwrap();

    let first = first.into_artifact().unwrap();
    let second = second.into_artifact().unwrap();
    assert_eq!(first.bytes, second.bytes);
}

#[tokio::test]
async fn test_progress_reaches_total() {
    let request = equator_request();
    let progress = ProgressReporter::silent();

    export_region(
        MockSource::healthy(),
        &request,
        &progress,
        &ExportToken::new(),
        &test_config(),
    )
    .await
    .unwrap();

    let snapshot = progress.snapshot();
    assert_eq!(snapshot.done, snapshot.total);
    assert_eq!(snapshot.total, request.plan().unwrap().total_tiles());
}

#[tokio::test]
async fn test_saved_container_parses_from_disk() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let sink = FileSink::new(temp_dir.path().join("exports"));
    let request = equator_request();

    let artifact = run(MockSource::healthy(), &request)
        .await
        .unwrap()
        .into_artifact()
        .unwrap();
    sink.save(&artifact.file_name, &artifact.bytes).unwrap();

    let on_disk = std::fs::read(sink.path_for(&artifact.file_name)).unwrap();
    assert_eq!(on_disk, artifact.bytes);
    let container = ContainerReader::parse(&on_disk).unwrap();
    assert_eq!(container.header().tile_count, artifact.tile_count);
}
