use super::*;
use crate::coord::{GeoBounds, TileAddress};
use crate::error::ExportError;
use crate::export::ExportToken;
use crate::plan::{plan_export, ExportPlan};
use crate::progress::ProgressReporter;
use crate::provider::{ProviderError, TileSource};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Script = dyn Fn(TileAddress, u32) -> Result<Vec<u8>, ProviderError> + Send + Sync;

/// Source that answers from a closure of `(tile, attempt)` and records calls.
struct ScriptedSource {
    script: Box<Script>,
    delay: Duration,
    attempts: Mutex<HashMap<TileAddress, u32>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedSource {
    fn new<F>(script: F) -> Self
    where
        F: Fn(TileAddress, u32) -> Result<Vec<u8>, ProviderError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            delay: Duration::ZERO,
            attempts: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    fn always_ok() -> Self {
        Self::new(|tile, _| Ok(vec![tile.zoom, tile.col as u8, tile.row as u8]))
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn attempts_for(&self, tile: TileAddress) -> u32 {
        self.attempts
            .lock()
            .unwrap()
            .get(&tile)
            .copied()
            .unwrap_or(0)
    }

    fn total_calls(&self) -> u32 {
        self.attempts.lock().unwrap().values().sum()
    }
}

impl TileSource for ScriptedSource {
    async fn fetch_tile(&self, tile: TileAddress) -> Result<Vec<u8>, ProviderError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let entry = attempts.entry(tile).or_insert(0);
            *entry += 1;
            *entry
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        (self.script)(tile, attempt)
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn min_zoom(&self) -> u8 {
        0
    }

    fn max_zoom(&self) -> u8 {
        24
    }
}

fn world_plan(zoom: u8, layer_min: u8) -> ExportPlan {
    let bounds = GeoBounds::new(85.0, -180.0, -85.0, 180.0).unwrap();
    plan_export(&bounds, zoom, layer_min).unwrap()
}

fn fast_config() -> FetchConfig {
    FetchConfig::new().with_retry_base_delay(Duration::from_millis(1))
}

#[tokio::test]
async fn test_fetches_every_planned_tile() {
    let plan = world_plan(2, 1);
    assert_eq!(plan.total_tiles(), 20);

    let source = Arc::new(ScriptedSource::always_ok());
    let fetcher = TileFetcher::new(Arc::clone(&source), fast_config());
    let progress = ProgressReporter::silent();

    let outcome = fetcher
        .fetch(&plan, &progress, &ExportToken::new())
        .await
        .unwrap();

    let FetchOutcome::Completed(tiles) = outcome else {
        panic!("expected completed fetch");
    };
    assert_eq!(tiles.len(), 20);
    assert!(tiles.windows(2).all(|w| w[0].address < w[1].address));
    assert_eq!(tiles[0].address, TileAddress::new(1, 0, 0));
    assert!(tiles.iter().all(|t| !t.is_blank()));
    assert_eq!(source.total_calls(), 20);
    assert_eq!(fetcher.state(), ExportState::Completed);

    let snapshot = progress.snapshot();
    assert_eq!(snapshot.done, 20);
    assert_eq!(snapshot.total, 20);
}

#[tokio::test]
async fn test_missing_tiles_become_blank() {
    let plan = world_plan(1, 1);
    let source = Arc::new(ScriptedSource::new(|tile, _| {
        if tile.col == 0 {
            Err(ProviderError::NotFound)
        } else {
            Ok(Vec::new())
        }
    }));
    let fetcher = TileFetcher::new(source, fast_config());

    let outcome = fetcher
        .fetch(&plan, &ProgressReporter::silent(), &ExportToken::new())
        .await
        .unwrap();

    let FetchOutcome::Completed(tiles) = outcome else {
        panic!("expected completed fetch");
    };
    assert_eq!(tiles.len(), 4);
    assert!(tiles.iter().all(DownloadedTile::is_blank));
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let plan = world_plan(1, 1);
    let flaky = TileAddress::new(1, 1, 0);
    let source = Arc::new(ScriptedSource::new(move |tile, attempt| {
        if tile == flaky && attempt < 3 {
            Err(ProviderError::HttpError("connection reset".into()))
        } else {
            Ok(vec![1])
        }
    }));
    let fetcher = TileFetcher::new(Arc::clone(&source), fast_config());

    let outcome = fetcher
        .fetch(&plan, &ProgressReporter::silent(), &ExportToken::new())
        .await
        .unwrap();

    assert!(matches!(outcome, FetchOutcome::Completed(ref t) if t.len() == 4));
    assert_eq!(source.attempts_for(flaky), 3);
}

#[tokio::test]
async fn test_permanent_failure_fails_immediately() {
    let plan = world_plan(1, 1);
    let broken = TileAddress::new(1, 0, 1);
    let source = Arc::new(ScriptedSource::new(move |tile, _| {
        if tile == broken {
            Err(ProviderError::Rejected {
                status: 403,
                url: "https://t/1/0/1".into(),
            })
        } else {
            Ok(vec![1])
        }
    }));
    let fetcher = TileFetcher::new(Arc::clone(&source), fast_config());

    let err = fetcher
        .fetch(&plan, &ProgressReporter::silent(), &ExportToken::new())
        .await
        .unwrap_err();

    match err {
        ExportError::Fetch { tile, attempts, .. } => {
            assert_eq!(tile, broken);
            assert_eq!(attempts, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(source.attempts_for(broken), 1);
    assert_eq!(fetcher.state(), ExportState::Failed);
}

#[tokio::test]
async fn test_exhausted_retries_report_attempts() {
    let plan = world_plan(0, 0);
    let source = Arc::new(ScriptedSource::new(|_, _| {
        Err(ProviderError::HttpError("HTTP 503".into()))
    }));
    let fetcher = TileFetcher::new(Arc::clone(&source), fast_config().with_max_retries(4));

    let err = fetcher
        .fetch(&plan, &ProgressReporter::silent(), &ExportToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Fetch { attempts: 4, .. }));
    assert_eq!(source.attempts_for(TileAddress::new(0, 0, 0)), 4);
}

#[tokio::test(start_paused = true)]
async fn test_request_timeout_counts_as_transient() {
    let plan = world_plan(0, 0);
    let source = Arc::new(ScriptedSource::always_ok().with_delay(Duration::from_secs(60)));
    let config = fast_config()
        .with_max_retries(2)
        .with_request_timeout(Duration::from_secs(1));
    let fetcher = TileFetcher::new(Arc::clone(&source), config);

    let err = fetcher
        .fetch(&plan, &ProgressReporter::silent(), &ExportToken::new())
        .await
        .unwrap_err();

    match err {
        ExportError::Fetch {
            attempts, message, ..
        } => {
            assert_eq!(attempts, 2);
            assert!(message.contains("timed out"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_cancel_before_start_fetches_nothing() {
    let plan = world_plan(2, 1);
    let source = Arc::new(ScriptedSource::always_ok());
    let fetcher = TileFetcher::new(Arc::clone(&source), fast_config());
    let token = ExportToken::new();
    token.request();

    let outcome = fetcher
        .fetch(&plan, &ProgressReporter::silent(), &token)
        .await
        .unwrap();

    assert!(matches!(outcome, FetchOutcome::Cancelled));
    assert_eq!(source.total_calls(), 0);
    assert_eq!(fetcher.state(), ExportState::Cancelled);
}

#[tokio::test]
async fn test_cancel_mid_flight() {
    let plan = world_plan(4, 2);
    let source = Arc::new(ScriptedSource::always_ok().with_delay(Duration::from_millis(20)));
    let fetcher = TileFetcher::new(Arc::clone(&source), fast_config().with_concurrency(2));
    let token = ExportToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.request();
    });

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        fetcher.fetch(&plan, &ProgressReporter::silent(), &token),
    )
    .await
    .expect("cancel should stop the fetch promptly")
    .unwrap();

    assert!(matches!(outcome, FetchOutcome::Cancelled));
    assert!(u64::from(source.total_calls()) < plan.total_tiles());
}

#[tokio::test]
async fn test_pool_bounds_in_flight_requests() {
    let plan = world_plan(3, 3);
    let source = Arc::new(ScriptedSource::always_ok().with_delay(Duration::from_millis(2)));
    let fetcher = TileFetcher::new(Arc::clone(&source), fast_config().with_concurrency(3));

    let outcome = fetcher
        .fetch(&plan, &ProgressReporter::silent(), &ExportToken::new())
        .await
        .unwrap();

    assert!(matches!(outcome, FetchOutcome::Completed(ref t) if t.len() == 64));
    let peak = source.peak_in_flight.load(Ordering::SeqCst);
    assert!(peak >= 1 && peak <= 3, "peak in flight was {peak}");
}

#[tokio::test]
async fn test_progress_total_grows_per_level() {
    let plan = world_plan(2, 0);
    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);
    let progress = ProgressReporter::new(move |delta, total| {
        sink.lock().unwrap().push((delta, total));
    });

    let fetcher = TileFetcher::new(
        Arc::new(ScriptedSource::always_ok()),
        fast_config().with_concurrency(1),
    );
    fetcher
        .fetch(&plan, &progress, &ExportToken::new())
        .await
        .unwrap();

    let updates = updates.lock().unwrap();
    let totals: Vec<u64> = updates.iter().map(|(_, total)| *total).collect();
    assert!(totals.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(totals.first(), Some(&16));
    assert_eq!(totals.last(), Some(&21));
    assert_eq!(updates.iter().map(|(delta, _)| delta).sum::<u64>(), 21);
}
