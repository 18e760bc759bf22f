//! Export command - download a region into a `.jnx` container.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use mapexport::config::{clamp_concurrency, ExportSettings};
use mapexport::coord::GeoBounds;
use mapexport::export::{BlobSink, ExportOutcome, ExportRequest, ExportSession, FileSink};
use mapexport::fetch::FetchConfig;
use mapexport::plan::estimate_byte_size;
use mapexport::progress::ProgressReporter;
use tracing::{info, warn};

use crate::error::CliError;
use crate::runner::{resolve_layer, CliRunner};
use crate::{LayerArgs, RegionArgs};

/// Tiles between two progress lines.
const PROGRESS_STEP: u64 = 25;

/// Arguments for the export command.
pub struct ExportArgs {
    pub region: RegionArgs,
    pub layer: LayerArgs,
    pub zoom: u8,
    pub url: Option<String>,
    pub output: Option<PathBuf>,
    pub site: Option<String>,
    pub concurrency: Option<usize>,
}

/// Run the export command.
pub async fn run(
    config_path: Option<&Path>,
    verbose: bool,
    debug: bool,
    args: ExportArgs,
) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, verbose, debug)?;
    runner.log_startup("export");
    let config = runner.config();

    let region = args.region;
    let bounds = GeoBounds::new(region.north, region.west, region.south, region.east)?;
    let (layer, name) = resolve_layer(config, &args.layer);

    let site = args.site.unwrap_or_else(|| config.export.site.clone());
    let request = ExportRequest::new(layer.clone(), name.clone(), args.zoom, bounds).with_site(site);

    // Fail on bad zooms before touching the network
    let plan = request.plan()?;

    let fetch_config = resolve_fetch_config(&config.export, args.concurrency);

    let source = runner.create_source(args.url, &layer, &name)?;
    let output_dir = args.output.unwrap_or_else(|| config.output_dir());

    println!("Exporting {} at zoom {}:", name, args.zoom);
    println!("  Region: {}", bounds);
    println!(
        "  Levels: {}-{} ({} tiles, ~{:.1} MB)",
        plan.min_zoom(),
        plan.max_zoom(),
        plan.total_tiles(),
        estimate_byte_size(plan.total_tiles()) / 1_000_000.0
    );
    println!("  Output: {}", output_dir.join(request.file_name()).display());
    println!();

    let session = ExportSession::new(Arc::new(source), fetch_config);
    let progress = console_progress();
    let start = Instant::now();

    let export = session.start(&request, &progress);
    tokio::pin!(export);
    let mut interrupted = false;

    let result = loop {
        tokio::select! {
            result = &mut export => break result,
            signal = tokio::signal::ctrl_c(), if !interrupted => {
                interrupted = true;
                match signal {
                    Ok(()) => {
                        eprintln!();
                        eprintln!("Cancelling export...");
                        session.cancel();
                    }
                    Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
                }
            }
        }
    };
    eprintln!();

    let artifact = match result? {
        ExportOutcome::Completed(artifact) => artifact,
        ExportOutcome::Cancelled => return Err(CliError::Cancelled),
    };

    let sink = FileSink::new(&output_dir);
    let path = sink.path_for(&artifact.file_name);
    sink.save(&artifact.file_name, &artifact.bytes)
        .map_err(|error| CliError::FileWrite {
            path: path.clone(),
            error,
        })?;

    let size_mb = artifact.bytes.len() as f64 / 1_048_576.0;
    info!(path = %path.display(), tiles = artifact.tile_count, "Container saved");
    println!(
        "✓ Saved {} tiles in {:.1}s: {} ({:.2} MB)",
        artifact.tile_count,
        start.elapsed().as_secs_f64(),
        path.display(),
        size_mb
    );

    Ok(())
}

/// Fetch settings from the config, with `--concurrency` clamped like the config value.
fn resolve_fetch_config(settings: &ExportSettings, concurrency: Option<usize>) -> FetchConfig {
    let fetch_config = settings.fetch_config();
    match concurrency {
        Some(concurrency) => fetch_config.with_concurrency(clamp_concurrency(concurrency)),
        None => fetch_config,
    }
}

/// Progress reporter printing a running count to stderr.
fn console_progress() -> ProgressReporter {
    let done = AtomicU64::new(0);
    ProgressReporter::new(move |delta, total| {
        let now = done.fetch_add(delta, Ordering::Relaxed) + delta;
        if delta == 0 || now % PROGRESS_STEP == 0 || now == total {
            let percent = if total == 0 {
                0.0
            } else {
                now as f64 * 100.0 / total as f64
            };
            eprint!("\r  Fetched {}/{} tiles ({:.0}%)", now, total, percent);
            let _ = std::io::stderr().flush();
        }
    })
}
