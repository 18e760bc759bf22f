//! Inspect command - summarize an exported container.

use std::collections::BTreeMap;
use std::path::PathBuf;

use mapexport::container::ContainerReader;

use crate::error::CliError;

/// Arguments for the inspect command.
pub struct InspectArgs {
    pub path: PathBuf,
}

/// Run the inspect command.
pub fn run(args: InspectArgs) -> Result<(), CliError> {
    let data = std::fs::read(&args.path).map_err(|error| CliError::FileRead {
        path: args.path.clone(),
        error,
    })?;
    let container = ContainerReader::parse(&data)?;
    let header = container.header();
    let (north, west, south, east) = header.bounds_degrees();

    println!("Container: {}", args.path.display());
    println!("  Format version: {}", header.version);
    println!("  Projection:     EPSG:{}", header.projection);
    println!(
        "  Bounds:         N {:.6}, W {:.6}, S {:.6}, E {:.6}",
        north, west, south, east
    );
    println!(
        "  Zoom levels:    {}-{} ({} levels)",
        header.min_zoom, header.max_zoom, header.level_count
    );
    println!("  Tiles:          {}", header.tile_count);
    println!("  Payload:        {} bytes", header.payload_len);

    let mut per_zoom: BTreeMap<u8, (u32, u64)> = BTreeMap::new();
    for entry in container.entries() {
        let slot = per_zoom.entry(entry.address.zoom).or_default();
        slot.0 += 1;
        slot.1 += u64::from(entry.length);
    }
    if !per_zoom.is_empty() {
        println!();
        for (zoom, (tiles, bytes)) in per_zoom.iter().rev() {
            println!("  z{:<2} {:>8} tiles {:>12} bytes", zoom, tiles, bytes);
        }
    }

    Ok(())
}
