//! Options command - list export zoom levels for a region.

use std::path::Path;

use mapexport::coord::GeoBounds;
use mapexport::layer::{LayerKind, LayerRecord};
use mapexport::selection::ExportSelection;

use crate::error::CliError;
use crate::runner::{load_config, resolve_layer};
use crate::{LayerArgs, RegionArgs};

/// Arguments for the options command.
pub struct OptionsArgs {
    pub region: RegionArgs,
    pub layer: LayerArgs,
}

/// Run the options command.
pub fn run(config_path: Option<&Path>, args: OptionsArgs) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let (layer, name) = resolve_layer(&config, &args.layer);
    let region = args.region;
    let bounds = GeoBounds::new(region.north, region.west, region.south, region.east)?;

    let selection = ExportSelection::new(config.export.warn_tile_count);
    selection.set_layers(vec![LayerRecord {
        name: name.clone(),
        visible: true,
        kind: LayerKind::Single(Some(layer)),
    }]);
    selection.set_bounds(bounds);

    let options = selection.options();
    if options.is_empty() {
        return Err(CliError::InvalidRegion(format!(
            "no export levels available for {}",
            bounds
        )));
    }

    println!("Layer: {}", name);
    println!("Region: {}", bounds);
    println!();
    for option in &options {
        match &option.tooltip {
            Some(tooltip) => println!("  ! {}  ({})", option.label, tooltip),
            None => println!("    {}", option.label),
        }
    }

    Ok(())
}
