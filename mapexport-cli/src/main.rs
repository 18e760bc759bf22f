//! mapexport CLI - Command-line interface
//!
//! This binary provides a command-line interface to the mapexport library:
//! list the zoom options for a region, export a region into a `.jnx`
//! container, and inspect an existing container.

mod commands;
mod error;
mod runner;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use commands::export::ExportArgs;
use commands::inspect::InspectArgs;
use commands::options::OptionsArgs;

#[derive(Parser)]
#[command(name = "mapexport")]
#[command(version = mapexport::VERSION)]
#[command(about = "Export slippy-map tiles into offline GPS containers", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.mapexport/config.ini
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Mirror log output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug-level logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List export zoom levels with estimated tile counts and sizes
    Options {
        #[command(flatten)]
        region: RegionArgs,
        #[command(flatten)]
        layer: LayerArgs,
    },
    /// Download a region and write it as a .jnx container
    Export {
        #[command(flatten)]
        region: RegionArgs,
        #[command(flatten)]
        layer: LayerArgs,

        /// Finest zoom level to export; six coarser levels are added below it
        #[arg(long)]
        zoom: u8,

        /// Tile URL template, e.g. https://{s}.tile.example.org/{z}/{x}/{y}.png
        #[arg(long)]
        url: Option<String>,

        /// Directory to write the container to
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// File name prefix
        #[arg(long)]
        site: Option<String>,

        /// Tile requests in flight
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Print the header and index summary of a container
    Inspect {
        /// Container file
        path: PathBuf,
    },
}

/// Selected rectangle in decimal degrees.
#[derive(Args, Debug, Clone, Copy)]
pub struct RegionArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub north: f64,
    #[arg(long, allow_hyphen_values = true)]
    pub west: f64,
    #[arg(long, allow_hyphen_values = true)]
    pub south: f64,
    #[arg(long, allow_hyphen_values = true)]
    pub east: f64,
}

/// Layer overrides; unset values come from the `[source]` config section.
#[derive(Args, Debug, Clone, Default)]
pub struct LayerArgs {
    /// Layer name used in the output file name
    #[arg(long)]
    pub layer_name: Option<String>,

    /// Coarsest zoom the tile server has
    #[arg(long)]
    pub min_zoom: Option<u8>,

    /// Finest zoom the tile server has
    #[arg(long)]
    pub max_zoom: Option<u8>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Options { region, layer } => commands::options::run(
            config_path,
            OptionsArgs { region, layer },
        ),
        Commands::Export {
            region,
            layer,
            zoom,
            url,
            output,
            site,
            concurrency,
        } => {
            commands::export::run(
                config_path,
                cli.verbose,
                cli.debug,
                ExportArgs {
                    region,
                    layer,
                    zoom,
                    url,
                    output,
                    site,
                    concurrency,
                },
            )
            .await
        }
        Commands::Inspect { path } => commands::inspect::run(InspectArgs { path }),
    };

    if let Err(e) = result {
        e.exit();
    }
}
