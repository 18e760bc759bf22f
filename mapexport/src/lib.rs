//! mapexport - Offline raster map export to georeferenced tile containers
//!
//! This library plans the tile grid covering a selected rectangle over a band
//! of zoom levels, fetches every tile from a slippy-map source with bounded
//! concurrency, and assembles the results into a single `.jnx` container that
//! GPS devices and offline viewers can load.
//!
//! # High-Level API
//!
//! For most use cases, the [`export`] module provides a simplified facade:
//!
//! ```ignore
//! use mapexport::export::{export_region, ExportRequest, ExportToken};
//! use mapexport::fetch::FetchConfig;
//! use mapexport::progress::ProgressReporter;
//!
//! let request = ExportRequest::new(layer, "OpenStreetMap", 14, bounds);
//! let outcome = export_region(
//!     source,
//!     &request,
//!     &ProgressReporter::silent(),
//!     &ExportToken::new(),
//!     &FetchConfig::default(),
//! )
//! .await?;
//! ```

pub mod config;
pub mod container;
pub mod coord;
pub mod error;
pub mod export;
pub mod fetch;
pub mod layer;
pub mod logging;
pub mod plan;
pub mod progress;
pub mod provider;
pub mod selection;

/// Version of the mapexport library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
