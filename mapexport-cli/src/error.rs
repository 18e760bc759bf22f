//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use mapexport::config::ConfigFileError;
use mapexport::container::ContainerError;
use mapexport::coord::CoordError;
use mapexport::error::ExportError;
use mapexport::plan::PlanningError;
use mapexport::provider::ProviderError;

/// Exit code used when the user interrupts an export.
const EXIT_CANCELLED: i32 = 130;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Bounds or zoom arguments rejected
    InvalidRegion(String),
    /// Tile source could not be set up
    Source(ProviderError),
    /// Export failed
    Export(ExportError),
    /// Export interrupted by the user
    Cancelled,
    /// Failed to read a file
    FileRead { path: PathBuf, error: std::io::Error },
    /// Failed to write output file
    FileWrite { path: PathBuf, error: std::io::Error },
    /// File is not a valid container
    Container(ContainerError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        if let CliError::Cancelled = self {
            eprintln!("Export cancelled.");
            process::exit(EXIT_CANCELLED);
        }

        eprintln!("Error: {}", self);

        match self {
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Set a tile server in ~/.mapexport/config.ini:");
                eprintln!("  [source]");
                eprintln!("  url = https://{{s}}.tile.example.org/{{z}}/{{x}}/{{y}}.png");
            }
            CliError::Export(ExportError::Fetch { .. }) => {
                eprintln!();
                eprintln!("The tile server may be throttling requests.");
                eprintln!("Try a lower --concurrency or raise max_retries in the config.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidRegion(msg) => write!(f, "Invalid region: {}", msg),
            CliError::Source(e) => write!(f, "Failed to set up tile source: {}", e),
            CliError::Export(e) => write!(f, "Export failed: {}", e),
            CliError::Cancelled => write!(f, "Export cancelled"),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path.display(), error)
            }
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path.display(), error)
            }
            CliError::Container(e) => write!(f, "Invalid container: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Source(e) => Some(e),
            CliError::Export(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Container(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::InvalidRegion(e.to_string())
    }
}

impl From<PlanningError> for CliError {
    fn from(e: PlanningError) -> Self {
        CliError::InvalidRegion(e.to_string())
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Source(e)
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::Planning(e) => e.into(),
            other => CliError::Export(other),
        }
    }
}

impl From<ContainerError> for CliError {
    fn from(e: ContainerError) -> Self {
        CliError::Container(e)
    }
}
