//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use crate::fetch::FetchConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub export: ExportSettings,
    pub source: SourceSettings,
    pub logging: LoggingSettings,
}

/// `[export]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    /// Prefix of exported file names
    pub site: String,
    /// Where exports are written (current directory when unset)
    pub output_dir: Option<PathBuf>,
    /// Tile requests in flight
    pub concurrency: usize,
    /// Attempts per tile
    pub max_retries: u32,
    /// First retry backoff, doubled per attempt
    pub retry_base_delay_ms: u64,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// Tile count above which exports log a size warning
    pub warn_tile_count: u64,
}

impl ExportSettings {
    /// Fetch pool configuration for these settings.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::new()
            .with_concurrency(self.concurrency)
            .with_max_retries(self.max_retries)
            .with_retry_base_delay(Duration::from_millis(self.retry_base_delay_ms))
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_warn_tile_count(self.warn_tile_count)
    }
}

/// `[source]` section: default tile server used by the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    /// URL template with `{z}`, `{x}`, `{y}` placeholders
    pub url: Option<String>,
    pub name: String,
    /// Values for `{s}`
    pub subdomains: Vec<String>,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
