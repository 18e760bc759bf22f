//! Default values and constants for all configuration settings.

use std::path::PathBuf;

use super::settings::*;

/// Prefix of exported file names.
pub const DEFAULT_SITE: &str = "mapexport";

/// Default number of tile requests in flight.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Upper bound for the fetch pool. Tile servers throttle aggressive clients.
pub const MAX_CONCURRENCY: usize = 64;

/// Attempts per tile before an export fails.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// First retry backoff in milliseconds; doubles per attempt.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 100;

/// Per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Name reported by a source configured from a bare URL template.
pub const DEFAULT_SOURCE_NAME: &str = "custom";

/// Zoom range assumed for a configured source.
pub const DEFAULT_SOURCE_MIN_ZOOM: u8 = 0;
pub const DEFAULT_SOURCE_MAX_ZOOM: u8 = 19;

/// Log file name inside the config directory.
pub const DEFAULT_LOG_FILE: &str = "mapexport.log";

/// Clamps the pool size to `1..=MAX_CONCURRENCY`, warning when clamped.
pub fn clamp_concurrency(value: usize) -> usize {
    if value == 0 {
        tracing::warn!(requested = value, "concurrency must be at least 1, using 1");
        1
    } else if value > MAX_CONCURRENCY {
        tracing::warn!(
            requested = value,
            max = MAX_CONCURRENCY,
            "concurrency above maximum, clamping to {} (avoids provider rate limiting)",
            MAX_CONCURRENCY
        );
        MAX_CONCURRENCY
    } else {
        value
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = super::file::config_directory();

        Self {
            export: ExportSettings {
                site: DEFAULT_SITE.to_string(),
                output_dir: None,
                concurrency: DEFAULT_CONCURRENCY,
                max_retries: DEFAULT_MAX_RETRIES,
                retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
                request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                warn_tile_count: crate::plan::DEFAULT_WARN_TILE_COUNT,
            },
            source: SourceSettings {
                url: None,
                name: DEFAULT_SOURCE_NAME.to_string(),
                subdomains: Vec::new(),
                min_zoom: DEFAULT_SOURCE_MIN_ZOOM,
                max_zoom: DEFAULT_SOURCE_MAX_ZOOM,
            },
            logging: LoggingSettings {
                file: config_dir.join(DEFAULT_LOG_FILE),
            },
        }
    }
}

/// Directory exports are written to when none is configured.
pub fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_concurrency() {
        assert_eq!(clamp_concurrency(0), 1);
        assert_eq!(clamp_concurrency(8), 8);
        assert_eq!(clamp_concurrency(1000), MAX_CONCURRENCY);
    }

    #[test]
    fn test_default_log_file_in_config_dir() {
        let config = ConfigFile::default();
        assert!(config.logging.file.ends_with(".mapexport/mapexport.log"));
    }
}
