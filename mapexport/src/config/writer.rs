//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let output_dir = config
        .export
        .output_dir
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();
    let url = config.source.url.as_deref().unwrap_or("");

    format!(
        r#"[export]
; Prefix of exported file names: <site>_<layer>_z<zoom>.jnx
site = {}
; Directory exports are written to (empty = current directory)
output_dir = {}
; Tile requests in flight (1-64, default: 8)
concurrency = {}
; Attempts per tile before the export fails (default: 3)
max_retries = {}
; First retry delay in milliseconds, doubled on each attempt (default: 100)
retry_base_delay_ms = {}
; Timeout for a single tile request in seconds (default: 30)
request_timeout_secs = {}
; Log a warning for exports larger than this many tiles (default: 50000)
warn_tile_count = {}

[source]
; Tile server URL template. Placeholders: {{z}} {{x}} {{y}} {{-y}} {{s}}
; Example: url = https://{{s}}.tile.example.org/{{z}}/{{x}}/{{y}}.png
url = {}
; Name used in logs
name = {}
; Comma-separated values for {{s}}
subdomains = {}
; Zoom range the server has imagery for
min_zoom = {}
max_zoom = {}

[logging]
; Log file location
file = {}
"#,
        config.export.site,
        output_dir,
        config.export.concurrency,
        config.export.max_retries,
        config.export.retry_base_delay_ms,
        config.export.request_timeout_secs,
        config.export.warn_tile_count,
        url,
        config.source.name,
        config.source.subdomains.join(","),
        config.source.min_zoom,
        config.source.max_zoom,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
