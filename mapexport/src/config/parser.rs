//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::clamp_concurrency;
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::coord::MAX_ZOOM;
use crate::provider::validate_template;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [export] section
    if let Some(section) = ini.section(Some("export")) {
        if let Some(v) = section.get("site") {
            let v = v.trim();
            if v.is_empty() || v.contains(['/', '\\']) {
                return Err(invalid(
                    "export",
                    "site",
                    v,
                    "must be a non-empty name without path separators",
                ));
            }
            config.export.site = v.to_string();
        }
        if let Some(v) = section.get("output_dir") {
            let v = v.trim();
            if !v.is_empty() {
                config.export.output_dir = Some(expand_tilde(v));
            }
        }
        if let Some(v) = section.get("concurrency") {
            let value: usize = parse_number("export", "concurrency", v, "must be a positive integer")?;
            config.export.concurrency = clamp_concurrency(value);
        }
        if let Some(v) = section.get("max_retries") {
            config.export.max_retries =
                parse_number("export", "max_retries", v, "must be a positive integer")?;
            if config.export.max_retries == 0 {
                return Err(invalid("export", "max_retries", v, "must be at least 1"));
            }
        }
        if let Some(v) = section.get("retry_base_delay_ms") {
            config.export.retry_base_delay_ms = parse_number(
                "export",
                "retry_base_delay_ms",
                v,
                "must be a non-negative integer (milliseconds)",
            )?;
        }
        if let Some(v) = section.get("request_timeout_secs") {
            config.export.request_timeout_secs = parse_number(
                "export",
                "request_timeout_secs",
                v,
                "must be a positive integer (seconds)",
            )?;
            if config.export.request_timeout_secs == 0 {
                return Err(invalid(
                    "export",
                    "request_timeout_secs",
                    v,
                    "must be at least 1 second",
                ));
            }
        }
        if let Some(v) = section.get("warn_tile_count") {
            config.export.warn_tile_count = parse_number(
                "export",
                "warn_tile_count",
                v,
                "must be a non-negative integer",
            )?;
        }
    }

    // [source] section
    if let Some(section) = ini.section(Some("source")) {
        if let Some(v) = section.get("url") {
            let v = v.trim();
            if !v.is_empty() {
                validate_template(v).map_err(|e| invalid("source", "url", v, &e.to_string()))?;
                config.source.url = Some(v.to_string());
            }
        }
        if let Some(v) = section.get("name") {
            let v = v.trim();
            if !v.is_empty() {
                config.source.name = v.to_string();
            }
        }
        if let Some(v) = section.get("subdomains") {
            config.source.subdomains = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(v) = section.get("min_zoom") {
            config.source.min_zoom = parse_zoom("min_zoom", v)?;
        }
        if let Some(v) = section.get("max_zoom") {
            config.source.max_zoom = parse_zoom("max_zoom", v)?;
        }
        if config.source.min_zoom > config.source.max_zoom {
            return Err(invalid(
                "source",
                "min_zoom",
                &config.source.min_zoom.to_string(),
                "must not exceed max_zoom",
            ));
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn parse_number<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_zoom(key: &str, value: &str) -> Result<u8, ConfigFileError> {
    let reason = format!("must be a zoom level between 0 and {}", MAX_ZOOM);
    let zoom: u8 = parse_number("source", key, value, &reason)?;
    if zoom > MAX_ZOOM {
        return Err(invalid("source", key, value, &reason));
    }
    Ok(zoom)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expands a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
