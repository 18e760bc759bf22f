//! Configuration file handling for ~/.mapexport/config.ini.
//!
//! Settings structs live in [`super::settings`], constants in [`super::defaults`],
//! parsing in [`super::parser`], and serialization in [`super::writer`].

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use super::defaults::*;
pub use super::settings::*;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.mapexport/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }

    /// Directory exports are written to.
    pub fn output_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(default_output_dir)
    }
}

/// Get the path to the config directory (~/.mapexport).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mapexport")
}

/// Get the path to the config file (~/.mapexport/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.export.site, DEFAULT_SITE);
        assert_eq!(config.export.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.export.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.export.retry_base_delay_ms, DEFAULT_RETRY_BASE_DELAY_MS);
        assert_eq!(
            config.export.request_timeout_secs,
            DEFAULT_REQUEST_TIMEOUT_SECS
        );
        assert_eq!(config.source.max_zoom, DEFAULT_SOURCE_MAX_ZOOM);
        assert_eq!(config.output_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp_dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.export.site = "trails".to_string();
        config.export.concurrency = 12;
        config.export.output_dir = Some(PathBuf::from("/tmp/out"));
        config.source.url = Some("https://{s}.example.org/{z}/{x}/{y}.png".to_string());
        config.source.subdomains = vec!["a".to_string(), "b".to_string()];
        config.source.max_zoom = 16;

        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded.export.site, "trails");
        assert_eq!(loaded.export.concurrency, 12);
        assert_eq!(loaded.output_dir(), PathBuf::from("/tmp/out"));
        assert_eq!(loaded.source.url, config.source.url);
        assert_eq!(loaded.source.subdomains, config.source.subdomains);
        assert_eq!(loaded.source.max_zoom, 16);
        assert_eq!(loaded.logging.file, config.logging.file);
    }

    #[test]
    fn test_config_paths() {
        assert!(config_file_path().ends_with(".mapexport/config.ini"));
    }
}
