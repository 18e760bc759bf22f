//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and tile source
//! creation to reduce duplication across command handlers.

use crate::error::CliError;
use crate::LayerArgs;
use mapexport::config::{ConfigFile, DEFAULT_LOG_FILE};
use mapexport::layer::ExportLayer;
use mapexport::logging::{init_logging, LoggingGuard};
use mapexport::provider::{AsyncReqwestClient, UrlTemplateSource};
use std::path::{Path, PathBuf};
use tracing::info;

/// Loads the config file, or the one at `path` when given.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}

/// Layer described by the `[source]` section with CLI overrides applied.
pub fn resolve_layer(config: &ConfigFile, args: &LayerArgs) -> (ExportLayer, String) {
    let name = args
        .layer_name
        .clone()
        .unwrap_or_else(|| config.source.name.clone());
    let layer = ExportLayer::new(name.clone())
        .with_min_zoom(args.min_zoom.unwrap_or(config.source.min_zoom))
        .with_max_native_zoom(args.max_zoom.unwrap_or(config.source.max_zoom));
    (layer, name)
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Config file override
    /// * `console` - Mirror log events to stderr
    /// * `debug_mode` - When true, enables debug-level logging regardless of RUST_LOG
    pub fn new(config_path: Option<&Path>, console: bool, debug_mode: bool) -> Result<Self, CliError> {
        let config = load_config(config_path)?;

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

        let logging_guard = init_logging(&log_dir, &log_file, console, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("mapexport v{}", mapexport::VERSION);
        info!("mapexport CLI: {} command", command);
    }

    /// Create the HTTP tile source for `url`, or the configured server.
    pub fn create_source(
        &self,
        url: Option<String>,
        layer: &ExportLayer,
        name: &str,
    ) -> Result<UrlTemplateSource<AsyncReqwestClient>, CliError> {
        let template = url.or_else(|| self.config.source.url.clone()).ok_or_else(|| {
            CliError::Config("no tile server configured, pass --url".to_string())
        })?;

        let client = AsyncReqwestClient::with_timeout(self.config.export.request_timeout_secs)?;
        let source = UrlTemplateSource::new(client, name, template)?
            .with_subdomains(self.config.source.subdomains.clone())
            .with_zoom_range(layer.export_min_zoom(), layer.export_max_zoom());

        info!(source = name, "Tile source ready");
        Ok(source)
    }
}
