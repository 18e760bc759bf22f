//! User configuration.
//!
//! Settings are read from `~/.mapexport/config.ini`:
//!
//! ```text
//! [export]
//! site = trails
//! concurrency = 8
//!
//! [source]
//! url = https://{s}.tile.example.org/{z}/{x}/{y}.png
//! ```
//!
//! A missing file or section means defaults. [`ExportSettings::fetch_config`]
//! turns the `[export]` section into a [`FetchConfig`](crate::fetch::FetchConfig).

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    clamp_concurrency, default_output_dir, DEFAULT_CONCURRENCY, DEFAULT_LOG_FILE, DEFAULT_MAX_RETRIES,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_SITE,
    DEFAULT_SOURCE_MAX_ZOOM, DEFAULT_SOURCE_MIN_ZOOM, DEFAULT_SOURCE_NAME, MAX_CONCURRENCY,
};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, ExportSettings, LoggingSettings, SourceSettings};
