//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`export`] - Download a region into a container
//! - [`inspect`] - Summarize an existing container
//! - [`options`] - List export zoom levels with cost estimates

pub mod export;
pub mod inspect;
pub mod options;
