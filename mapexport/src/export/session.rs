//! Serial export session.

use super::facade::{run_export, ExportOutcome, ExportRequest};
use super::token::ExportToken;
use crate::error::ExportError;
use crate::fetch::{ExportState, FetchConfig, StateCell};
use crate::progress::ProgressReporter;
use crate::provider::TileSource;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Runs exports one at a time against a fixed source.
///
/// Starting an export while another is running fails with
/// [`ExportError::Busy`]. Every export gets a fresh [`ExportToken`], so a
/// cancel only ever affects the export that was running when it was issued.
pub struct ExportSession<S: TileSource> {
    source: Arc<S>,
    config: FetchConfig,
    running: Mutex<Option<ExportToken>>,
    state: StateCell,
}

impl<S: TileSource> ExportSession<S> {
    pub fn new(source: Arc<S>, config: FetchConfig) -> Self {
        Self {
            source,
            config,
            running: Mutex::new(None),
            state: StateCell::new(),
        }
    }

    /// State of the current or most recent export.
    pub fn state(&self) -> ExportState {
        self.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.lock_running().is_some()
    }

    /// Requests cancellation of the running export.
    ///
    /// Returns false if nothing was running.
    pub fn cancel(&self) -> bool {
        match self.lock_running().as_ref() {
            Some(token) => {
                info!("Export cancellation requested");
                token.request();
                true
            }
            None => false,
        }
    }

    /// Runs one export to completion, cancellation or failure.
    pub async fn start(
        &self,
        request: &ExportRequest,
        progress: &ProgressReporter,
    ) -> Result<ExportOutcome, ExportError> {
        let token = {
            let mut running = self.lock_running();
            if running.is_some() {
                debug!(layer = %request.layer_name, "Export rejected, session busy");
                return Err(ExportError::Busy);
            }
            let token = ExportToken::new();
            *running = Some(token.clone());
            token
        };
        let _running = RunningGuard {
            running: &self.running,
        };

        run_export(
            Arc::clone(&self.source),
            request,
            progress,
            &token,
            &self.config,
            &self.state,
        )
        .await
    }

    fn lock_running(&self) -> std::sync::MutexGuard<'_, Option<ExportToken>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the running slot even if the export future is dropped mid-way.
struct RunningGuard<'a> {
    running: &'a Mutex<Option<ExportToken>>,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        *self.running.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
