//! Export cancellation token.

use crate::error::ExportError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared cancellation flag for one export.
///
/// Cloning yields a handle to the same flag. Once requested, cancellation
/// cannot be withdrawn; start the next export with a fresh token.
///
/// # Example
///
/// ```
/// use mapexport::export::ExportToken;
///
/// let token = ExportToken::new();
/// let handle = token.clone();
/// handle.request();
/// assert!(token.is_requested());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExportToken {
    cancel: CancellationToken,
    active: Arc<AtomicBool>,
}

impl ExportToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn request(&self) {
        self.cancel.cancel();
    }

    /// Returns true once cancellation has been requested.
    pub fn is_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Completes when cancellation is requested.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Token cancelled together with this one, but which can also be
    /// cancelled on its own to stop work started under it.
    pub(crate) fn child(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Marks this token as driving an export.
    ///
    /// Fails with [`ExportError::TokenInUse`] while another claim is held.
    /// The claim is released when the returned guard is dropped.
    pub fn claim(&self) -> Result<ActiveExport, ExportError> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::TokenInUse)?;
        Ok(ActiveExport {
            active: Arc::clone(&self.active),
        })
    }

    /// Returns true while an export holds a claim on this token.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Guard for a claimed [`ExportToken`].
#[derive(Debug)]
pub struct ActiveExport {
    active: Arc<AtomicBool>,
}

impl Drop for ActiveExport {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_request_is_idempotent() {
        let token = ExportToken::new();
        assert!(!token.is_requested());
        token.request();
        token.request();
        assert!(token.is_requested());
    }

    #[test]
    fn test_clones_share_flag() {
        let token = ExportToken::new();
        let other = token.clone();
        other.request();
        assert!(token.is_requested());
    }

    #[test]
    fn test_second_claim_is_rejected() {
        let token = ExportToken::new();
        let guard = token.claim().unwrap();
        assert!(token.is_active());
        assert!(matches!(token.clone().claim(), Err(ExportError::TokenInUse)));

        drop(guard);
        assert!(!token.is_active());
        assert!(token.claim().is_ok());
    }

    #[test]
    fn test_child_follows_parent_but_not_reverse() {
        let token = ExportToken::new();
        let child = token.child();
        child.cancel();
        assert!(!token.is_requested());

        let child = token.child();
        token.request();
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiter() {
        let token = ExportToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        tokio::time::sleep(Duration::from_millis(5)).await;
        token.request();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should wake")
            .unwrap();
    }
}
