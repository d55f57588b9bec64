//! Cooperative cancellation.
//!
//! A rendering request carries a [`CancelToken`]; stages call
//! [`CancelToken::check`] at fixed points and abandon the request once the
//! token is cancelled. Nothing is interrupted mid-query.

use crate::error::{EngineError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Shared stop flag for one request.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` if the request was cancelled before `stage`.
    pub fn check(&self, stage: &str) -> Result<()> {
        if self.is_cancelled() {
            trace!(stage, "Request cancelled");
            return Err(EngineError::Cancelled);
        }
        Ok(())
    }
}
