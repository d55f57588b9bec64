//! Error types for the memscope windowing engine.
//!
//! Fatal conditions (an unusable window, a bad descriptor, a cancelled
//! request) are returned as `Err`. Recoverable conditions travel next to the
//! degraded data in [`Rendered`] so the caller can still draw a grid or a
//! child list and flag the degraded state.

use crate::memory::block::BlockError;
use crate::variables::value::ValueError;
use thiserror::Error;

/// Main error type for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Load address outside the block, or an empty computed window
    #[error("Range error: {0}")]
    Range(String),

    /// Backing-store query failed; data was replaced by placeholders
    #[error("Fetch failed: {0}")]
    Fetch(#[from] BlockError),

    /// Indexed value size could not be determined
    #[error("Size query failed: {0}")]
    SizeQuery(ValueError),

    /// Element retrieval for an expansion failed
    #[error("Element query failed at [{offset}..{end}): {source}")]
    ElementQuery {
        offset: u64,
        end: u64,
        source: ValueError,
    },

    /// A logical structure transform failed; the last good value was kept
    #[error("Logical structure '{id}' failed: {source}")]
    Transform { id: String, source: ValueError },

    /// The request was superseded before it finished
    #[error("Request cancelled")]
    Cancelled,

    /// Viewport state cannot describe a grid
    #[error("Invalid content descriptor: {0}")]
    InvalidDescriptor(String),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Worker task died before producing a result
    #[error("Worker error: {0}")]
    Worker(String),
}

impl EngineError {
    /// Whether the error degrades a result instead of aborting it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::Fetch(_)
                | EngineError::SizeQuery(_)
                | EngineError::ElementQuery { .. }
                | EngineError::Transform { .. }
        )
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Data handed back to a view, possibly degraded.
///
/// `failure` is set when the data contains placeholders or was computed from
/// a fallback; the data itself is always complete enough to render.
#[derive(Debug)]
pub struct Rendered<T> {
    pub data: T,
    pub failure: Option<EngineError>,
}

impl<T> Rendered<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            failure: None,
        }
    }

    pub fn degraded(data: T, failure: EngineError) -> Self {
        Self {
            data,
            failure: Some(failure),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Rendered<U> {
        Rendered {
            data: f(self.data),
            failure: self.failure,
        }
    }
}
