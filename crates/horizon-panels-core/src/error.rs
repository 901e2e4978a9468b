//! Error types for Horizon Panels core.
//!
//! Each subsystem has its own error enum so callers can match on exactly the
//! failures an operation can produce:
//!
//! - [`PoolError`] - worker pool creation and submission
//! - [`TaskError`] - the outcome of a unit of background work
//! - [`DispatchError`] - posting to the UI thread
//! - [`BinderError`] - view attachment checks

use std::error::Error as StdError;
use std::fmt;

/// Why a piece of background work was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// Cancellation was requested through a token or job handle.
    Requested,
    /// The worker pool is shutting down.
    Shutdown,
    /// A newer submission displaced this one while it was still waiting.
    Evicted,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Requested => write!(f, "cancellation requested"),
            CancelReason::Shutdown => write!(f, "worker pool shutting down"),
            CancelReason::Evicted => write!(f, "evicted by a newer submission"),
        }
    }
}

/// Work observed a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled: {reason}")]
pub struct Cancelled {
    /// What triggered the cancellation.
    pub reason: CancelReason,
}

impl Cancelled {
    /// Create a cancellation with the given reason.
    pub fn new(reason: CancelReason) -> Self {
        Self { reason }
    }
}

/// The failure outcome of a background task.
///
/// Cancellation is kept distinct from every other failure so the task runner
/// can route it to the cancellation callback instead of the error display.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The task was interrupted and stopped early.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    /// The task failed. `message` is what the user sees.
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

impl TaskError {
    /// Create a failure with a user-facing message and no underlying cause.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error. Its `Display` output becomes the user-facing
    /// message and the error itself is kept as the source for logging.
    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Failed {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Create a failure with a user-facing message and a separate cause.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Failed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns `true` if this is a cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskError::Cancelled(_))
    }

    /// Render the error and its full source chain on one line, for logs.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = StdError::source(self);
        while let Some(cause) = source {
            out.push_str(": ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

/// Errors from the worker pool.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The pool no longer accepts work. The submitted job was discarded.
    #[error("worker pool has been shut down")]
    ShutDown,

    /// A worker thread could not be started.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// `init_global` was called after the global pool already existed.
    #[error("global worker pool already initialized")]
    GlobalAlreadyInitialized,
}

/// Errors from posting work to the UI thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The event queue that owned the UI thread has been dropped.
    #[error("UI event queue is closed")]
    Closed,
}

/// Errors from view attachment checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BinderError {
    /// No view is currently attached to the controller.
    #[error("no view attached to controller")]
    NotAttached,
}
