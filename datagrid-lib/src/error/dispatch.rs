//! Action dispatch error types

use crate::config::Capability;

/// Error returned by an action handler.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandlerError {
    /// The operation failed.
    #[error("{0}")]
    Failed(String),

    /// Some of the per-row operations of a bulk action failed.
    ///
    /// Operations that already succeeded are not rolled back.
    #[error("{failed} of {total} operations failed: {message}")]
    Partial {
        /// Number of failed operations.
        failed: usize,
        /// Number of operations attempted.
        total: usize,
        /// Message of the first failure.
        message: String,
    },
}

impl HandlerError {
    /// Creates a plain failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Why a dispatch did not succeed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    /// The caller's role lacks the action's capability. No handler ran.
    #[error("Role is not allowed to {capability} (action '{action}')")]
    Unauthorized {
        action: String,
        capability: Capability,
    },

    /// No action with this id is configured.
    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    /// The action has no handler bound.
    #[error("Action '{0}' has no handler")]
    NoHandler(String),

    /// A row action without a row, or a bulk action with an empty selection.
    #[error("Action '{0}' has no target rows")]
    NoTarget(String),

    /// The handler rejected.
    #[error("Action '{action}' failed: {message}")]
    Action { action: String, message: String },

    /// One or more sub-operations of a bulk action failed.
    #[error("Action '{action}' failed for {failed} of {total} rows: {message}")]
    BulkPartialFailure {
        action: String,
        failed: usize,
        total: usize,
        message: String,
    },
}

impl DispatchError {
    /// Wraps a handler error for the given action.
    pub fn from_handler(action: impl Into<String>, err: HandlerError) -> Self {
        let action = action.into();
        match err {
            HandlerError::Failed(message) => Self::Action { action, message },
            HandlerError::Partial {
                failed,
                total,
                message,
            } => Self::BulkPartialFailure {
                action,
                failed,
                total,
                message,
            },
        }
    }

    /// Returns `true` if the action was refused before any handler ran.
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::UnknownAction(_) | Self::NoHandler(_) | Self::NoTarget(_)
        )
    }
}
