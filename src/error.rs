//! Error types for spark-vdom operations.

use thiserror::Error;

use crate::state::Path;
use crate::types::NodeId;

/// Result type alias for spark-vdom operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced to callers of wired actions and [`mount`](crate::mount).
///
/// Reconciliation itself never fails: a tag mismatch is a replace and
/// duplicate keys are tolerated.
#[derive(Debug, Error)]
pub enum Error {
    /// An action reported a failure. The state write and render request of
    /// that invocation were skipped.
    #[error("action failed at {path}: {message}")]
    Action {
        /// Namespace path of the failing action (filled in by the wirer).
        path: Path,
        /// Description of what went wrong.
        message: String,
    },

    /// No entry with this name exists in the namespace.
    #[error("no action named `{name}` at {path}")]
    UnknownAction {
        /// Namespace that was searched.
        path: Path,
        /// Name that was looked up.
        name: String,
    },

    /// The entry exists but is a nested namespace.
    #[error("`{name}` at {path} is a namespace, not an action")]
    NotAnAction {
        /// Namespace that was searched.
        path: Path,
        /// Name that was looked up.
        name: String,
    },

    /// The entry exists but is an action, not a nested namespace.
    #[error("`{name}` at {path} is an action, not a namespace")]
    NotANamespace {
        /// Namespace that was searched.
        path: Path,
        /// Name that was looked up.
        name: String,
    },

    /// Mount container is not an element node.
    #[error("container {0} is not an element")]
    InvalidContainer(NodeId),
}

impl Error {
    /// Create an action failure. Returned from user action functions.
    #[inline]
    pub fn action(message: impl Into<String>) -> Self {
        Error::Action {
            path: Path::root(),
            message: message.into(),
        }
    }

    /// Attach the namespace path to an action failure raised without one.
    pub(crate) fn at_path(self, at: &Path) -> Self {
        match self {
            Error::Action { path, message } if path.is_root() => Error::Action {
                path: at.clone(),
                message,
            },
            other => other,
        }
    }
}
