//! Error types.
//!
//! There is no recoverable-error category inside a pass: adapter failures
//! propagate uncaught through the reconciliation that issued them, with no
//! retry and no rollback. The instance tree may be left partially updated.

use thiserror::Error;

use crate::host::HostHandle;

/// Failure reported by a host adapter operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The handle does not name a live host node.
    #[error("unknown host node {0:?}")]
    UnknownHandle(HostHandle),
    /// A child operation named a node that is not a child of the parent.
    #[error("host node {child:?} is not a child of {parent:?}")]
    NotAChild {
        /// The parent the operation targeted.
        parent: HostHandle,
        /// The node that was expected under it.
        child: HostHandle,
    },
    /// Adapter-specific failure.
    #[error("host adapter: {0}")]
    Adapter(String),
}

/// Failure of a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A host adapter operation failed mid-pass.
    #[error(transparent)]
    Host(#[from] HostError),
    /// The updater's instance is no longer mounted.
    #[error("component instance is detached")]
    Detached,
    /// A pass was requested while another pass was in flight.
    #[error("reconciliation re-entered while a pass was in flight")]
    Reentrant,
}
