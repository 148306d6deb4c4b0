//! Error types for the widget core.

use crate::cell::CellId;
use crate::engine::Handle;

/// Failures reported by an evaluation engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Evaluation engine refused to allocate a session: {0}")]
    Unavailable(String),

    #[error("Failed to dispatch evaluation for handle {handle}: {message}")]
    Dispatch { handle: Handle, message: String },
}

/// Failures of the handle → session registry.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("No session registered for handle {0}")]
    UnknownHandle(Handle),

    #[error("Handle {0} is already registered to another session")]
    DuplicateHandle(Handle),
}

/// Failures of session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("Cell {cell} does not belong to session {handle}")]
    UnknownCell { handle: Handle, cell: CellId },
}
