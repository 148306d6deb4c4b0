//! The evaluation engine contract.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Opaque session identifier issued by the evaluation engine.
///
/// The engine tags every output chunk and finish signal with the handle of
/// the session it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(pub i32);

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Handle {
    fn from(value: i32) -> Self {
        Handle(value)
    }
}

/// An external evaluation engine.
///
/// `evaluate` is fire-and-forget: the engine later reports zero or more
/// output chunks followed by exactly one finish, via
/// [`OutputRouter::on_output`](crate::OutputRouter::on_output) and
/// [`OutputRouter::on_finish`](crate::OutputRouter::on_finish). Engines may
/// deliver those callbacks synchronously from inside `evaluate`.
pub trait EvaluationEngine {
    /// Allocate a new session handle.
    fn create_session(&self) -> Result<Handle, EngineError>;

    /// Submit `source` for evaluation under `handle`.
    fn evaluate(&self, handle: Handle, source: &str) -> Result<(), EngineError>;
}
