//! Rendering seam between a session and its presentation.

use crate::cell::{CellId, CellRunner};

/// Renders one session.
///
/// A view owns the session's container (a DOM subtree, a terminal, a test
/// recorder). Sessions call these methods while holding their own state
/// borrowed, so implementations must not call back into the session
/// synchronously; runners are meant to be invoked from later user events.
pub trait SessionView {
    /// Build the block for a new cell: editable input pre-filled with
    /// `input`, a run control bound to `runner`, and an empty output region.
    fn append_cell(&mut self, cell: CellId, input: &str, runner: CellRunner);

    /// An evaluation of `source` in `cell` is starting; clear its output region.
    fn reset_output(&mut self, cell: CellId, source: &str);

    /// Append plain text to the output region of `cell`.
    fn append_output(&mut self, cell: CellId, text: &str);

    /// Move input focus to `cell`.
    fn focus_input(&mut self, cell: CellId);
}
