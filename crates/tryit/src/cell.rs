//! Cells: one editable input and one output region each.

use std::cell::RefCell;
use std::rc::Weak;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::session::{Dispatch, Session, SessionInner};

/// Position of a cell within its session.
///
/// Cells are never removed, so the position identifies a cell for the whole
/// life of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub usize);

impl CellId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Model state of one input/output pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub id: CellId,
    /// Current source text
    pub input: String,
    /// Output of the most recent evaluation
    pub output: String,
}

impl Cell {
    /// Append a new cell to `session`, render it, and bind its run control.
    pub(crate) fn create(session: &Session, initial: &str) -> CellId {
        let runner_session = session.downgrade();
        let mut guard = session.inner.borrow_mut();
        let inner = &mut *guard;
        let id = CellId(inner.cells.len());
        inner.cells.push(Cell {
            id,
            input: initial.to_string(),
            output: String::new(),
        });
        debug!("[session {}] Created cell {}", inner.handle, id);

        let runner = CellRunner {
            session: runner_session,
            cell: id,
        };
        inner.view.append_cell(id, initial, runner);
        id
    }
}

/// The run control of one cell.
///
/// Holds only a weak reference to its session; views keep runners inside
/// event handlers without keeping the session alive.
#[derive(Clone)]
pub struct CellRunner {
    pub(crate) session: Weak<RefCell<SessionInner>>,
    pub(crate) cell: CellId,
}

impl CellRunner {
    pub fn cell(&self) -> CellId {
        self.cell
    }

    /// Evaluate `source` in this runner's cell.
    ///
    /// Returns `None` when the session no longer exists.
    pub fn run(&self, source: &str) -> Option<Dispatch> {
        let Some(session) = Session::upgrade(&self.session) else {
            warn!("[session] Run requested for cell {} of a dropped session", self.cell);
            return None;
        };
        match session.evaluate(self.cell, source) {
            Ok(dispatch) => Some(dispatch),
            Err(e) => {
                warn!("[session] Run of cell {} failed: {}", self.cell, e);
                None
            }
        }
    }
}

impl std::fmt::Debug for CellRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellRunner")
            .field("cell", &self.cell)
            .field("live", &(self.session.strong_count() > 0))
            .finish()
    }
}
