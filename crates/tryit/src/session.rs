//! Sessions: ordered cells sharing one evaluation-engine handle.
//!
//! A session mediates between user-triggered runs and engine-driven output
//! and finish events. Runs are serialized through an [`ExecutionQueue`]: the
//! executing cell is the *active* cell, the only one that receives output.
//! When an evaluation finishes, focus moves to the next cell (a fresh empty
//! cell is appended after the last one) and the next queued run starts.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, error, info, warn};
use serde::Serialize;

use crate::cell::{Cell, CellId, CellRunner};
use crate::engine::{EvaluationEngine, Handle};
use crate::error::SessionError;
use crate::queue::{ExecutionQueue, ExecutionQueueState};
use crate::router::OutputRouter;
use crate::view::SessionView;

/// How a run request was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Sent to the engine immediately
    Started,
    /// Waiting behind the active cell; `position` counts the active cell as 0
    Queued { position: usize },
}

/// Serializable state of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub handle: Handle,
    pub cells: Vec<Cell>,
    pub active_cell: Option<CellId>,
    pub focused_cell: Option<CellId>,
    pub queue: ExecutionQueueState,
}

pub(crate) struct SessionInner {
    pub(crate) handle: Handle,
    engine: Rc<dyn EvaluationEngine>,
    pub(crate) view: Box<dyn SessionView>,
    pub(crate) cells: Vec<Cell>,
    queue: ExecutionQueue,
    focused: Option<CellId>,
}

/// A live notebook widget.
///
/// Cloning yields another reference to the same session.
#[derive(Clone)]
pub struct Session {
    pub(crate) inner: Rc<RefCell<SessionInner>>,
}

impl Session {
    /// Create a session seeded with `initial` cell sources.
    ///
    /// Allocates a handle from `engine` and registers the session in
    /// `router` before any cell exists, so no callback for the handle can
    /// miss it. An empty `initial` yields one empty cell. The first cell
    /// receives input focus.
    pub fn create<I, S>(
        engine: Rc<dyn EvaluationEngine>,
        router: &OutputRouter,
        view: Box<dyn SessionView>,
        initial: I,
    ) -> Result<Self, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let handle = engine.create_session()?;
        let session = Session {
            inner: Rc::new(RefCell::new(SessionInner {
                handle,
                engine,
                view,
                cells: Vec::new(),
                queue: ExecutionQueue::new(),
                focused: None,
            })),
        };
        router.register(&session)?;

        for source in initial {
            Cell::create(&session, source.as_ref());
        }
        if session.cell_count() == 0 {
            Cell::create(&session, "");
        }
        session.focus(CellId(0));

        info!(
            "[session {}] Created with {} cells",
            handle,
            session.cell_count()
        );
        Ok(session)
    }

    pub fn handle(&self) -> Handle {
        self.inner.borrow().handle
    }

    pub fn cell_count(&self) -> usize {
        self.inner.borrow().cells.len()
    }

    pub fn cell(&self, cell: CellId) -> Option<Cell> {
        self.inner.borrow().cells.get(cell.index()).cloned()
    }

    pub fn cells(&self) -> Vec<Cell> {
        self.inner.borrow().cells.clone()
    }

    /// The cell currently awaiting output.
    pub fn active_cell(&self) -> Option<CellId> {
        self.inner.borrow().queue.executing()
    }

    pub fn focused_cell(&self) -> Option<CellId> {
        self.inner.borrow().focused
    }

    /// True when nothing is executing or waiting.
    pub fn is_idle(&self) -> bool {
        self.inner.borrow().queue.is_empty()
    }

    /// Run control for `cell`, or `None` if the cell does not exist.
    pub fn runner(&self, cell: CellId) -> Option<CellRunner> {
        (cell.index() < self.cell_count()).then(|| CellRunner {
            session: self.downgrade(),
            cell,
        })
    }

    pub fn ptr_eq(&self, other: &Session) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Record a user edit of `cell`'s input.
    pub fn set_input(&self, cell: CellId, source: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.borrow_mut();
        let handle = inner.handle;
        let entry = inner
            .cells
            .get_mut(cell.index())
            .ok_or(SessionError::UnknownCell { handle, cell })?;
        entry.input = source.to_string();
        Ok(())
    }

    /// Evaluate `source` in `cell`.
    ///
    /// Starts immediately when the session is idle; otherwise the run waits
    /// until the active evaluation finishes. Never blocks on the engine.
    pub fn evaluate(&self, cell: CellId, source: &str) -> Result<Dispatch, SessionError> {
        let (handle, position) = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let handle = inner.handle;
            let entry = inner
                .cells
                .get_mut(cell.index())
                .ok_or(SessionError::UnknownCell { handle, cell })?;
            entry.input = source.to_string();
            (handle, inner.queue.enqueue(cell, source.to_string()))
        };

        if position == 0 {
            self.pump();
            Ok(Dispatch::Started)
        } else {
            debug!(
                "[session {}] Cell {} queued at position {}",
                handle, cell, position
            );
            Ok(Dispatch::Queued { position })
        }
    }

    /// Append an output chunk to the active cell.
    pub fn deliver_output(&self, text: &str) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        let Some(cell) = inner.queue.executing() else {
            warn!(
                "[session {}] Dropping output with no active cell: {:?}",
                inner.handle, text
            );
            return;
        };
        inner.cells[cell.index()].output.push_str(text);
        inner.view.append_output(cell, text);
    }

    /// End the active evaluation and advance focus.
    pub fn deliver_finish(&self) {
        let (handle, finished, last) = {
            let mut inner = self.inner.borrow_mut();
            let handle = inner.handle;
            let Some(cell) = inner.queue.complete() else {
                warn!("[session {}] Dropping finish with no active cell", handle);
                return;
            };
            (handle, cell, cell.index() + 1 >= inner.cells.len())
        };
        debug!("[session {}] Cell {} finished", handle, finished);

        let next = if last {
            Cell::create(self, "")
        } else {
            CellId(finished.index() + 1)
        };
        self.focus(next);
        self.pump();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.borrow();
        SessionSnapshot {
            handle: inner.handle,
            cells: inner.cells.clone(),
            active_cell: inner.queue.executing(),
            focused_cell: inner.focused,
            queue: inner.queue.state(),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<SessionInner>> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(weak: &Weak<RefCell<SessionInner>>) -> Option<Session> {
        weak.upgrade().map(|inner| Session { inner })
    }

    fn focus(&self, cell: CellId) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        inner.focused = Some(cell);
        inner.view.focus_input(cell);
    }

    /// Start queued runs until one is accepted by the engine.
    ///
    /// No borrow is held across `engine.evaluate`: engines may report output
    /// and finish from inside the call.
    fn pump(&self) {
        loop {
            let (engine, handle, cell, source) = {
                let mut guard = self.inner.borrow_mut();
                let inner = &mut *guard;
                let Some((cell, source)) = inner.queue.dequeue() else {
                    return;
                };
                inner.cells[cell.index()].output.clear();
                inner.view.reset_output(cell, &source);
                (Rc::clone(&inner.engine), inner.handle, cell, source)
            };

            debug!("[session {}] Evaluating cell {}", handle, cell);
            match engine.evaluate(handle, &source) {
                Ok(()) => return,
                Err(e) => {
                    error!("[session {}] Cell {}: {}", handle, cell, e);
                    let mut inner = self.inner.borrow_mut();
                    if inner.queue.is_executing(cell) {
                        inner.queue.complete();
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_borrow() {
            Ok(inner) => f
                .debug_struct("Session")
                .field("handle", &inner.handle)
                .field("cells", &inner.cells.len())
                .field("active", &inner.queue.executing())
                .finish(),
            Err(_) => f.debug_struct("Session").finish_non_exhaustive(),
        }
    }
}
