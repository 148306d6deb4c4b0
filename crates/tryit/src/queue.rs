use serde::Serialize;
use std::collections::VecDeque;

use crate::cell::CellId;

/// Status of a queued cell
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CellQueueStatus {
    /// Waiting in queue
    Pending,
    /// Currently executing
    Executing,
}

/// A cell in the execution queue
#[derive(Debug, Clone, Serialize)]
pub struct QueuedCell {
    pub cell: CellId,
    pub status: CellQueueStatus,
    /// Position in queue (0 = currently executing or next)
    pub position: usize,
}

/// Serializable queue state, part of a session snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionQueueState {
    /// Is the queue processing (has pending or executing cells)?
    pub processing: bool,
    /// Cells currently in queue (pending + executing)
    pub cells: Vec<QueuedCell>,
    /// Currently executing cell (if any)
    pub executing: Option<CellId>,
}

/// A run waiting for the engine
#[derive(Debug, Clone)]
struct PendingRun {
    cell: CellId,
    source: String,
}

/// Per-session execution queue.
///
/// At most one cell executes at a time; the executing cell is the session's
/// active cell. Further runs wait here in FIFO order.
#[derive(Debug, Default)]
pub struct ExecutionQueue {
    /// Pending runs (FIFO)
    pending: VecDeque<PendingRun>,
    /// Currently executing cell
    executing: Option<CellId>,
}

impl ExecutionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a run and return its queue position.
    ///
    /// A cell that is already pending keeps its place and takes the new source.
    pub fn enqueue(&mut self, cell: CellId, source: String) -> usize {
        let offset = usize::from(self.executing.is_some());
        if let Some(index) = self.pending.iter().position(|run| run.cell == cell) {
            self.pending[index].source = source;
            return index + offset;
        }
        self.pending.push_back(PendingRun { cell, source });
        self.pending.len() - 1 + offset
    }

    /// Get the next run to execute (if queue is non-empty and nothing executing)
    pub fn dequeue(&mut self) -> Option<(CellId, String)> {
        if self.executing.is_some() {
            return None;
        }
        let run = self.pending.pop_front()?;
        self.executing = Some(run.cell);
        Some((run.cell, run.source))
    }

    /// Mark the current execution as complete, returning the cell that was executing
    pub fn complete(&mut self) -> Option<CellId> {
        self.executing.take()
    }

    /// Currently executing cell
    pub fn executing(&self) -> Option<CellId> {
        self.executing
    }

    /// Check if a cell is currently executing
    pub fn is_executing(&self, cell: CellId) -> bool {
        self.executing == Some(cell)
    }

    /// Check if queue is empty (no pending and no executing)
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.executing.is_none()
    }

    /// Number of runs waiting behind the executing one
    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn state(&self) -> ExecutionQueueState {
        let mut cells = Vec::new();
        let mut position = 0;

        if let Some(cell) = self.executing {
            cells.push(QueuedCell {
                cell,
                status: CellQueueStatus::Executing,
                position,
            });
            position += 1;
        }

        for run in &self.pending {
            cells.push(QueuedCell {
                cell: run.cell,
                status: CellQueueStatus::Pending,
                position,
            });
            position += 1;
        }

        ExecutionQueueState {
            processing: !self.is_empty(),
            cells,
            executing: self.executing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(n: usize) -> CellId {
        CellId(n)
    }

    #[test]
    fn test_new_creates_empty_queue() {
        let queue = ExecutionQueue::new();
        assert!(queue.is_empty());
        assert!(queue.executing.is_none());
        assert_eq!(queue.pending_len(), 0);
    }

    #[test]
    fn test_enqueue_maintains_fifo_order() {
        let mut queue = ExecutionQueue::new();
        assert_eq!(queue.enqueue(cell(0), "a".into()), 0);
        assert_eq!(queue.enqueue(cell(1), "b".into()), 1);
        assert_eq!(queue.enqueue(cell(2), "c".into()), 2);

        assert_eq!(queue.dequeue(), Some((cell(0), "a".to_string())));
        queue.complete();
        assert_eq!(queue.dequeue(), Some((cell(1), "b".to_string())));
        queue.complete();
        assert_eq!(queue.dequeue(), Some((cell(2), "c".to_string())));
    }

    #[test]
    fn test_enqueue_position_counts_executing_cell() {
        let mut queue = ExecutionQueue::new();
        queue.enqueue(cell(0), "a".into());
        queue.dequeue();

        assert_eq!(queue.enqueue(cell(1), "b".into()), 1);
        assert_eq!(queue.enqueue(cell(2), "c".into()), 2);
    }

    #[test]
    fn test_enqueue_pending_cell_replaces_source() {
        let mut queue = ExecutionQueue::new();
        queue.enqueue(cell(0), "a".into());
        queue.enqueue(cell(1), "b".into());

        assert_eq!(queue.enqueue(cell(0), "a2".into()), 0);
        assert_eq!(queue.pending_len(), 2);
        assert_eq!(queue.dequeue(), Some((cell(0), "a2".to_string())));
    }

    #[test]
    fn test_enqueue_executing_cell_queues_again() {
        let mut queue = ExecutionQueue::new();
        queue.enqueue(cell(0), "a".into());
        queue.dequeue();

        assert_eq!(queue.enqueue(cell(0), "again".into()), 1);
        assert_eq!(queue.pending_len(), 1);
    }

    #[test]
    fn test_dequeue_returns_none_when_already_executing() {
        let mut queue = ExecutionQueue::new();
        queue.enqueue(cell(0), "a".into());
        queue.enqueue(cell(1), "b".into());

        queue.dequeue();
        assert_eq!(queue.dequeue(), None);
        assert_eq!(queue.executing(), Some(cell(0)));
    }

    #[test]
    fn test_dequeue_returns_none_when_empty() {
        let mut queue = ExecutionQueue::new();
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_complete_returns_and_clears_executing() {
        let mut queue = ExecutionQueue::new();
        queue.enqueue(cell(3), "x".into());
        queue.dequeue();

        assert_eq!(queue.complete(), Some(cell(3)));
        assert_eq!(queue.complete(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_state_empty_queue() {
        let state = ExecutionQueue::new().state();

        assert!(!state.processing);
        assert!(state.cells.is_empty());
        assert!(state.executing.is_none());
    }

    #[test]
    fn test_state_with_executing_cell() {
        let mut queue = ExecutionQueue::new();
        queue.enqueue(cell(0), "a".into());
        queue.enqueue(cell(1), "b".into());
        queue.dequeue();

        let state = queue.state();

        assert!(state.processing);
        assert_eq!(state.executing, Some(cell(0)));
        assert_eq!(state.cells.len(), 2);
        assert_eq!(state.cells[0].cell, cell(0));
        assert_eq!(state.cells[0].status, CellQueueStatus::Executing);
        assert_eq!(state.cells[1].cell, cell(1));
        assert_eq!(state.cells[1].status, CellQueueStatus::Pending);
        for (i, queued) in state.cells.iter().enumerate() {
            assert_eq!(queued.position, i);
        }
    }

    #[test]
    fn test_queue_state_serialization() {
        let mut queue = ExecutionQueue::new();
        queue.enqueue(cell(4), "a".into());
        queue.dequeue();

        let json = serde_json::to_value(queue.state()).unwrap();

        assert_eq!(json["processing"], true);
        assert_eq!(json["executing"], 4);
        assert_eq!(json["cells"][0]["status"], "executing");
        assert_eq!(json["cells"][0]["cell"], 4);
    }
}
