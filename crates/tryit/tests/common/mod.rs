//! Scripted engine and recording view shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell as StdCell, RefCell};
use std::rc::{Rc, Weak};

use tryit::{CellId, CellRunner, EngineError, EvaluationEngine, Handle, OutputRouter, SessionView};

/// Engine that issues sequential handles and records every evaluation.
///
/// Output is delivered by the test through the router, mimicking the
/// asynchronous callbacks of a real engine.
#[derive(Default)]
pub struct ScriptedEngine {
    next_handle: StdCell<i32>,
    pub refuse_sessions: StdCell<bool>,
    pub fail_evaluations: StdCell<bool>,
    pub evaluations: RefCell<Vec<(Handle, String)>>,
}

impl ScriptedEngine {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn evaluated(&self) -> Vec<(Handle, String)> {
        self.evaluations.borrow().clone()
    }
}

impl EvaluationEngine for ScriptedEngine {
    fn create_session(&self) -> Result<Handle, EngineError> {
        if self.refuse_sessions.get() {
            return Err(EngineError::Unavailable("engine not initialized".into()));
        }
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        Ok(Handle(handle))
    }

    fn evaluate(&self, handle: Handle, source: &str) -> Result<(), EngineError> {
        if self.fail_evaluations.get() {
            return Err(EngineError::Dispatch {
                handle,
                message: "engine crashed".into(),
            });
        }
        self.evaluations
            .borrow_mut()
            .push((handle, source.to_string()));
        Ok(())
    }
}

/// Engine that answers inside `evaluate`, echoing the source back in two
/// chunks before finishing.
pub struct EchoEngine {
    next_handle: StdCell<i32>,
    router: Weak<OutputRouter>,
}

impl EchoEngine {
    pub fn new(router: &Rc<OutputRouter>) -> Rc<Self> {
        Rc::new(Self {
            next_handle: StdCell::new(100),
            router: Rc::downgrade(router),
        })
    }
}

impl EvaluationEngine for EchoEngine {
    fn create_session(&self) -> Result<Handle, EngineError> {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        Ok(Handle(handle))
    }

    fn evaluate(&self, handle: Handle, source: &str) -> Result<(), EngineError> {
        let router = self.router.upgrade().expect("router dropped");
        router.on_output(handle, "echo: ").unwrap();
        router.on_output(handle, source).unwrap();
        router.on_finish(handle).unwrap();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Append { cell: usize, input: String },
    Reset { cell: usize, source: String },
    Output { cell: usize, text: String },
    Focus { cell: usize },
}

/// Everything a [`RecordingView`] saw.
#[derive(Default)]
pub struct ViewLog {
    pub events: Vec<ViewEvent>,
    pub runners: Vec<CellRunner>,
}

impl ViewLog {
    pub fn focused(&self) -> Option<usize> {
        self.events.iter().rev().find_map(|e| match e {
            ViewEvent::Focus { cell } => Some(*cell),
            _ => None,
        })
    }

    /// Rendered output of `cell`, rebuilt from reset/output events.
    pub fn rendered_output(&self, cell: usize) -> String {
        let mut out = String::new();
        for event in &self.events {
            match event {
                ViewEvent::Reset { cell: c, .. } if *c == cell => out.clear(),
                ViewEvent::Output { cell: c, text } if *c == cell => out.push_str(text),
                _ => {}
            }
        }
        out
    }

    /// Click the run control of `cell` with `source` in its input.
    pub fn click(log: &Rc<RefCell<ViewLog>>, cell: usize, source: &str) {
        let runner = log.borrow().runners[cell].clone();
        runner.run(source);
    }
}

pub struct RecordingView {
    log: Rc<RefCell<ViewLog>>,
}

impl RecordingView {
    pub fn new() -> (Box<dyn SessionView>, Rc<RefCell<ViewLog>>) {
        let log = Rc::new(RefCell::new(ViewLog::default()));
        (Box::new(RecordingView { log: log.clone() }), log)
    }
}

impl SessionView for RecordingView {
    fn append_cell(&mut self, cell: CellId, input: &str, runner: CellRunner) {
        let mut log = self.log.borrow_mut();
        log.events.push(ViewEvent::Append {
            cell: cell.index(),
            input: input.to_string(),
        });
        log.runners.push(runner);
    }

    fn reset_output(&mut self, cell: CellId, source: &str) {
        self.log.borrow_mut().events.push(ViewEvent::Reset {
            cell: cell.index(),
            source: source.to_string(),
        });
    }

    fn append_output(&mut self, cell: CellId, text: &str) {
        self.log.borrow_mut().events.push(ViewEvent::Output {
            cell: cell.index(),
            text: text.to_string(),
        });
    }

    fn focus_input(&mut self, cell: CellId) {
        self.log
            .borrow_mut()
            .events
            .push(ViewEvent::Focus { cell: cell.index() });
    }
}
