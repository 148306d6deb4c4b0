//! Evaluation engine backed by a child process speaking the line protocol.
//!
//! Requests are queued on an unbounded channel and written by a local task,
//! so `create_session` and `evaluate` never block. A second local task reads
//! engine events and feeds them to the [`OutputRouter`]. Both tasks use
//! `spawn_local`: the engine must be created inside a `LocalSet`.

use std::cell::Cell;
use std::process::Stdio;
use std::rc::Rc;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, Notify};
use tryit::{EngineError, EvaluationEngine, Handle, OutputRouter};

use crate::protocol::{decode_event, encode_line, EngineEvent, EngineRequest};

pub struct ProcessEngine {
    requests: mpsc::UnboundedSender<EngineRequest>,
    next_handle: Cell<i32>,
    closed: Rc<Cell<bool>>,
    _child: Option<Child>,
}

impl ProcessEngine {
    /// Start `command` (program followed by its arguments) as the engine.
    ///
    /// `finished` is notified after every finish event and when the engine
    /// stops producing events.
    pub fn spawn(command: &[String], router: Rc<OutputRouter>, finished: Rc<Notify>) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .context("Engine command is empty")?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start engine `{}`", program))?;
        info!("[engine] Started {} (pid {:?})", program, child.id());

        let stdin = child.stdin.take().context("Engine stdin is not piped")?;
        let stdout = child.stdout.take().context("Engine stdout is not piped")?;

        let mut engine = Self::from_io(stdout, stdin, router, finished);
        engine._child = Some(child);
        Ok(engine)
    }

    /// Speak the protocol over an arbitrary reader/writer pair.
    pub fn from_io<R, W>(
        reader: R,
        writer: W,
        router: Rc<OutputRouter>,
        finished: Rc<Notify>,
    ) -> Self
    where
        R: AsyncRead + Unpin + 'static,
        W: AsyncWrite + Unpin + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let closed = Rc::new(Cell::new(false));

        tokio::task::spawn_local(write_requests(writer, rx));
        tokio::task::spawn_local(read_events(reader, router, finished, closed.clone()));

        Self {
            requests: tx,
            next_handle: Cell::new(0),
            closed,
            _child: None,
        }
    }

    /// True once the engine can no longer answer.
    pub fn is_closed(&self) -> bool {
        self.closed.get() || self.requests.is_closed()
    }
}

impl EvaluationEngine for ProcessEngine {
    fn create_session(&self) -> Result<Handle, EngineError> {
        if self.is_closed() {
            return Err(EngineError::Unavailable("engine process has exited".into()));
        }
        let handle = Handle(self.next_handle.get());
        self.requests
            .send(EngineRequest::Open { handle })
            .map_err(|_| EngineError::Unavailable("engine input is closed".into()))?;
        self.next_handle.set(handle.0 + 1);
        Ok(handle)
    }

    fn evaluate(&self, handle: Handle, source: &str) -> Result<(), EngineError> {
        if self.closed.get() {
            return Err(EngineError::Dispatch {
                handle,
                message: "engine process has exited".into(),
            });
        }
        self.requests
            .send(EngineRequest::Evaluate {
                handle,
                source: source.to_string(),
            })
            .map_err(|_| EngineError::Dispatch {
                handle,
                message: "engine input is closed".into(),
            })
    }
}

async fn write_requests<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<EngineRequest>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(request) = rx.recv().await {
        let line = match encode_line(&request) {
            Ok(line) => line,
            Err(e) => {
                error!("[engine] Failed to encode {:?}: {}", request, e);
                continue;
            }
        };
        if let Err(e) = writer.write_all(&line).await {
            error!("[engine] Failed to write request: {}", e);
            break;
        }
        if let Err(e) = writer.flush().await {
            error!("[engine] Failed to flush request: {}", e);
            break;
        }
    }
    debug!("[engine] Request writer stopped");
}

async fn read_events<R>(
    reader: R,
    router: Rc<OutputRouter>,
    finished: Rc<Notify>,
    closed: Rc<Cell<bool>>,
) where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("[engine] Engine closed its output");
                break;
            }
            Err(e) => {
                error!("[engine] Failed to read engine output: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match decode_event(&line) {
            Ok(EngineEvent::Output { handle, text }) => {
                if let Err(e) = router.on_output(handle, &text) {
                    warn!("[engine] {}", e);
                }
            }
            Ok(EngineEvent::Finish { handle }) => {
                if let Err(e) = router.on_finish(handle) {
                    warn!("[engine] {}", e);
                }
                finished.notify_one();
            }
            Ok(EngineEvent::Error { message }) => {
                warn!("[engine] Engine reported: {}", message);
            }
            Err(e) => {
                warn!("[engine] Ignoring malformed line {:?}: {}", line, e);
            }
        }
    }

    closed.set(true);
    finished.notify_one();
}
