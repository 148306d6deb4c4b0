//! Terminal host for notebook sessions.
//!
//! Runs one [`Session`] against an engine child process (see [`protocol`]),
//! printing every evaluation as it streams. Everything runs on the current
//! thread inside a `LocalSet`, matching the single-threaded session model.

pub mod engine;
pub mod protocol;
pub mod settings;
pub mod terminal;

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tryit::{OutputRouter, Session, SessionSnapshot};

use crate::engine::ProcessEngine;
use crate::settings::HostSettings;
use crate::terminal::TerminalView;

/// What to run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Literal cell sources, in order
    pub cells: Vec<String>,
    /// Files whose contents each seed one cell, after `cells`
    pub files: Vec<PathBuf>,
    /// Keep reading one run per stdin line after the seeded cells
    pub interactive: bool,
}

/// Seed a session, run it to completion, and return its final state.
pub async fn run(settings: &HostSettings, options: RunOptions) -> Result<SessionSnapshot> {
    let mut sources = options.cells;
    for path in &options.files {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read cell file {}", path.display()))?;
        sources.push(contents.trim_end_matches('\n').to_string());
    }

    let router = Rc::new(OutputRouter::new());
    let finished = Rc::new(Notify::new());
    let engine = Rc::new(ProcessEngine::spawn(
        &settings.engine,
        router.clone(),
        finished.clone(),
    )?);

    let view = TerminalView::new(std::io::stdout());
    let session = Session::create(engine.clone(), &router, Box::new(view), &sources)?;

    run_seeded_cells(&session, &engine, &finished).await?;
    if options.interactive {
        let stdin = BufReader::new(tokio::io::stdin());
        run_lines(&session, &engine, &finished, stdin).await?;
    }

    Ok(session.snapshot())
}

/// Queue every non-empty cell in order and wait until all have finished.
pub async fn run_seeded_cells(
    session: &Session,
    engine: &ProcessEngine,
    finished: &Notify,
) -> Result<()> {
    for cell in session.cells() {
        if cell.input.trim().is_empty() {
            continue;
        }
        session.evaluate(cell.id, &cell.input)?;
    }
    wait_idle(session, engine, finished).await
}

/// Evaluate each input line in the focused cell, one at a time.
///
/// Stops with an error at the first line read after the engine has exited.
pub async fn run_lines<R>(
    session: &Session,
    engine: &ProcessEngine,
    finished: &Notify,
    input: R,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if engine.is_closed() {
            bail!("Engine exited before running {:?}", line);
        }
        let cell = session
            .focused_cell()
            .context("Session has no focused cell")?;
        session.evaluate(cell, &line)?;
        wait_idle(session, engine, finished).await?;
    }
    info!("[host] Input closed");
    Ok(())
}

/// Wait until the session has no executing or pending runs.
pub async fn wait_idle(session: &Session, engine: &ProcessEngine, finished: &Notify) -> Result<()> {
    while !session.is_idle() {
        if engine.is_closed() {
            let state = session.snapshot().queue;
            bail!(
                "Engine exited with {} runs outstanding",
                state.cells.len()
            );
        }
        finished.notified().await;
    }
    Ok(())
}
