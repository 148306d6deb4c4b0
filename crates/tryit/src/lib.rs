//! Session and cell lifecycle for interactive notebook widgets.
//!
//! A documentation page embeds placeholders holding literal code snippets.
//! This crate turns each placeholder into a live [`Session`]: an ordered group
//! of [`Cell`]s that share one evaluation-engine handle. Running a cell sends
//! its source to the engine; the engine answers later, by handle, through the
//! [`OutputRouter`].
//!
//! # Seams
//!
//! - [`EvaluationEngine`]: the external engine (`create_session`, `evaluate`)
//! - [`SessionView`]: whatever renders a session (DOM, terminal, test recorder)
//! - [`Page`]: the document scanned by [`bootstrap`]
//!
//! Everything here is single-threaded (`Rc`/`RefCell`); engine callbacks are
//! expected on the same thread that created the sessions.

mod bootstrap;
mod cell;
mod engine;
mod error;
pub mod markup;
mod queue;
mod router;
mod session;
mod settings;
mod view;

pub use bootstrap::{bootstrap, Page};
pub use cell::{Cell, CellId, CellRunner};
pub use engine::{EvaluationEngine, Handle};
pub use error::{EngineError, RouteError, SessionError};
pub use queue::{CellQueueStatus, ExecutionQueue, ExecutionQueueState, QueuedCell};
pub use router::OutputRouter;
pub use session::{Dispatch, Session, SessionSnapshot};
pub use settings::WidgetSettings;
pub use view::SessionView;
