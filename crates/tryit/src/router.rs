//! Handle → session dispatch for engine callbacks.
//!
//! The engine's callback surface only carries the session handle, so every
//! output chunk and finish signal is resolved here before reaching a
//! [`Session`]. Entries are inserted at session construction and never
//! removed: sessions live as long as the page that hosts them.

use std::cell::RefCell;
use std::collections::BTreeMap;

use log::{trace, warn};

use crate::engine::Handle;
use crate::error::RouteError;
use crate::session::Session;

/// Registry of live sessions, keyed by engine handle.
#[derive(Default)]
pub struct OutputRouter {
    sessions: RefCell<BTreeMap<Handle, Session>>,
}

impl OutputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `session` under its handle.
    ///
    /// Fails if the handle is already taken; the registry is left unchanged.
    pub fn register(&self, session: &Session) -> Result<(), RouteError> {
        let handle = session.handle();
        let mut sessions = self.sessions.borrow_mut();
        if sessions.contains_key(&handle) {
            warn!("[router] Engine reissued live handle {}", handle);
            return Err(RouteError::DuplicateHandle(handle));
        }
        sessions.insert(handle, session.clone());
        trace!("[router] Registered handle {}", handle);
        Ok(())
    }

    pub fn lookup(&self, handle: Handle) -> Option<Session> {
        self.sessions.borrow().get(&handle).cloned()
    }

    /// Route an output chunk to the session owning `handle`.
    pub fn on_output(&self, handle: Handle, text: &str) -> Result<(), RouteError> {
        // Resolve first: the session may create cells (and re-enter the
        // router through its engine) while handling the callback.
        let session = self
            .lookup(handle)
            .ok_or(RouteError::UnknownHandle(handle))?;
        trace!("[router] Output for handle {}: {} bytes", handle, text.len());
        session.deliver_output(text);
        Ok(())
    }

    /// Route an end-of-evaluation signal to the session owning `handle`.
    pub fn on_finish(&self, handle: Handle) -> Result<(), RouteError> {
        let session = self
            .lookup(handle)
            .ok_or(RouteError::UnknownHandle(handle))?;
        trace!("[router] Finish for handle {}", handle);
        session.deliver_finish();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.borrow().is_empty()
    }

    /// Registered handles in ascending order.
    pub fn handles(&self) -> Vec<Handle> {
        self.sessions.borrow().keys().copied().collect()
    }
}

impl std::fmt::Debug for OutputRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputRouter")
            .field("handles", &self.handles())
            .finish()
    }
}
