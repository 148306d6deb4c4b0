//! One-time page scan that turns placeholders into live sessions.

use std::rc::Rc;

use log::{debug, error, info};

use crate::engine::EvaluationEngine;
use crate::router::OutputRouter;
use crate::session::Session;
use crate::view::SessionView;

/// A document containing notebook placeholders.
pub trait Page {
    type Placeholder;

    /// Placeholders in document order.
    fn placeholders(&self) -> Vec<Self::Placeholder>;

    /// True if `placeholder` already hosts a session container.
    fn is_mounted(&self, placeholder: &Self::Placeholder) -> bool;

    /// Insert an empty session container into `placeholder` and return the
    /// view that renders into it, or `None` if the container cannot be built.
    /// A failed mount leaves the placeholder untouched.
    fn mount(&mut self, placeholder: &Self::Placeholder) -> Option<Box<dyn SessionView>>;

    /// Read the text of each child of `placeholder`, in order, and remove
    /// the children. The container inserted by [`Page::mount`] is not a
    /// child source and stays.
    fn take_cell_sources(&mut self, placeholder: &Self::Placeholder) -> Vec<String>;
}

/// Replace every placeholder on `page` with a live session.
///
/// Placeholders that are already mounted are skipped, so repeated calls only
/// pick up new placeholders. Placeholders that cannot be mounted keep their
/// literal contents; those whose session cannot be created are left inert.
/// Returns the created sessions in document order.
pub fn bootstrap<P: Page>(
    page: &mut P,
    engine: Rc<dyn EvaluationEngine>,
    router: &OutputRouter,
) -> Vec<Session> {
    let placeholders = page.placeholders();
    info!("[bootstrap] Found {} placeholders", placeholders.len());

    let mut sessions = Vec::with_capacity(placeholders.len());
    for (index, placeholder) in placeholders.iter().enumerate() {
        if page.is_mounted(placeholder) {
            debug!("[bootstrap] Placeholder {} already mounted", index);
            continue;
        }
        let Some(view) = page.mount(placeholder) else {
            error!("[bootstrap] Placeholder {} could not be mounted", index);
            continue;
        };
        let sources = page.take_cell_sources(placeholder);
        match Session::create(Rc::clone(&engine), router, view, &sources) {
            Ok(session) => sessions.push(session),
            Err(e) => error!("[bootstrap] Placeholder {} left inert: {}", index, e),
        }
    }
    sessions
}
