//! The live document as a [`Page`], and the DOM-backed [`SessionView`].

use std::cell::RefCell;
use std::rc::Rc;

use log::error;
use tryit::markup::{self, Element};
use tryit::{CellId, CellRunner, Page, SessionView, WidgetSettings};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, HtmlTextAreaElement};

use crate::dom::{self, Listener};

/// Set on placeholders that already host a session.
const MOUNTED_ATTRIBUTE: &str = "data-tryit-mounted";
/// Set on the session container inside a placeholder.
const CONTAINER_ATTRIBUTE: &str = "data-tryit-session";

pub struct DomPage {
    document: Document,
    settings: WidgetSettings,
}

impl DomPage {
    pub fn new(document: Document, settings: WidgetSettings) -> Self {
        Self { document, settings }
    }
}

impl Page for DomPage {
    type Placeholder = web_sys::Element;

    fn placeholders(&self) -> Vec<web_sys::Element> {
        let list = match self
            .document
            .query_selector_all(&self.settings.placeholder_selector)
        {
            Ok(list) => list,
            Err(e) => {
                error!(
                    "[bootstrap] Invalid selector {:?}: {:?}",
                    self.settings.placeholder_selector, e
                );
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .collect()
    }

    fn is_mounted(&self, placeholder: &web_sys::Element) -> bool {
        placeholder.has_attribute(MOUNTED_ATTRIBUTE)
    }

    fn mount(&mut self, placeholder: &web_sys::Element) -> Option<Box<dyn SessionView>> {
        let description: Element<Listener> =
            markup::session_container().attr(CONTAINER_ATTRIBUTE, "");
        let mounted = dom::build(&self.document, description).and_then(|built| {
            placeholder.append_child(&built.element)?;
            if let Err(e) = placeholder.set_attribute(MOUNTED_ATTRIBUTE, "") {
                built.element.remove();
                return Err(e);
            }
            Ok(built.element)
        });
        match mounted {
            Ok(container) => Some(Box::new(DomSessionView {
                document: self.document.clone(),
                container,
                run_label: self.settings.run_label.clone(),
                cells: Vec::new(),
            })),
            Err(e) => {
                error!("[bootstrap] Failed to build session container: {:?}", e);
                None
            }
        }
    }

    fn take_cell_sources(&mut self, placeholder: &web_sys::Element) -> Vec<String> {
        let children = placeholder.children();
        let snippets: Vec<web_sys::Element> = (0..children.length())
            .filter_map(|i| children.item(i))
            .filter(|child| !child.has_attribute(CONTAINER_ATTRIBUTE))
            .collect();
        snippets
            .into_iter()
            .map(|child| {
                let source = child.text_content().unwrap_or_default();
                child.remove();
                source
            })
            .collect()
    }
}

struct CellElements {
    input: HtmlTextAreaElement,
    output: web_sys::Element,
    _closures: Vec<Closure<dyn FnMut(Event)>>,
}

/// Renders one session's cells into its container element.
pub struct DomSessionView {
    document: Document,
    container: web_sys::Element,
    run_label: String,
    /// Indexed by cell; `None` where rendering failed.
    cells: Vec<Option<CellElements>>,
}

impl DomSessionView {
    fn try_append_cell(&mut self, input: &str, runner: CellRunner) -> Result<(), JsValue> {
        // The click handler needs the textarea, which exists only after building.
        let textarea: Rc<RefCell<Option<HtmlTextAreaElement>>> = Rc::default();
        let slot = textarea.clone();
        let run: Listener = Box::new(move |_event: Event| {
            let source = match slot.borrow().as_ref() {
                Some(textarea) => textarea.value(),
                None => return,
            };
            runner.run(&source);
        });

        let description: Element<Listener> = markup::cell_block(input, &self.run_label, run);
        let built = dom::build(&self.document, description)?;
        let input = built
            .element
            .query_selector("textarea")?
            .ok_or_else(|| JsValue::from_str("Cell block has no textarea"))?
            .dyn_into::<HtmlTextAreaElement>()
            .map_err(JsValue::from)?;
        let output = built
            .element
            .query_selector(".output")?
            .ok_or_else(|| JsValue::from_str("Cell block has no output"))?;

        self.container.append_child(&built.element)?;
        *textarea.borrow_mut() = Some(input.clone());
        self.cells.push(Some(CellElements {
            input,
            output,
            _closures: built.closures,
        }));
        Ok(())
    }
}

impl SessionView for DomSessionView {
    /// Cells arrive in order, so `cell` is always the next index.
    fn append_cell(&mut self, cell: CellId, input: &str, runner: CellRunner) {
        if let Err(e) = self.try_append_cell(input, runner) {
            error!("[session] Failed to render cell {}: {:?}", cell, e);
            self.cells.push(None);
        }
    }

    fn reset_output(&mut self, cell: CellId, _source: &str) {
        if let Some(elements) = self.cells.get(cell.index()).and_then(Option::as_ref) {
            elements.output.set_text_content(None);
        }
    }

    fn append_output(&mut self, cell: CellId, text: &str) {
        if let Some(elements) = self.cells.get(cell.index()).and_then(Option::as_ref) {
            let mut current = elements.output.text_content().unwrap_or_default();
            current.push_str(text);
            elements.output.set_text_content(Some(&current));
        }
    }

    fn focus_input(&mut self, cell: CellId) {
        if let Some(elements) = self.cells.get(cell.index()).and_then(Option::as_ref) {
            if let Err(e) = elements.input.focus() {
                error!("[session] Failed to focus cell {}: {:?}", cell, e);
            }
        }
    }
}
