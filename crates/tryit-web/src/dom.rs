//! Materialize [`tryit::markup::Element`] descriptions with `web_sys`.

use tryit::markup::{Element, Node};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event};

pub type Listener = Box<dyn FnMut(Event)>;

/// A built subtree and the closures backing its event listeners.
///
/// The listeners stop working once `closures` is dropped.
pub struct Built {
    pub element: web_sys::Element,
    pub closures: Vec<Closure<dyn FnMut(Event)>>,
}

pub fn build(document: &Document, description: Element<Listener>) -> Result<Built, JsValue> {
    let mut closures = Vec::new();
    let element = build_into(document, description, &mut closures)?;
    Ok(Built { element, closures })
}

fn build_into(
    document: &Document,
    description: Element<Listener>,
    closures: &mut Vec<Closure<dyn FnMut(Event)>>,
) -> Result<web_sys::Element, JsValue> {
    let element = document.create_element(&description.tag)?;
    for class in &description.classes {
        element.class_list().add_1(class)?;
    }
    for (name, value) in &description.attributes {
        element.set_attribute(name, value)?;
    }
    for (name, value) in &description.properties {
        js_sys::Reflect::set(&element, &JsValue::from_str(name), &JsValue::from_str(value))?;
    }
    for (event, handler) in description.listeners {
        let closure = Closure::wrap(handler);
        element.add_event_listener_with_callback(&event, closure.as_ref().unchecked_ref())?;
        closures.push(closure);
    }
    for child in description.children {
        match child {
            Node::Element(child) => {
                let child = build_into(document, child, closures)?;
                element.append_child(&child)?;
            }
            Node::Text(text) => {
                element.append_child(&document.create_text_node(&text))?;
            }
        }
    }
    Ok(element)
}
