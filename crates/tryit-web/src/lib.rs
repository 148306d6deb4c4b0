//! Browser frontend for tryit notebook widgets.
//!
//! On load the module installs the engine's `ml_output` / `ml_finish`
//! callbacks on `window` and waits for the emscripten runtime
//! (`Module.onRuntimeInitialized`) before replacing every placeholder on the
//! page with a live session.
//!
//! Settings are read from `window.TRYIT_SETTINGS` when present:
//!
//! ```js
//! window.TRYIT_SETTINGS = { placeholder_selector: ".tryit", run_label: "Run" };
//! ```

pub mod dom;
pub mod engine;
pub mod page;

use std::cell::RefCell;
use std::rc::Rc;

use log::{error, info, warn};
use tryit::{Handle, OutputRouter, Session, WidgetSettings};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::engine::ModuleEngine;
use crate::page::DomPage;

thread_local! {
    static ROUTER: Rc<OutputRouter> = Rc::new(OutputRouter::new());
    static SESSIONS: RefCell<Vec<Session>> = const { RefCell::new(Vec::new()) };
}

fn router() -> Rc<OutputRouter> {
    ROUTER.with(Rc::clone)
}

/// Engine output for the session identified by `index`.
fn ml_output(index: i32, text: &str) {
    if let Err(e) = router().on_output(Handle(index), text) {
        warn!("[router] {}", e);
    }
}

/// The engine finished evaluating for the session identified by `index`.
fn ml_finish(index: i32) {
    if let Err(e) = router().on_finish(Handle(index)) {
        warn!("[router] {}", e);
    }
}

/// Scan the page and create a session for every placeholder not yet mounted.
///
/// Returns the number of sessions created by this call.
#[wasm_bindgen]
pub fn bootstrap_page() -> Result<usize, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))?;

    let mut page = DomPage::new(document, load_settings(&window));
    let sessions = tryit::bootstrap(&mut page, Rc::new(ModuleEngine), &router());
    let created = sessions.len();
    SESSIONS.with(|all| all.borrow_mut().extend(sessions));
    Ok(created)
}

fn load_settings(window: &web_sys::Window) -> WidgetSettings {
    let value = match js_sys::Reflect::get(window, &"TRYIT_SETTINGS".into()) {
        Ok(value) if !value.is_undefined() && !value.is_null() => value,
        _ => return WidgetSettings::default(),
    };
    match serde_wasm_bindgen::from_value(value) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("[bootstrap] Ignoring invalid TRYIT_SETTINGS: {}", e);
            WidgetSettings::default()
        }
    }
}

/// Expose `ml_output` and `ml_finish` as globals for the engine to call.
fn install_callbacks(window: &web_sys::Window) -> Result<(), JsValue> {
    let output = Closure::<dyn Fn(i32, String)>::new(|index, text: String| ml_output(index, &text));
    js_sys::Reflect::set(window, &"ml_output".into(), output.as_ref())?;
    output.forget();

    let finish = Closure::<dyn Fn(i32)>::new(ml_finish);
    js_sys::Reflect::set(window, &"ml_finish".into(), finish.as_ref())?;
    finish.forget();
    Ok(())
}

fn run_bootstrap() {
    match bootstrap_page() {
        Ok(count) => info!("[bootstrap] {} sessions ready", count),
        Err(e) => error!("[bootstrap] Failed: {:?}", e),
    }
}

/// Bootstrap once the engine runtime is up, keeping any existing
/// `onRuntimeInitialized` handler.
fn hook_runtime_initialized(window: &web_sys::Window) -> Result<(), JsValue> {
    let module = js_sys::Reflect::get(window, &"Module".into())?;
    if module.is_undefined() || module.is_null() {
        warn!("[engine] No Module on the page; call bootstrap_page() once the engine is loaded");
        return Ok(());
    }

    let called_run = js_sys::Reflect::get(&module, &"calledRun".into())?;
    if called_run.is_truthy() {
        run_bootstrap();
        return Ok(());
    }

    let previous = js_sys::Reflect::get(&module, &"onRuntimeInitialized".into())?;
    let on_ready = Closure::once(move || {
        if let Some(previous) = previous.dyn_ref::<js_sys::Function>() {
            if let Err(e) = previous.call0(&JsValue::NULL) {
                error!("[engine] onRuntimeInitialized handler failed: {:?}", e);
            }
        }
        run_bootstrap();
    });
    js_sys::Reflect::set(&module, &"onRuntimeInitialized".into(), on_ready.as_ref())?;
    on_ready.forget();
    Ok(())
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(start))]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already set: {}", e).into());
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    install_callbacks(&window)?;
    hook_runtime_initialized(&window)
}
