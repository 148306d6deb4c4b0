//! The emscripten-compiled interpreter, reached through `Module.ccall`.
//!
//! `ml_session()` returns a new session index; `ml_session_evaluate(index,
//! source)` starts an evaluation whose output comes back through the
//! `ml_output` / `ml_finish` globals.

use js_sys::Array;
use tryit::{EngineError, EvaluationEngine, Handle};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Module, catch)]
    fn ccall(
        ident: &str,
        return_type: &str,
        arg_types: &Array,
        args: &Array,
    ) -> Result<JsValue, JsValue>;
}

pub struct ModuleEngine;

impl EvaluationEngine for ModuleEngine {
    fn create_session(&self) -> Result<Handle, EngineError> {
        let index = ccall("ml_session", "number", &Array::new(), &Array::new())
            .map_err(|e| EngineError::Unavailable(describe(&e)))?
            .as_f64()
            .ok_or_else(|| EngineError::Unavailable("ml_session returned a non-number".into()))?;
        Ok(Handle(index as i32))
    }

    fn evaluate(&self, handle: Handle, source: &str) -> Result<(), EngineError> {
        let arg_types = Array::of2(&"number".into(), &"string".into());
        let args = Array::of2(&JsValue::from(handle.0), &JsValue::from_str(source));
        ccall("ml_session_evaluate", "number", &arg_types, &args)
            .map(|_| ())
            .map_err(|e| EngineError::Dispatch {
                handle,
                message: describe(&e),
            })
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
