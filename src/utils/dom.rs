//! DOM and Web API utility functions.

use js_sys::{Object, Reflect};
use wasm_bindgen::JsCast;
use web_sys::Window;

/// Get the browser window object.
#[inline]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Read an object-valued global such as an injected wallet.
pub fn global_object(name: &str) -> Option<Object> {
    let window = window()?;
    Reflect::get(&window, &name.into())
        .ok()
        .and_then(|value| value.dyn_into::<Object>().ok())
}
