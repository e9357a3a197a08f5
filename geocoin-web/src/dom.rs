//! Thin wrappers over the browser globals the bindings touch.
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Storage, Window};

/// Retrieve the global `window` object, if running in a browser.
#[must_use]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Access the browser `localStorage` handle.
///
/// # Errors
/// Returns an error if the browser window cannot be accessed or `localStorage` is unavailable.
pub fn local_storage() -> Result<Storage, JsValue> {
    window()
        .ok_or_else(|| JsValue::from_str("window unavailable"))?
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage unavailable"))
}

/// Ask the player to confirm a destructive action. Anything but an explicit
/// "OK" counts as a refusal.
#[must_use]
pub fn confirm(message: &str) -> bool {
    window()
        .and_then(|win| win.confirm_with_message(message).ok())
        .unwrap_or(false)
}
