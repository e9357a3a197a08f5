#![forbid(unsafe_code)]
//! Browser bindings for Geocoin: `localStorage` persistence, the
//! geolocation feed, console logging and a callback bridge to whatever map
//! library the page uses.
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod app;
pub mod dom;
pub mod error;
pub mod geo;
pub mod logger;
pub mod map;
pub mod payload;
pub mod storage;

pub use app::GeocoinApp;
pub use error::WebError;
pub use map::JsMap;
pub use storage::{BrowserStore, BrowserStoreError};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    let level = dom::window()
        .and_then(|win| win.location().search().ok())
        .and_then(|search| {
            search
                .trim_start_matches('?')
                .split('&')
                .find_map(|pair| pair.strip_prefix("log=").map(str::to_string))
        });
    if logger::init(logger::level_from_name(level.as_deref())).is_err() {
        web_sys::console::warn_1(&"geocoin logger already installed".into());
    }
}
