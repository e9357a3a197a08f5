//! `MapView` forwarding to JavaScript callbacks.
//!
//! The page passes one object with optional `showCache`, `removeCache`,
//! `movePlayer`, `drawTrail`, `panTo` and `refreshCache` functions. Missing
//! callbacks are skipped; callbacks must not call back into the game.
use geocoin_game::{CellBounds, GridCell, LatLng, MapView};
use js_sys::{Function, Reflect};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::dom;
use crate::payload::CacheMarker;

#[derive(Debug, Clone, Default)]
pub struct JsMap {
    show_cache: Option<Function>,
    remove_cache: Option<Function>,
    move_player: Option<Function>,
    draw_trail: Option<Function>,
    pan_to: Option<Function>,
    refresh_cache: Option<Function>,
}

fn callback(callbacks: &JsValue, name: &str) -> Option<Function> {
    let value = Reflect::get(callbacks, &JsValue::from_str(name)).ok()?;
    let function = value.dyn_into::<Function>().ok();
    if function.is_none() {
        log::debug!("map callback `{name}` not provided");
    }
    function
}

fn invoke<T: Serialize + ?Sized>(name: &str, function: Option<&Function>, payload: &T) {
    let Some(function) = function else {
        return;
    };
    let arg = match serde_wasm_bindgen::to_value(payload) {
        Ok(arg) => arg,
        Err(err) => {
            log::error!("encoding `{name}` payload failed: {err}");
            return;
        }
    };
    if let Err(err) = function.call1(&JsValue::NULL, &arg) {
        log::warn!("map callback `{name}` threw: {}", dom::js_error_message(&err));
    }
}

impl JsMap {
    #[must_use]
    pub fn from_callbacks(callbacks: &JsValue) -> Self {
        if callbacks.is_undefined() || callbacks.is_null() {
            return Self::default();
        }
        Self {
            show_cache: callback(callbacks, "showCache"),
            remove_cache: callback(callbacks, "removeCache"),
            move_player: callback(callbacks, "movePlayer"),
            draw_trail: callback(callbacks, "drawTrail"),
            pan_to: callback(callbacks, "panTo"),
            refresh_cache: callback(callbacks, "refreshCache"),
        }
    }
}

impl MapView for JsMap {
    fn show_cache(&mut self, cell: GridCell, bounds: CellBounds) {
        invoke(
            "showCache",
            self.show_cache.as_ref(),
            &CacheMarker::new(cell, bounds),
        );
    }

    fn remove_cache(&mut self, cell: GridCell) {
        invoke("removeCache", self.remove_cache.as_ref(), &cell.to_string());
    }

    fn move_player(&mut self, position: LatLng) {
        invoke("movePlayer", self.move_player.as_ref(), &position);
    }

    fn draw_trail(&mut self, trail: &[LatLng]) {
        invoke("drawTrail", self.draw_trail.as_ref(), trail);
    }

    fn pan_to(&mut self, position: LatLng) {
        invoke("panTo", self.pan_to.as_ref(), &position);
    }

    fn refresh_cache(&mut self, cell: GridCell) {
        invoke("refreshCache", self.refresh_cache.as_ref(), &cell.to_string());
    }
}
