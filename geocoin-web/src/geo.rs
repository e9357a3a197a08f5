//! `navigator.geolocation` feed. Each delivered fix is applied to completion
//! before the next callback can run. A feed error or a fix arriving after
//! tracking stopped clears the watch early.
use geocoin_game::LatLng;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Geolocation, GeolocationPosition, GeolocationPositionError, PositionOptions};

use crate::app::{SharedGame, with_game};
use crate::dom;
use crate::error::WebError;

/// Browser watch id shared between the watch and its callbacks. Whoever
/// claims it first clears the watch; later claims get `None`.
#[derive(Debug, Clone, Default)]
pub(crate) struct WatchId(Rc<Cell<Option<i32>>>);

impl WatchId {
    pub(crate) fn arm(&self, id: i32) {
        self.0.set(Some(id));
    }

    pub(crate) fn claim(&self) -> Option<i32> {
        self.0.take()
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.0.get().is_some()
    }
}

fn stop(geolocation: &Geolocation, watch: &WatchId, why: &str) {
    if let Some(id) = watch.claim() {
        geolocation.clear_watch(id);
        log::info!("geolocation watch {id} cleared ({why})");
    }
}

pub struct PositionWatch {
    geolocation: Geolocation,
    watch: WatchId,
    _on_fix: Closure<dyn FnMut(GeolocationPosition)>,
    _on_error: Closure<dyn FnMut(GeolocationPositionError)>,
}

impl PositionWatch {
    pub(crate) fn start(game: &SharedGame) -> Result<Self, WebError> {
        let geolocation = dom::window()
            .ok_or_else(|| WebError::Browser("window unavailable".into()))?
            .navigator()
            .geolocation()
            .map_err(|err| WebError::Browser(dom::js_error_message(&err)))?;
        let watch = WatchId::default();

        let fixes = Rc::clone(game);
        let fix_geo = geolocation.clone();
        let fix_watch = watch.clone();
        let on_fix = Closure::wrap(Box::new(move |position: GeolocationPosition| {
            let coords = position.coords();
            let fix = LatLng::new(coords.latitude(), coords.longitude());
            match with_game(&fixes, |game| {
                game.apply_position_fix(fix);
                game.tracking()
            }) {
                Ok(true) => {}
                Ok(false) => stop(&fix_geo, &fix_watch, "tracking is off"),
                Err(err) => log::debug!("dropped position fix {fix:?}: {err}"),
            }
        }) as Box<dyn FnMut(GeolocationPosition)>);

        let failures = Rc::clone(game);
        let error_geo = geolocation.clone();
        let error_watch = watch.clone();
        let on_error = Closure::wrap(Box::new(move |err: GeolocationPositionError| {
            let reason = err.message();
            if let Err(busy) = with_game(&failures, |game| game.position_feed_failed(&reason)) {
                log::debug!("dropped position feed error `{reason}`: {busy}");
            }
            stop(&error_geo, &error_watch, "feed error");
        }) as Box<dyn FnMut(GeolocationPositionError)>);

        let options = PositionOptions::new();
        options.set_enable_high_accuracy(true);
        let id = geolocation
            .watch_position_with_error_callback_and_options(
                on_fix.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
                &options,
            )
            .map_err(|err| WebError::Browser(dom::js_error_message(&err)))?;
        watch.arm(id);
        log::info!("geolocation watch {id} started");
        Ok(Self {
            geolocation,
            watch,
            _on_fix: on_fix,
            _on_error: on_error,
        })
    }

    /// Whether the browser is still delivering fixes to this watch.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.watch.is_armed()
    }
}

impl Drop for PositionWatch {
    fn drop(&mut self) {
        stop(&self.geolocation, &self.watch, "dropped");
    }
}
