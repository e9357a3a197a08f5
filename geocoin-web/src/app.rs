//! The object the page drives: owns the game and the browser timers that
//! feed it.
use geocoin_game::{
    CacheDetail, Direction, GameConfig, GeocoinGame, GridCell, LatLng, TokenId,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use crate::dom;
use crate::error::WebError;
use crate::geo::PositionWatch;
use crate::map::JsMap;
use crate::payload::{DiffSummary, InventoryRow, PlayerStatus};
use crate::storage::BrowserStore;

pub(crate) type Game = GeocoinGame<BrowserStore, JsMap>;
pub(crate) type SharedGame = Rc<RefCell<Game>>;

const RESET_PROMPT: &str = "Reset all progress? Collected coins and cache changes will be lost.";

/// Run `f` against the game unless an outer call is still borrowing it.
pub(crate) fn with_game<T, R>(game: &Rc<RefCell<T>>, f: impl FnOnce(&mut T) -> R) -> Result<R, WebError> {
    let Ok(mut guard) = game.try_borrow_mut() else {
        log::warn!("dropping re-entrant game call");
        return Err(WebError::Busy);
    };
    Ok(f(&mut guard))
}

struct Autosave {
    id: i32,
    _tick: Closure<dyn FnMut()>,
}

impl Autosave {
    fn start(game: &SharedGame, interval_ms: u32) -> Result<Self, WebError> {
        let window = dom::window().ok_or_else(|| WebError::Browser("window unavailable".into()))?;
        let timeout = i32::try_from(interval_ms).unwrap_or(i32::MAX);
        let shared = Rc::clone(game);
        let tick = Closure::wrap(Box::new(move || {
            if let Err(err) = with_game(&shared, |game| game.autosave_tick()) {
                log::debug!("skipped autosave tick: {err}");
            }
        }) as Box<dyn FnMut()>);
        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                tick.as_ref().unchecked_ref(),
                timeout,
            )
            .map_err(|err| WebError::Browser(dom::js_error_message(&err)))?;
        Ok(Self { id, _tick: tick })
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        if let Some(win) = dom::window() {
            win.clear_interval_with_handle(self.id);
        }
    }
}

fn to_js<T: serde::Serialize + ?Sized>(value: &T) -> Result<JsValue, WebError> {
    Ok(serde_wasm_bindgen::to_value(value)?)
}

fn detail_to_js(detail: Option<&CacheDetail>) -> Result<JsValue, WebError> {
    detail.map_or(Ok(JsValue::NULL), to_js)
}

#[wasm_bindgen]
pub struct GeocoinApp {
    game: SharedGame,
    watch: Option<PositionWatch>,
    _autosave: Option<Autosave>,
}

#[wasm_bindgen]
impl GeocoinApp {
    /// Start or resume a session. `config_json` overrides any subset of the
    /// default tuning.
    ///
    /// # Errors
    /// Throws when the config is unparseable or out of range.
    #[wasm_bindgen(constructor)]
    pub fn new(callbacks: JsValue, config_json: Option<String>) -> Result<GeocoinApp, JsValue> {
        let config = match config_json.as_deref() {
            Some(raw) if !raw.trim().is_empty() => {
                GameConfig::from_json(raw).map_err(WebError::from)?
            }
            _ => GameConfig::default(),
        };
        let interval = config.autosave_interval_ms;
        let game = GeocoinGame::new(config, BrowserStore, JsMap::from_callbacks(&callbacks))
            .map_err(WebError::from)?;
        let game = Rc::new(RefCell::new(game));
        let autosave = match Autosave::start(&game, interval) {
            Ok(autosave) => Some(autosave),
            Err(err) => {
                log::warn!("autosave disabled: {err}");
                None
            }
        };
        Ok(Self {
            game,
            watch: None,
            _autosave: autosave,
        })
    }

    /// Step one tile: `north`, `south`, `east` or `west`.
    ///
    /// # Errors
    /// Throws on an unknown direction or while the game is busy.
    #[wasm_bindgen(js_name = moveBy)]
    pub fn move_by(&self, direction: &str) -> Result<JsValue, JsValue> {
        let step: Direction = direction
            .parse()
            .map_err(|()| WebError::Direction(direction.to_string()))?;
        let diff = with_game(&self.game, |game| game.move_by(step))?;
        Ok(to_js(&DiffSummary::from(&diff))?)
    }

    /// # Errors
    /// Throws on a non-finite position or while the game is busy.
    #[wasm_bindgen(js_name = moveTo)]
    pub fn move_to(&self, lat: f64, lng: f64) -> Result<JsValue, JsValue> {
        let diff = with_game(&self.game, |game| game.move_to(LatLng::new(lat, lng)))?
            .map_err(WebError::from)?;
        Ok(to_js(&DiffSummary::from(&diff))?)
    }

    /// Collect a coin and return the cache's updated popup content.
    ///
    /// # Errors
    /// Throws when the key or id is malformed or the action is rejected.
    pub fn collect(&self, cache_key: &str, token_id: &str) -> Result<JsValue, JsValue> {
        let cell: GridCell = cache_key.parse().map_err(WebError::from)?;
        let id: TokenId = token_id.parse().map_err(WebError::from)?;
        let detail = with_game(&self.game, |game| {
            game.collect(cell, &id).map(|_| game.cache_detail(cell))
        })?
        .map_err(WebError::from)?;
        Ok(detail_to_js(detail.as_ref())?)
    }

    /// Deposit a held coin and return the cache's updated popup content.
    ///
    /// # Errors
    /// Throws when the key or id is malformed or the action is rejected.
    pub fn deposit(&self, cache_key: &str, token_id: &str) -> Result<JsValue, JsValue> {
        let cell: GridCell = cache_key.parse().map_err(WebError::from)?;
        let id: TokenId = token_id.parse().map_err(WebError::from)?;
        let detail = with_game(&self.game, |game| {
            game.deposit(cell, &id).map(|_| game.cache_detail(cell))
        })?
        .map_err(WebError::from)?;
        Ok(detail_to_js(detail.as_ref())?)
    }

    /// Popup content for a cache, or `null` when it is not materialized.
    ///
    /// # Errors
    /// Throws on a malformed key or while the game is busy.
    #[wasm_bindgen(js_name = cacheDetail)]
    pub fn cache_detail(&self, cache_key: &str) -> Result<JsValue, JsValue> {
        let cell: GridCell = cache_key.parse().map_err(WebError::from)?;
        let detail = with_game(&self.game, |game| game.cache_detail(cell))?;
        Ok(detail_to_js(detail.as_ref())?)
    }

    /// # Errors
    /// Throws while the game is busy.
    pub fn inventory(&self) -> Result<JsValue, JsValue> {
        let rows = with_game(&self.game, |game| {
            game.ledger()
                .entries()
                .iter()
                .map(InventoryRow::from)
                .collect::<Vec<_>>()
        })?;
        Ok(to_js(&rows)?)
    }

    /// # Errors
    /// Throws while the game is busy.
    pub fn status(&self) -> Result<JsValue, JsValue> {
        let status = with_game(&self.game, |game| PlayerStatus {
            position: game.position(),
            cache_key: game.current_cell().to_string(),
            tracking: game.tracking(),
            held: game.ledger().len(),
        })?;
        Ok(to_js(&status)?)
    }

    /// Pan to the cache a held coin came from. Returns whether it was found.
    ///
    /// # Errors
    /// Throws on a malformed id or while the game is busy.
    #[wasm_bindgen(js_name = focusHome)]
    pub fn focus_home(&self, token_id: &str) -> Result<bool, JsValue> {
        let id: TokenId = token_id.parse().map_err(WebError::from)?;
        Ok(with_game(&self.game, |game| game.focus_home(&id).is_some())?)
    }

    /// Turn geolocation tracking on or off. Returns the new state.
    ///
    /// # Errors
    /// Throws while the game is busy.
    #[wasm_bindgen(js_name = toggleTracking)]
    pub fn toggle_tracking(&mut self) -> Result<bool, JsValue> {
        let enabled = with_game(&self.game, Game::toggle_tracking)?;
        self.watch = None;
        if enabled {
            match PositionWatch::start(&self.game) {
                Ok(watch) => self.watch = Some(watch),
                Err(err) => {
                    let message = err.to_string();
                    with_game(&self.game, |game| game.position_feed_failed(&message))?;
                    return Ok(false);
                }
            }
        }
        Ok(enabled)
    }

    /// Erase all progress after a browser confirmation. Returns whether the
    /// reset ran.
    ///
    /// # Errors
    /// Throws while the game is busy.
    pub fn reset(&mut self) -> Result<bool, JsValue> {
        let reset = with_game(&self.game, |game| {
            game.request_reset(|| dom::confirm(RESET_PROMPT))
        })?;
        if reset {
            self.watch = None;
        }
        Ok(reset)
    }

    /// Save immediately.
    ///
    /// # Errors
    /// Throws while the game is busy.
    pub fn save(&self) -> Result<(), JsValue> {
        Ok(with_game(&self.game, |game| game.autosave_tick())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_entrant_calls_are_refused() {
        let shared = Rc::new(RefCell::new(0_u32));
        assert_eq!(with_game(&shared, |n| { *n += 1; *n }).unwrap(), 1);
        let outer = shared.borrow_mut();
        assert!(matches!(with_game(&shared, |n| *n), Err(WebError::Busy)));
        drop(outer);
        assert_eq!(with_game(&shared, |n| *n).unwrap(), 1);
    }
}
