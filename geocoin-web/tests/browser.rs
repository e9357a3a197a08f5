#![cfg(target_arch = "wasm32")]

use geocoin_game::{Direction, GameConfig, GeocoinGame, GridCell, KeyValueStore, LatLng, TokenId};
use geocoin_web::{BrowserStore, GeocoinApp, JsMap, dom};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

const KEY: &str = "geocoin.test.session";

fn test_config() -> GameConfig {
    GameConfig {
        tile_degrees: 1.0,
        neighborhood_radius: 1,
        spawn_probability: 1.0,
        start: LatLng::new(0.5, 0.5),
        storage_key: KEY.to_string(),
        ..GameConfig::default()
    }
}

fn clear_slot() {
    BrowserStore.remove(KEY).expect("clear slot");
}

#[wasm_bindgen_test]
fn local_storage_round_trips() {
    clear_slot();
    assert!(dom::local_storage().is_ok());
    BrowserStore.set(KEY, "value").expect("set");
    assert_eq!(BrowserStore.get(KEY).expect("get"), Some("value".to_string()));
    clear_slot();
    assert_eq!(BrowserStore.get(KEY).expect("get"), None);
}

#[wasm_bindgen_test]
fn game_persists_into_local_storage() {
    clear_slot();
    let mut game =
        GeocoinGame::new(test_config(), BrowserStore, JsMap::default()).expect("game starts");
    let cell = GridCell::new(0, 0);
    let id = TokenId::new(cell, 0);
    game.collect(cell, &id).expect("collect");
    game.move_by(Direction::North);
    drop(game);

    let resumed =
        GeocoinGame::new(test_config(), BrowserStore, JsMap::default()).expect("game resumes");
    assert!(resumed.ledger().contains(&id));
    assert_eq!(resumed.current_cell(), GridCell::new(1, 0));
    clear_slot();
}

#[wasm_bindgen_test]
fn exported_app_rejects_bad_input() {
    clear_slot();
    let config = serde_json::to_string(&test_config()).expect("config json");
    let app = GeocoinApp::new(JsValue::UNDEFINED, Some(config)).expect("app starts");
    assert!(app.move_by("sideways").is_err());
    assert!(app.collect("nope", "0:0#0").is_err());
    assert!(app.collect("9:9", "9:9#0").is_err());
    assert!(app.move_by("north").is_ok());
    assert!(app.cache_detail("1:0").expect("detail").is_object());
    assert!(app.cache_detail("40:40").expect("detail").is_null());
    clear_slot();
}

#[wasm_bindgen_test]
fn app_rejects_invalid_config() {
    assert!(GeocoinApp::new(JsValue::UNDEFINED, Some("{\"tileDegrees\":0}".into())).is_err());
    assert!(GeocoinApp::new(JsValue::UNDEFINED, Some("not json".into())).is_err());
    assert!(GeocoinApp::new(JsValue::UNDEFINED, Some("{\"tileDegrees\":1e-12}".into())).is_err());
    assert!(GeocoinApp::new(JsValue::UNDEFINED, Some("{\"maxCoins\":4294967295}".into())).is_err());
}
