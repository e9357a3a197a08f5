use geocoin_game::{
    ActionError, Direction, GameConfig, GeocoinGame, GridCell, LatLng, MemoryStore, NullMap,
    SessionRecord, TokenId, decode_record,
};
use std::collections::BTreeSet;

const KEY: &str = "geocoin.session";

fn load_default_config() -> GameConfig {
    GameConfig::from_json(include_str!("../../geocoin-web/static/config.json")).unwrap()
}

/// Every cell holds exactly three coins; one-degree tiles keep the math readable.
fn three_coin_world() -> GameConfig {
    GameConfig {
        tile_degrees: 1.0,
        neighborhood_radius: 1,
        spawn_probability: 1.0,
        min_coins: 3,
        max_coins: 3,
        start: LatLng::new(5.5, 5.5),
        ..GameConfig::default()
    }
}

fn serials(game: &GeocoinGame<MemoryStore, NullMap>, cell: GridCell) -> BTreeSet<u32> {
    game.cache(cell)
        .unwrap()
        .coins()
        .iter()
        .map(|coin| coin.id.serial)
        .collect()
}

#[test]
fn shipped_config_matches_defaults() {
    let shipped = load_default_config();
    assert_eq!(shipped, GameConfig::default());
    assert!(shipped.validate().is_ok());
}

#[test]
fn collected_coins_stay_collected_across_rematerialization() {
    let mut game = GeocoinGame::new(three_coin_world(), MemoryStore::default(), NullMap).unwrap();
    let home = GridCell::new(5, 5);
    assert_eq!(serials(&game, home), BTreeSet::from([0, 1, 2]));

    let coin = TokenId::new(home, 1);
    game.collect(home, &coin).unwrap();
    assert_eq!(
        game.ledger()
            .entries()
            .iter()
            .map(|entry| entry.coin.id)
            .collect::<Vec<_>>(),
        vec![coin]
    );
    assert_eq!(serials(&game, home), BTreeSet::from([0, 2]));

    for _ in 0..3 {
        game.move_by(Direction::East);
    }
    assert!(game.cache(home).is_none());
    for _ in 0..3 {
        game.move_by(Direction::West);
    }
    assert_eq!(serials(&game, home), BTreeSet::from([0, 2]));

    game.deposit(home, &coin).unwrap();
    assert!(game.ledger().is_empty());
    assert_eq!(serials(&game, home), BTreeSet::from([0, 1, 2]));
    assert_eq!(game.audit(), Ok(game.mementos().len() * 3));
}

#[test]
fn session_resumes_where_it_was_saved() {
    let store = MemoryStore::default();
    let mut game = GeocoinGame::new(three_coin_world(), store.clone(), NullMap).unwrap();
    game.move_by(Direction::North);
    let cell = game.current_cell();
    let coin = TokenId::new(cell, 2);
    game.collect(cell, &coin).unwrap();
    game.move_by(Direction::North);
    let saved = game.snapshot();
    drop(game);

    let resumed = GeocoinGame::new(three_coin_world(), store, NullMap).unwrap();
    assert_eq!(resumed.position(), saved.player_position);
    assert_eq!(resumed.trail(), saved.movement_history.as_slice());
    assert!(resumed.ledger().contains(&coin));
    assert_eq!(resumed.materialized(), game_cells(&saved));
    assert_eq!(resumed.snapshot(), saved);
    assert!(resumed.audit().is_ok());
}

fn game_cells(record: &SessionRecord) -> Vec<GridCell> {
    let mut cells: Vec<GridCell> = record.visible_caches.iter().map(|v| v.cache_key).collect();
    cells.sort_unstable();
    cells
}

#[test]
fn corrupt_record_falls_back_to_a_new_session() {
    let store = MemoryStore::default();
    store.insert_raw(KEY, r#"{"playerPosition":{"lat":"x"}}"#);
    let game = GeocoinGame::new(three_coin_world(), store, NullMap).unwrap();
    assert_eq!(game.position(), LatLng::new(5.5, 5.5));
    assert!(game.ledger().is_empty());
}

#[test]
fn reset_regenerates_the_baseline_world() {
    let store = MemoryStore::default();
    let mut game = GeocoinGame::new(three_coin_world(), store.clone(), NullMap).unwrap();
    let home = GridCell::new(5, 5);
    game.collect(home, &TokenId::new(home, 0)).unwrap();
    game.move_by(Direction::South);
    game.toggle_tracking();

    assert!(game.request_reset(|| true));
    assert!(store.raw(KEY).is_none());
    assert!(game.ledger().is_empty());
    assert!(!game.tracking());
    assert_eq!(game.trail(), &[LatLng::new(5.5, 5.5)]);
    assert_eq!(serials(&game, home), BTreeSet::from([0, 1, 2]));
    assert!(game.audit().is_ok());

    game.move_by(Direction::East);
    assert!(store.raw(KEY).is_some());
}

#[test]
fn identical_configs_build_identical_worlds() {
    let config = load_default_config().with_world_seed(0x5EED);
    let walk = [
        Direction::North,
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::West,
    ];
    let run = || {
        let mut game = GeocoinGame::new(config.clone(), MemoryStore::default(), NullMap).unwrap();
        for step in walk {
            game.move_by(step);
        }
        game.snapshot()
    };
    assert_eq!(run(), run());

    let other = {
        let mut game = GeocoinGame::new(
            config.clone().with_world_seed(0xD1FF),
            MemoryStore::default(),
            NullMap,
        )
        .unwrap();
        for step in walk {
            game.move_by(step);
        }
        game.snapshot()
    };
    assert_ne!(run().cache_mementos, other.cache_mementos);
}

#[test]
fn stored_record_has_the_documented_shape() {
    let store = MemoryStore::default();
    let mut game = GeocoinGame::new(three_coin_world(), store.clone(), NullMap).unwrap();
    let home = GridCell::new(5, 5);
    game.collect(home, &TokenId::new(home, 1)).unwrap();

    let raw = store.raw(KEY).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["version"], 1);
    assert_eq!(value["playerPosition"]["lat"], 5.5);
    assert_eq!(value["inventory"][0]["id"], "5:5#1");
    assert_eq!(value["inventory"][0]["home"]["i"], 5);
    assert_eq!(value["visibleCaches"].as_array().unwrap().len(), 5);
    assert!(decode_record(&raw).is_ok());
}

#[test]
fn rejected_actions_leave_state_untouched() {
    let store = MemoryStore::default();
    let mut game = GeocoinGame::new(three_coin_world(), store, NullMap).unwrap();
    let home = GridCell::new(5, 5);
    let before = game.snapshot();

    let stranger = TokenId::new(GridCell::new(5, 6), 0);
    assert_eq!(
        game.collect(home, &stranger),
        Err(ActionError::NotInCache(stranger, home))
    );
    assert_eq!(
        game.deposit(home, &stranger),
        Err(ActionError::NotHeld(stranger))
    );
    assert_eq!(game.snapshot(), before);
}
