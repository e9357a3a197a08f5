//! Centralized tuning constants for the Geocoin cache engine.
//!
//! These values define the default world: tile size, neighborhood radius,
//! spawn odds and the coin range every cache is drawn from. Overrides come
//! through [`crate::GameConfig`].

// Grid ---------------------------------------------------------------------
pub(crate) const DEFAULT_TILE_DEGREES: f64 = 0.0001;
pub(crate) const DEFAULT_NEIGHBORHOOD_RADIUS: u32 = 8;
pub(crate) const MAX_NEIGHBORHOOD_RADIUS: u32 = 64;
// 180 / 1e-7 keeps every on-planet cell index well inside i32.
pub(crate) const MIN_TILE_DEGREES: f64 = 1e-7;
pub(crate) const MAX_LATITUDE: f64 = 90.0;
pub(crate) const MAX_LONGITUDE: f64 = 180.0;

// Generation ---------------------------------------------------------------
pub(crate) const DEFAULT_SPAWN_PROBABILITY: f64 = 0.1;
pub(crate) const DEFAULT_MIN_COINS: u32 = 1;
pub(crate) const DEFAULT_MAX_COINS: u32 = 5;
pub(crate) const MAX_COINS_PER_CACHE: u32 = 100;
pub(crate) const DEFAULT_WORLD_SEED: u64 = 0;
pub(crate) const COPPER_THRESHOLD: f64 = 0.6;
pub(crate) const SILVER_THRESHOLD: f64 = 0.9;

// Luck keys ----------------------------------------------------------------
pub(crate) const LUCK_COIN_COUNT_SUFFIX: &str = "coinCount";
pub(crate) const LUCK_COIN_KIND_SUFFIX: &str = "kind";

// Session ------------------------------------------------------------------
pub(crate) const DEFAULT_START_LAT: f64 = 36.9895;
pub(crate) const DEFAULT_START_LNG: f64 = -122.0628;
pub(crate) const DEFAULT_AUTOSAVE_INTERVAL_MS: u32 = 60_000;

// Persistence --------------------------------------------------------------
pub(crate) const DEFAULT_STORAGE_KEY: &str = "geocoin.session";
pub(crate) const SESSION_RECORD_VERSION: u32 = 1;
