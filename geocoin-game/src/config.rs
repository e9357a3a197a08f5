//! World and session tuning loaded from JSON.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_AUTOSAVE_INTERVAL_MS, DEFAULT_MAX_COINS, DEFAULT_MIN_COINS,
    DEFAULT_NEIGHBORHOOD_RADIUS, DEFAULT_SPAWN_PROBABILITY, DEFAULT_START_LAT, DEFAULT_START_LNG,
    DEFAULT_STORAGE_KEY, DEFAULT_TILE_DEGREES, DEFAULT_WORLD_SEED, MAX_COINS_PER_CACHE,
    MAX_LATITUDE, MAX_LONGITUDE, MAX_NEIGHBORHOOD_RADIUS, MIN_TILE_DEGREES,
};
use crate::grid::LatLng;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tile size must be finite and at least {min} degrees, got {0}", min = MIN_TILE_DEGREES)]
    TileSize(f64),
    #[error("neighborhood radius {0} exceeds {max}", max = MAX_NEIGHBORHOOD_RADIUS)]
    Radius(u32),
    #[error("spawn probability must lie in [0, 1], got {0}")]
    SpawnProbability(f64),
    #[error("coin range {min}..={max} is empty")]
    CoinRange { min: u32, max: u32 },
    #[error("caches hold at most {cap} coins, got {0}", cap = MAX_COINS_PER_CACHE)]
    CoinCap(u32),
    #[error("start position {0:?} is not a finite coordinate within ±90/±180")]
    Start(LatLng),
    #[error("storage key must not be empty")]
    StorageKey,
}

/// Tuning for one world. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Edge length of a grid cell in degrees.
    pub tile_degrees: f64,
    /// Manhattan radius, in cells, of the materialized neighborhood.
    pub neighborhood_radius: u32,
    /// Chance that a cell holds a cache.
    pub spawn_probability: f64,
    pub min_coins: u32,
    pub max_coins: u32,
    /// Seed mixed into every luck roll; changing it yields a different world.
    pub world_seed: u64,
    pub start: LatLng,
    pub autosave_interval_ms: u32,
    pub storage_key: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_degrees: DEFAULT_TILE_DEGREES,
            neighborhood_radius: DEFAULT_NEIGHBORHOOD_RADIUS,
            spawn_probability: DEFAULT_SPAWN_PROBABILITY,
            min_coins: DEFAULT_MIN_COINS,
            max_coins: DEFAULT_MAX_COINS,
            world_seed: DEFAULT_WORLD_SEED,
            start: LatLng::new(DEFAULT_START_LAT, DEFAULT_START_LNG),
            autosave_interval_ms: DEFAULT_AUTOSAVE_INTERVAL_MS,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl GameConfig {
    /// Parse a config from JSON, filling absent fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check the ranges the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first field found out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tile_degrees.is_finite() && self.tile_degrees >= MIN_TILE_DEGREES) {
            return Err(ConfigError::TileSize(self.tile_degrees));
        }
        if self.neighborhood_radius > MAX_NEIGHBORHOOD_RADIUS {
            return Err(ConfigError::Radius(self.neighborhood_radius));
        }
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(ConfigError::SpawnProbability(self.spawn_probability));
        }
        if self.min_coins > self.max_coins {
            return Err(ConfigError::CoinRange {
                min: self.min_coins,
                max: self.max_coins,
            });
        }
        if self.max_coins > MAX_COINS_PER_CACHE {
            return Err(ConfigError::CoinCap(self.max_coins));
        }
        let on_planet = self.start.is_finite()
            && self.start.lat.abs() <= MAX_LATITUDE
            && self.start.lng.abs() <= MAX_LONGITUDE;
        if !on_planet {
            return Err(ConfigError::Start(self.start));
        }
        if self.storage_key.is_empty() {
            return Err(ConfigError::StorageKey);
        }
        Ok(())
    }

    #[must_use]
    pub fn with_world_seed(mut self, seed: u64) -> Self {
        self.world_seed = seed;
        self
    }

    #[must_use]
    pub fn with_spawn_probability(mut self, probability: f64) -> Self {
        self.spawn_probability = probability;
        self
    }

    #[must_use]
    pub fn with_radius(mut self, radius: u32) -> Self {
        self.neighborhood_radius = radius;
        self
    }
}
