//! Deterministic world generation.
//!
//! Every roll is a pure function of a string key and the world seed. The
//! same world therefore regenerates from scratch whenever no memento exists
//! for a cell, and a fresh run reproduces it exactly.
use smallvec::SmallVec;
use twox_hash::XxHash64;

use crate::coin::{Coin, CoinKind, TokenId};
use crate::config::GameConfig;
use crate::constants::{
    COPPER_THRESHOLD, LUCK_COIN_COUNT_SUFFIX, LUCK_COIN_KIND_SUFFIX, SILVER_THRESHOLD,
};
use crate::grid::GridCell;
use crate::numbers::{scale_unit_to_u32, unit_from_hash};

/// Coin set of a single cache; caches rarely hold more than a handful.
pub type CoinSet = SmallVec<[Coin; 5]>;

/// Reproducible hash-like roll in `[0, 1)`.
#[must_use]
pub fn luck(seed: u64, key: &str) -> f64 {
    unit_from_hash(XxHash64::oneshot(seed, key.as_bytes()))
}

#[derive(Debug, Clone)]
pub struct DeterministicGenerator {
    seed: u64,
    spawn_probability: f64,
    min_coins: u32,
    max_coins: u32,
}

impl DeterministicGenerator {
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            seed: config.world_seed,
            spawn_probability: config.spawn_probability,
            min_coins: config.min_coins,
            max_coins: config.max_coins.max(config.min_coins),
        }
    }

    #[must_use]
    pub fn luck(&self, key: &str) -> f64 {
        luck(self.seed, key)
    }

    #[must_use]
    pub fn has_cache(&self, cell: GridCell) -> bool {
        self.luck(&cell.luck_key()) < self.spawn_probability
    }

    #[must_use]
    pub fn coin_count(&self, cell: GridCell) -> u32 {
        let roll = self.luck(&format!("{},{LUCK_COIN_COUNT_SUFFIX}", cell.luck_key()));
        let span = self
            .max_coins
            .saturating_sub(self.min_coins)
            .saturating_add(1);
        self.min_coins.saturating_add(scale_unit_to_u32(roll, span))
    }

    #[must_use]
    pub fn coin_kind(&self, id: TokenId) -> CoinKind {
        let roll = self.luck(&format!(
            "{},#{},{LUCK_COIN_KIND_SUFFIX}",
            id.home.luck_key(),
            id.serial
        ));
        if roll < COPPER_THRESHOLD {
            CoinKind::Copper
        } else if roll < SILVER_THRESHOLD {
            CoinKind::Silver
        } else {
            CoinKind::Gold
        }
    }

    /// Baseline content of a cell that has never been materialized.
    #[must_use]
    pub fn generate(&self, cell: GridCell) -> CoinSet {
        (0..self.coin_count(cell))
            .map(|serial| {
                let id = TokenId::new(cell, serial);
                Coin::fresh(id, self.coin_kind(id))
            })
            .collect()
    }
}
