//! The player's held coins.
use serde::{Deserialize, Serialize};

use crate::coin::{Coin, TokenId};
use crate::error::ActionError;
use crate::grid::GridCell;
use crate::lifecycle::Cache;

/// A held coin plus the cell it was generated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub coin: Coin,
    pub home: GridCell,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryLedger {
    entries: Vec<LedgerEntry>,
}

impl InventoryLedger {
    #[must_use]
    pub const fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }

    /// Move a coin out of `cache` into the ledger.
    ///
    /// # Errors
    ///
    /// `NotInCache` if the cache does not hold the coin, `AlreadyCollected`
    /// if it is flagged collected or already in the ledger.
    pub fn collect(&mut self, cache: &mut Cache, id: &TokenId) -> Result<LedgerEntry, ActionError> {
        let cell = cache.cell();
        let coins = cache.coins_mut();
        let index = coins
            .iter()
            .position(|coin| coin.id == *id)
            .ok_or(ActionError::NotInCache(*id, cell))?;
        if coins[index].collected || self.contains(id) {
            return Err(ActionError::AlreadyCollected(*id));
        }
        let mut coin = coins.remove(index);
        coin.collected = true;
        let entry = LedgerEntry {
            coin,
            home: coin.home(),
        };
        self.entries.push(entry);
        Ok(entry)
    }

    /// Move a held coin into `cache`.
    ///
    /// # Errors
    ///
    /// `NotHeld` if the ledger does not contain the coin.
    pub fn deposit(&mut self, cache: &mut Cache, id: &TokenId) -> Result<Coin, ActionError> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.coin.id == *id)
            .ok_or(ActionError::NotHeld(*id))?;
        let mut coin = self.entries.remove(index).coin;
        coin.collected = false;
        let coins = cache.coins_mut();
        if let Some(existing) = coins.iter_mut().find(|held| held.id == *id) {
            existing.collected = false;
        } else {
            coins.push(coin);
        }
        Ok(coin)
    }

    #[must_use]
    pub fn contains(&self, id: &TokenId) -> bool {
        self.entries.iter().any(|entry| entry.coin.id == *id)
    }

    /// Cell a held coin came from, for navigating back to it.
    #[must_use]
    pub fn home_of(&self, id: &TokenId) -> Option<GridCell> {
        self.entries
            .iter()
            .find(|entry| entry.coin.id == *id)
            .map(|entry| entry.home)
    }

    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullMap;
    use crate::config::GameConfig;
    use crate::grid::GridAddressing;
    use crate::lifecycle::CacheLifecycle;
    use crate::luck::DeterministicGenerator;
    use crate::memento::MementoStore;

    fn live_cache(cell: GridCell) -> CacheLifecycle {
        let cfg = GameConfig::default()
            .with_spawn_probability(1.0)
            .with_radius(0);
        let mut grid = GridAddressing::new(cfg.tile_degrees);
        let generator = DeterministicGenerator::new(&cfg);
        let mut mementos = MementoStore::default();
        let mut lifecycle = CacheLifecycle::new(0);
        lifecycle.update(cell, &mut grid, &generator, &mut mementos, &mut NullMap);
        lifecycle
    }

    #[test]
    fn collect_moves_coin_into_the_ledger() {
        let cell = GridCell::new(5, 5);
        let mut lifecycle = live_cache(cell);
        let cache = lifecycle.cache_mut(cell).unwrap();
        let before = cache.coins().len();
        let id = TokenId::new(cell, 0);
        let mut ledger = InventoryLedger::default();

        let entry = ledger.collect(cache, &id).unwrap();
        assert!(entry.coin.collected);
        assert_eq!(entry.home, cell);
        assert_eq!(cache.coins().len(), before - 1);
        assert!(!cache.contains(&id));
        assert!(ledger.contains(&id));
        assert_eq!(ledger.home_of(&id), Some(cell));
    }

    #[test]
    fn collect_rejects_missing_and_repeated_coins() {
        let cell = GridCell::new(0, 0);
        let mut lifecycle = live_cache(cell);
        let cache = lifecycle.cache_mut(cell).unwrap();
        let mut ledger = InventoryLedger::default();
        let id = TokenId::new(cell, 0);
        ledger.collect(cache, &id).unwrap();
        assert_eq!(
            ledger.collect(cache, &id),
            Err(ActionError::NotInCache(id, cell))
        );
        let stranger = TokenId::new(GridCell::new(9, 9), 0);
        assert_eq!(
            ledger.collect(cache, &stranger),
            Err(ActionError::NotInCache(stranger, cell))
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn collect_refuses_coins_flagged_collected() {
        let cell = GridCell::new(2, 2);
        let mut lifecycle = live_cache(cell);
        let cache = lifecycle.cache_mut(cell).unwrap();
        let id = TokenId::new(cell, 0);
        cache.coins_mut()[0].collected = true;
        let mut ledger = InventoryLedger::default();
        assert_eq!(
            ledger.collect(cache, &id),
            Err(ActionError::AlreadyCollected(id))
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn deposit_returns_coin_to_any_cache() {
        let home = GridCell::new(1, 1);
        let mut lifecycle = live_cache(home);
        let id = TokenId::new(home, 0);
        let mut ledger = InventoryLedger::default();
        ledger
            .collect(lifecycle.cache_mut(home).unwrap(), &id)
            .unwrap();

        let other = GridCell::new(-3, 4);
        let mut elsewhere = live_cache(other);
        let target = elsewhere.cache_mut(other).unwrap();
        let coin = ledger.deposit(target, &id).unwrap();
        assert!(!coin.collected);
        assert_eq!(coin.home(), home);
        assert!(target.contains(&id));
        assert!(ledger.is_empty());
        assert_eq!(ledger.deposit(target, &id), Err(ActionError::NotHeld(id)));
    }

    #[test]
    fn ledger_serializes_flat_entries() {
        let cell = GridCell::new(5, 5);
        let mut lifecycle = live_cache(cell);
        let mut ledger = InventoryLedger::default();
        let id = TokenId::new(cell, 0);
        ledger.collect(lifecycle.cache_mut(cell).unwrap(), &id).unwrap();
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json[0]["id"], "5:5#0");
        assert_eq!(json[0]["collected"], true);
        assert_eq!(json[0]["home"], serde_json::json!({"i": 5, "j": 5}));
        let back: InventoryLedger = serde_json::from_value(json).unwrap();
        assert_eq!(back, ledger);
    }
}
