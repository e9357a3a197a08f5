//! Per-cell snapshots of cache contents.
//!
//! A memento outlives the materialized cache it was taken from: when a cell
//! leaves the neighborhood its cache is dropped, and the memento is the only
//! record of what the player did there.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::coin::Coin;
use crate::grid::{GridCell, cell_key};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMemento {
    #[serde(with = "cell_key")]
    pub cache_key: GridCell,
    pub coins: Vec<Coin>,
}

#[derive(Debug, Clone, Default)]
pub struct MementoStore {
    mementos: HashMap<GridCell, CacheMemento>,
}

impl MementoStore {
    /// Overwrite any memento held for `cell`.
    pub fn save(&mut self, cell: GridCell, coins: &[Coin]) {
        self.mementos.insert(
            cell,
            CacheMemento {
                cache_key: cell,
                coins: coins.to_vec(),
            },
        );
    }

    #[must_use]
    pub fn restore(&self, cell: GridCell) -> Option<Vec<Coin>> {
        self.mementos.get(&cell).map(|memento| memento.coins.clone())
    }

    #[must_use]
    pub fn contains(&self, cell: GridCell) -> bool {
        self.mementos.contains_key(&cell)
    }

    pub fn reset_all(&mut self) {
        self.mementos.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mementos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mementos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CacheMemento> {
        self.mementos.values()
    }

    /// Every memento, ordered by cell.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CacheMemento> {
        let mut all: Vec<CacheMemento> = self.mementos.values().cloned().collect();
        all.sort_by_key(|memento| memento.cache_key);
        all
    }

    /// Replace the contents with previously persisted mementos.
    pub fn load(&mut self, mementos: Vec<CacheMemento>) {
        self.mementos = mementos
            .into_iter()
            .map(|memento| (memento.cache_key, memento))
            .collect();
    }
}
