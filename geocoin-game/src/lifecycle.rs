//! Materialization of caches around the player.
//!
//! A cell is either dormant or materialized. Every player move diffs the
//! materialized set against the neighborhood: cells that drifted out of range
//! are retired, dormant cells in range that pass the spawn roll materialize.
use std::collections::BTreeMap;

use crate::MapView;
use crate::coin::{Coin, TokenId};
use crate::grid::{CellBounds, GridAddressing, GridCell};
use crate::luck::{CoinSet, DeterministicGenerator};
use crate::memento::MementoStore;

/// A materialized cache and its live coin set.
#[derive(Debug, Clone, PartialEq)]
pub struct Cache {
    cell: GridCell,
    bounds: CellBounds,
    coins: CoinSet,
}

impl Cache {
    #[must_use]
    pub const fn cell(&self) -> GridCell {
        self.cell
    }

    #[must_use]
    pub const fn bounds(&self) -> CellBounds {
        self.bounds
    }

    #[must_use]
    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    #[must_use]
    pub fn coin(&self, id: &TokenId) -> Option<&Coin> {
        self.coins.iter().find(|coin| coin.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &TokenId) -> bool {
        self.coin(id).is_some()
    }

    pub(crate) fn coins_mut(&mut self) -> &mut CoinSet {
        &mut self.coins
    }
}

/// Cells that changed state during one update, each list sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleDiff {
    pub spawned: Vec<GridCell>,
    pub retired: Vec<GridCell>,
}

impl LifecycleDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty() && self.retired.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CacheLifecycle {
    radius: u32,
    materialized: BTreeMap<GridCell, Cache>,
}

impl CacheLifecycle {
    #[must_use]
    pub const fn new(radius: u32) -> Self {
        Self {
            radius,
            materialized: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    #[must_use]
    pub fn in_range(&self, cell: GridCell, center: GridCell) -> bool {
        cell.manhattan(center) <= self.radius
    }

    /// Retire out-of-range caches, then materialize every eligible dormant
    /// cell within the radius of `center`.
    pub fn update<V: MapView + ?Sized>(
        &mut self,
        center: GridCell,
        grid: &mut GridAddressing,
        generator: &DeterministicGenerator,
        mementos: &mut MementoStore,
        view: &mut V,
    ) -> LifecycleDiff {
        let retired = self.retire_outside(center, view);
        let radius = i32::try_from(self.radius).unwrap_or(i32::MAX);
        let mut spawned = Vec::new();
        for di in -radius..=radius {
            let reach = radius - di.abs();
            for dj in -reach..=reach {
                let cell = center.offset(di, dj);
                if self.materialize(cell, grid, generator, mementos, view) {
                    spawned.push(cell);
                }
            }
        }
        spawned.sort_unstable();
        LifecycleDiff { spawned, retired }
    }

    /// Materialize one cell. Returns `false` when the cell is already live or
    /// holds no cache; an already materialized cell is never regenerated.
    pub fn materialize<V: MapView + ?Sized>(
        &mut self,
        cell: GridCell,
        grid: &mut GridAddressing,
        generator: &DeterministicGenerator,
        mementos: &mut MementoStore,
        view: &mut V,
    ) -> bool {
        if self.materialized.contains_key(&cell) || !generator.has_cache(cell) {
            return false;
        }
        grid.intern(cell);
        let coins = mementos
            .restore(cell)
            .map_or_else(|| generator.generate(cell), CoinSet::from_vec);
        mementos.save(cell, &coins);
        let bounds = grid.bounds_of(cell);
        view.show_cache(cell, bounds);
        self.materialized.insert(
            cell,
            Cache {
                cell,
                bounds,
                coins,
            },
        );
        true
    }

    /// Tear down caches beyond the radius. Their coins were kept current in
    /// the memento store by every collect and deposit, so nothing is saved.
    fn retire_outside<V: MapView + ?Sized>(
        &mut self,
        center: GridCell,
        view: &mut V,
    ) -> Vec<GridCell> {
        let radius = self.radius;
        let retired: Vec<GridCell> = self
            .materialized
            .keys()
            .copied()
            .filter(|cell| cell.manhattan(center) > radius)
            .collect();
        for cell in &retired {
            self.materialized.remove(cell);
            view.remove_cache(*cell);
        }
        retired
    }

    /// Drop every materialized cache.
    pub fn clear<V: MapView + ?Sized>(&mut self, view: &mut V) {
        for cell in self.materialized.keys() {
            view.remove_cache(*cell);
        }
        self.materialized.clear();
    }

    #[must_use]
    pub fn cache(&self, cell: GridCell) -> Option<&Cache> {
        self.materialized.get(&cell)
    }

    pub fn cache_mut(&mut self, cell: GridCell) -> Option<&mut Cache> {
        self.materialized.get_mut(&cell)
    }

    #[must_use]
    pub fn is_materialized(&self, cell: GridCell) -> bool {
        self.materialized.contains_key(&cell)
    }

    /// Materialized cells in ascending order.
    #[must_use]
    pub fn materialized(&self) -> Vec<GridCell> {
        self.materialized.keys().copied().collect()
    }

    pub fn caches(&self) -> impl Iterator<Item = &Cache> {
        self.materialized.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.materialized.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materialized.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullMap;
    use crate::config::GameConfig;

    struct World {
        grid: GridAddressing,
        generator: DeterministicGenerator,
        mementos: MementoStore,
        lifecycle: CacheLifecycle,
    }

    impl World {
        fn new(radius: u32, spawn_probability: f64) -> Self {
            let cfg = GameConfig::default()
                .with_radius(radius)
                .with_spawn_probability(spawn_probability);
            Self {
                grid: GridAddressing::new(cfg.tile_degrees),
                generator: DeterministicGenerator::new(&cfg),
                mementos: MementoStore::default(),
                lifecycle: CacheLifecycle::new(radius),
            }
        }

        fn update(&mut self, center: GridCell) -> LifecycleDiff {
            self.lifecycle.update(
                center,
                &mut self.grid,
                &self.generator,
                &mut self.mementos,
                &mut NullMap,
            )
        }
    }

    #[test]
    fn full_spawn_fills_the_diamond() {
        let mut world = World::new(2, 1.0);
        let diff = world.update(GridCell::new(0, 0));
        // 1 + 4 + 8 cells within Manhattan distance 2
        assert_eq!(diff.spawned.len(), 13);
        assert!(diff.retired.is_empty());
        assert!(world.lifecycle.is_materialized(GridCell::new(2, 0)));
        assert!(!world.lifecycle.is_materialized(GridCell::new(2, 1)));
        assert_eq!(world.mementos.len(), 13);
    }

    #[test]
    fn repeated_update_is_idempotent() {
        let mut world = World::new(3, 1.0);
        let center = GridCell::new(4, -4);
        world.update(center);
        let before: Vec<Vec<Coin>> = world
            .lifecycle
            .caches()
            .map(|cache| cache.coins().to_vec())
            .collect();
        let diff = world.update(center);
        assert!(diff.is_empty());
        let after: Vec<Vec<Coin>> = world
            .lifecycle
            .caches()
            .map(|cache| cache.coins().to_vec())
            .collect();
        assert_eq!(before, after);
        assert!(!world.lifecycle.materialize(
            center,
            &mut world.grid,
            &world.generator,
            &mut world.mementos,
            &mut NullMap,
        ));
    }

    #[test]
    fn moving_retires_far_cells_and_spawns_new_ones() {
        let mut world = World::new(1, 1.0);
        world.update(GridCell::new(0, 0));
        let diff = world.update(GridCell::new(0, 1));
        assert_eq!(
            diff.retired,
            vec![GridCell::new(-1, 0), GridCell::new(0, -1), GridCell::new(1, 0)]
        );
        assert_eq!(
            diff.spawned,
            vec![GridCell::new(-1, 1), GridCell::new(0, 2), GridCell::new(1, 1)]
        );
        assert!(world.mementos.contains(GridCell::new(0, -1)));
    }

    #[test]
    fn rematerialization_uses_the_memento() {
        let mut world = World::new(1, 1.0);
        let cell = GridCell::new(0, 0);
        world.update(cell);
        world.lifecycle.cache_mut(cell).unwrap().coins_mut().clear();
        world.mementos.save(cell, &[]);
        world.update(GridCell::new(10, 10));
        assert!(!world.lifecycle.is_materialized(cell));
        world.update(cell);
        assert!(world.lifecycle.cache(cell).unwrap().coins().is_empty());
    }

    #[test]
    fn zero_probability_spawns_nothing() {
        let mut world = World::new(4, 0.0);
        assert!(world.update(GridCell::new(0, 0)).spawned.is_empty());
        assert!(world.lifecycle.is_empty());
        assert!(world.mementos.is_empty());
    }
}
