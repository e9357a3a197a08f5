//! The game session: one root object owning every piece of cache state and
//! exposing the commands the UI dispatches.
use serde::Serialize;
use std::collections::HashSet;

use crate::coin::{Coin, TokenId};
use crate::config::{ConfigError, GameConfig};
use crate::constants::SESSION_RECORD_VERSION;
use crate::error::{ActionError, ConservationError};
use crate::grid::{CellBounds, Direction, GridAddressing, GridCell, LatLng, cell_key};
use crate::ledger::{InventoryLedger, LedgerEntry};
use crate::lifecycle::{Cache, CacheLifecycle, LifecycleDiff};
use crate::luck::DeterministicGenerator;
use crate::memento::MementoStore;
use crate::persistence::{SessionPersistence, SessionRecord, VisibleCache};
use crate::{KeyValueStore, MapView};

/// Popup content for one cache, built when the player opens it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheDetail {
    #[serde(with = "cell_key")]
    pub cache_key: GridCell,
    pub cell: GridCell,
    pub bounds: CellBounds,
    pub coins: Vec<Coin>,
}

pub struct GeocoinGame<S: KeyValueStore, V: MapView> {
    config: GameConfig,
    grid: GridAddressing,
    generator: DeterministicGenerator,
    mementos: MementoStore,
    lifecycle: CacheLifecycle,
    ledger: InventoryLedger,
    position: LatLng,
    trail: Vec<LatLng>,
    tracking: bool,
    persistence: SessionPersistence<S>,
    view: V,
}

impl<S: KeyValueStore, V: MapView> GeocoinGame<S, V> {
    /// Start a session, resuming the stored one when it is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is out of range.
    pub fn new(config: GameConfig, store: S, view: V) -> Result<Self, ConfigError> {
        config.validate()?;
        let persistence = SessionPersistence::new(store, config.storage_key.clone());
        let start = config.start;
        let mut game = Self {
            grid: GridAddressing::new(config.tile_degrees),
            generator: DeterministicGenerator::new(&config),
            mementos: MementoStore::default(),
            lifecycle: CacheLifecycle::new(config.neighborhood_radius),
            ledger: InventoryLedger::default(),
            position: start,
            trail: vec![start],
            tracking: false,
            persistence,
            view,
            config,
        };
        match game.persistence.load() {
            Some(record) => game.apply_record(record),
            None => log::info!("starting a new session at {start:?}"),
        }
        game.view.move_player(game.position);
        game.view.draw_trail(&game.trail);
        game.refresh_neighborhood();
        Ok(game)
    }

    fn apply_record(&mut self, record: SessionRecord) {
        self.position = record.player_position;
        self.mementos.load(record.cache_mementos);
        self.ledger = InventoryLedger::from_entries(record.inventory);
        self.trail = record.movement_history;
        if self.trail.is_empty() {
            self.trail.push(self.position);
        }
        self.reconcile_ledger_homes();

        let center = self.grid.cell_of(self.position);
        let mut restored = 0_usize;
        for visible in &record.visible_caches {
            if !self.lifecycle.in_range(visible.cache_key, center) {
                continue;
            }
            if self.lifecycle.materialize(
                visible.cache_key,
                &mut self.grid,
                &self.generator,
                &mut self.mementos,
                &mut self.view,
            ) {
                restored += 1;
            }
        }
        log::info!(
            "resumed session at {:?}: {} held coins, {} mementos, {} caches restored",
            self.position,
            self.ledger.len(),
            self.mementos.len(),
            restored
        );
    }

    // A held coin whose home has no memento would be regenerated next to
    // its ledger copy; seed that home with its baseline minus held coins.
    fn reconcile_ledger_homes(&mut self) {
        let homes: Vec<GridCell> = self
            .ledger
            .entries()
            .iter()
            .map(|entry| entry.home)
            .filter(|home| !self.mementos.contains(*home))
            .collect();
        for home in homes {
            if self.mementos.contains(home) {
                continue;
            }
            let remaining: Vec<Coin> = self
                .generator
                .generate(home)
                .into_iter()
                .filter(|coin| !self.ledger.contains(&coin.id))
                .collect();
            log::warn!("rebuilding memento for {home} from its baseline");
            self.mementos.save(home, &remaining);
        }
    }

    fn refresh_neighborhood(&mut self) -> LifecycleDiff {
        let center = self.grid.cell_of(self.position);
        let diff = self.lifecycle.update(
            center,
            &mut self.grid,
            &self.generator,
            &mut self.mementos,
            &mut self.view,
        );
        if !diff.is_empty() {
            log::debug!(
                "neighborhood of {center}: {} spawned, {} retired, {} live",
                diff.spawned.len(),
                diff.retired.len(),
                self.lifecycle.len()
            );
        }
        diff
    }

    fn relocate(&mut self, position: LatLng) -> LifecycleDiff {
        self.position = position;
        self.trail.push(position);
        self.view.move_player(position);
        self.view.draw_trail(&self.trail);
        let diff = self.refresh_neighborhood();
        self.persist();
        diff
    }

    fn persist(&self) {
        if let Err(err) = self.persistence.save(&self.snapshot()) {
            log::error!("saving session failed: {err}");
        }
    }

    /// Step one tile.
    pub fn move_by(&mut self, direction: Direction) -> LifecycleDiff {
        let (d_lat, d_lng) = direction.delta();
        let next = self
            .position
            .offset(d_lat, d_lng, self.config.tile_degrees);
        self.relocate(next)
    }

    /// Jump to a position.
    ///
    /// # Errors
    ///
    /// `InvalidPosition` for non-finite coordinates.
    pub fn move_to(&mut self, position: LatLng) -> Result<LifecycleDiff, ActionError> {
        if !position.is_finite() {
            return Err(ActionError::InvalidPosition(position));
        }
        Ok(self.relocate(position))
    }

    /// Take a coin from a materialized cache.
    ///
    /// # Errors
    ///
    /// `UnknownCache` when `cell` is not materialized, otherwise whatever the
    /// ledger rejects. Rejected actions change nothing.
    pub fn collect(&mut self, cell: GridCell, id: &TokenId) -> Result<LedgerEntry, ActionError> {
        let cache = self
            .lifecycle
            .cache_mut(cell)
            .ok_or(ActionError::UnknownCache(cell))?;
        let entry = self.ledger.collect(cache, id)?;
        self.mementos.save(cell, cache.coins());
        self.view.refresh_cache(cell);
        self.persist();
        log::debug!("collected {id} from {cell}");
        Ok(entry)
    }

    /// Put a held coin into a materialized cache.
    ///
    /// # Errors
    ///
    /// `UnknownCache` when `cell` is not materialized, `NotHeld` when the
    /// coin is not in the inventory.
    pub fn deposit(&mut self, cell: GridCell, id: &TokenId) -> Result<Coin, ActionError> {
        let cache = self
            .lifecycle
            .cache_mut(cell)
            .ok_or(ActionError::UnknownCache(cell))?;
        let coin = self.ledger.deposit(cache, id)?;
        self.mementos.save(cell, cache.coins());
        self.view.refresh_cache(cell);
        self.persist();
        log::debug!("deposited {id} into {cell}");
        Ok(coin)
    }

    /// Erase all progress once `confirm` agrees. Returns whether it ran.
    pub fn request_reset(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if !confirm() {
            log::info!("reset cancelled");
            return false;
        }
        self.lifecycle.clear(&mut self.view);
        self.mementos.reset_all();
        self.grid.reset();
        self.ledger.clear();
        self.tracking = false;
        self.position = self.config.start;
        self.trail = vec![self.position];
        if let Err(err) = self.persistence.reset() {
            log::error!("deleting stored session failed: {err}");
        }
        self.view.move_player(self.position);
        self.view.draw_trail(&self.trail);
        self.refresh_neighborhood();
        log::info!("session reset to {:?}", self.position);
        true
    }

    /// Flip position tracking, returning the new state.
    pub fn toggle_tracking(&mut self) -> bool {
        self.tracking = !self.tracking;
        log::info!(
            "position tracking {}",
            if self.tracking { "enabled" } else { "disabled" }
        );
        self.tracking
    }

    /// Feed one position fix. Ignored unless tracking is on.
    pub fn apply_position_fix(&mut self, position: LatLng) -> Option<LifecycleDiff> {
        if !self.tracking {
            return None;
        }
        match self.move_to(position) {
            Ok(diff) => Some(diff),
            Err(err) => {
                log::warn!("ignoring position fix: {err}");
                None
            }
        }
    }

    /// The position feed failed; tracking stays off until toggled again.
    pub fn position_feed_failed(&mut self, reason: &str) {
        log::warn!("position feed error: {reason}");
        self.tracking = false;
    }

    /// Timer-driven save.
    pub fn autosave_tick(&self) {
        self.persist();
        log::debug!("session auto-saved");
    }

    /// Pan the map to the cache a coin came from.
    pub fn focus_home(&mut self, id: &TokenId) -> Option<LatLng> {
        let home = self.ledger.home_of(id).or_else(|| {
            self.lifecycle
                .caches()
                .find(|cache| cache.contains(id))
                .map(|_| id.home)
        })?;
        let target = self.grid.bounds_of(home).center();
        self.view.pan_to(target);
        Some(target)
    }

    #[must_use]
    pub fn cache_detail(&self, cell: GridCell) -> Option<CacheDetail> {
        self.lifecycle.cache(cell).map(|cache| CacheDetail {
            cache_key: cell,
            cell,
            bounds: cache.bounds(),
            coins: cache.coins().to_vec(),
        })
    }

    /// The record a save would write right now.
    #[must_use]
    pub fn snapshot(&self) -> SessionRecord {
        SessionRecord {
            version: SESSION_RECORD_VERSION,
            player_position: self.position,
            inventory: self.ledger.entries().to_vec(),
            visible_caches: self
                .lifecycle
                .caches()
                .map(|cache| VisibleCache {
                    cache_key: cache.cell(),
                    bounds: cache.bounds(),
                })
                .collect(),
            movement_history: self.trail.clone(),
            cache_mementos: self.mementos.snapshot(),
        }
    }

    /// Check that every generated coin sits in exactly one place. Returns
    /// the number of coins accounted for.
    ///
    /// # Errors
    ///
    /// The first broken ownership rule found.
    pub fn audit(&self) -> Result<usize, ConservationError> {
        let mut seen: HashSet<TokenId> = HashSet::new();
        for memento in self.mementos.iter() {
            for coin in &memento.coins {
                if coin.collected {
                    return Err(ConservationError::FlagMismatch(coin.id));
                }
                if !seen.insert(coin.id) {
                    return Err(ConservationError::Duplicate(coin.id));
                }
            }
        }
        for entry in self.ledger.entries() {
            if !entry.coin.collected {
                return Err(ConservationError::FlagMismatch(entry.coin.id));
            }
            if !seen.insert(entry.coin.id) {
                return Err(ConservationError::Duplicate(entry.coin.id));
            }
        }
        for id in &seen {
            if !self.mementos.contains(id.home) {
                return Err(ConservationError::Orphan(*id));
            }
        }
        for memento in self.mementos.iter() {
            let home = memento.cache_key;
            for serial in 0..self.generator.coin_count(home) {
                let id = TokenId::new(home, serial);
                if !seen.contains(&id) {
                    return Err(ConservationError::Missing(id));
                }
            }
        }
        for cache in self.lifecycle.caches() {
            let stored = self.mementos.restore(cache.cell()).unwrap_or_default();
            if stored.as_slice() != cache.coins() {
                return Err(ConservationError::StaleMemento(cache.cell()));
            }
        }
        Ok(seen.len())
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn position(&self) -> LatLng {
        self.position
    }

    #[must_use]
    pub fn current_cell(&self) -> GridCell {
        self.grid.locate(self.position)
    }

    #[must_use]
    pub const fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    #[must_use]
    pub fn trail(&self) -> &[LatLng] {
        &self.trail
    }

    #[must_use]
    pub const fn tracking(&self) -> bool {
        self.tracking
    }

    #[must_use]
    pub fn cache(&self, cell: GridCell) -> Option<&Cache> {
        self.lifecycle.cache(cell)
    }

    #[must_use]
    pub fn materialized(&self) -> Vec<GridCell> {
        self.lifecycle.materialized()
    }

    #[must_use]
    pub const fn mementos(&self) -> &MementoStore {
        &self.mementos
    }

    #[must_use]
    pub fn known_cells(&self) -> usize {
        self.grid.known_cells()
    }

    #[must_use]
    pub const fn view(&self) -> &V {
        &self.view
    }

    pub const fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        self.persistence.store()
    }
}
