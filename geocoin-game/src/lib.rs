//! Geocoin Game Engine
//!
//! Platform-agnostic core of the Geocoin location game: a deterministic world
//! of coin caches laid over a lat/lng grid, the player's inventory, and the
//! session record that survives reloads. Rendering and storage are reached
//! through the [`MapView`] and [`KeyValueStore`] traits.

pub mod coin;
pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod ledger;
pub mod lifecycle;
pub mod luck;
pub mod memento;
pub mod numbers;
pub mod persistence;
pub mod session;

// Re-export commonly used types
pub use coin::{Coin, CoinKind, TokenId, TokenIdError};
pub use config::{ConfigError, GameConfig};
pub use error::{ActionError, ConservationError, PersistenceError, RecordError};
pub use grid::{
    CellBounds, CellHandle, CellInterner, CellKeyError, Direction, GridAddressing, GridCell,
    LatLng,
};
pub use ledger::{InventoryLedger, LedgerEntry};
pub use lifecycle::{Cache, CacheLifecycle, LifecycleDiff};
pub use luck::{CoinSet, DeterministicGenerator, luck};
pub use memento::{CacheMemento, MementoStore};
pub use persistence::{MemoryStore, SessionPersistence, SessionRecord, VisibleCache, decode_record};
pub use session::{CacheDetail, GeocoinGame};

/// Rendering side of the game. The engine calls these as state changes;
/// implementations draw and never call back into the engine.
pub trait MapView {
    /// A cache materialized at `cell`.
    fn show_cache(&mut self, cell: GridCell, bounds: CellBounds);

    /// A cache was retired.
    fn remove_cache(&mut self, cell: GridCell);

    fn move_player(&mut self, position: LatLng);

    /// Redraw the full movement polyline.
    fn draw_trail(&mut self, trail: &[LatLng]);

    fn pan_to(&mut self, position: LatLng);

    /// The coins of a live cache changed.
    fn refresh_cache(&mut self, _cell: GridCell) {}
}

/// A view that draws nothing, for headless sessions and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMap;

impl MapView for NullMap {
    fn show_cache(&mut self, _cell: GridCell, _bounds: CellBounds) {}
    fn remove_cache(&mut self, _cell: GridCell) {}
    fn move_player(&mut self, _position: LatLng) {}
    fn draw_trail(&mut self, _trail: &[LatLng]) {}
    fn pan_to(&mut self, _position: LatLng) {}
}

/// Trait for abstracting string key-value storage
/// Platform-specific implementations should provide this
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be removed.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}
