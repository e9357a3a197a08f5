//! Error types shared across the engine.
use thiserror::Error;

use crate::coin::TokenId;
use crate::grid::{GridCell, LatLng};

/// Rejected player actions. None of them change game state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("no materialized cache at {0}")]
    UnknownCache(GridCell),
    #[error("coin {0} is already collected")]
    AlreadyCollected(TokenId),
    #[error("coin {0} is not in cache {1}")]
    NotInCache(TokenId, GridCell),
    #[error("coin {0} is not in the inventory")]
    NotHeld(TokenId),
    #[error("position {0:?} is not finite")]
    InvalidPosition(LatLng),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage backend failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("session encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why a stored session record was discarded.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record has no numeric player position")]
    MissingPosition,
    #[error("record player position is not finite")]
    NonFinitePosition,
    #[error("record version {0} is not supported")]
    UnsupportedVersion(u32),
}

/// A broken token-ownership invariant found by an audit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConservationError {
    #[error("coin {0} is held in more than one place")]
    Duplicate(TokenId),
    #[error("coin {0} was generated but is held nowhere")]
    Missing(TokenId),
    #[error("coin {0} has a collected flag that contradicts its location")]
    FlagMismatch(TokenId),
    #[error("coin {0} belongs to a cell that never materialized")]
    Orphan(TokenId),
    #[error("cache {0} differs from its memento")]
    StaleMemento(GridCell),
}
