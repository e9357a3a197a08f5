//! Shapes handed to JavaScript. Keys are camelCase; cells travel as `"i:j"`.
use geocoin_game::{CellBounds, GridCell, LatLng, LedgerEntry, LifecycleDiff};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMarker {
    pub cache_key: String,
    pub bounds: CellBounds,
}

impl CacheMarker {
    #[must_use]
    pub fn new(cell: GridCell, bounds: CellBounds) -> Self {
        Self {
            cache_key: cell.to_string(),
            bounds,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub spawned: Vec<String>,
    pub retired: Vec<String>,
}

impl From<&LifecycleDiff> for DiffSummary {
    fn from(diff: &LifecycleDiff) -> Self {
        Self {
            spawned: diff.spawned.iter().map(ToString::to_string).collect(),
            retired: diff.retired.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Inventory row for the side panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRow {
    pub id: String,
    pub kind: &'static str,
    pub home_key: String,
}

impl From<&LedgerEntry> for InventoryRow {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: entry.coin.id.to_string(),
            kind: entry.coin.kind.as_str(),
            home_key: entry.home.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatus {
    pub position: LatLng,
    pub cache_key: String,
    pub tracking: bool,
    pub held: usize,
}
