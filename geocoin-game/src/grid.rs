//! Grid addressing: continuous coordinates to interned integer cells and back.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::numbers::floor_f64_to_i32;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Offset by whole tiles.
    #[must_use]
    pub fn offset(self, d_lat_tiles: i32, d_lng_tiles: i32, tile_degrees: f64) -> Self {
        Self {
            lat: self.lat + f64::from(d_lat_tiles) * tile_degrees,
            lng: self.lng + f64::from(d_lng_tiles) * tile_degrees,
        }
    }
}

/// A discrete tile. Equality and hashing are by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub i: i32,
    pub j: i32,
}

impl GridCell {
    #[must_use]
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    #[must_use]
    pub const fn offset(self, di: i32, dj: i32) -> Self {
        Self {
            i: self.i.saturating_add(di),
            j: self.j.saturating_add(dj),
        }
    }

    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        let di = (self.i as i64 - other.i as i64).unsigned_abs();
        let dj = (self.j as i64 - other.j as i64).unsigned_abs();
        let total = di + dj;
        if total > u32::MAX as u64 {
            u32::MAX
        } else {
            total as u32
        }
    }

    /// Key used by luck rolls: `"{i},{j}"`.
    #[must_use]
    pub fn luck_key(self) -> String {
        format!("{},{}", self.i, self.j)
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.i, self.j)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cell key `{0}`")]
pub struct CellKeyError(pub String);

impl FromStr for GridCell {
    type Err = CellKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (i, j) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| CellKeyError(s.to_string()))?;
        let i = i.parse().map_err(|_| CellKeyError(s.to_string()))?;
        let j = j.parse().map_err(|_| CellKeyError(s.to_string()))?;
        Ok(Self { i, j })
    }
}

/// Serde adapter writing a cell as its `"i:j"` cache key.
pub mod cell_key {
    use super::GridCell;
    use serde::{Deserialize, Deserializer, Serializer};

    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(cell: &GridCell, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(cell)
    }

    /// # Errors
    ///
    /// Fails when the string is not an `i:j` pair.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GridCell, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The rectangle a cell covers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl CellBounds {
    /// Inclusive of the south-west corner, exclusive of the north-east one.
    #[must_use]
    pub fn contains(&self, pos: LatLng) -> bool {
        pos.lat >= self.south_west.lat
            && pos.lat < self.north_east.lat
            && pos.lng >= self.south_west.lng
            && pos.lng < self.north_east.lng
    }

    #[must_use]
    pub fn center(&self) -> LatLng {
        LatLng::new(
            f64::midpoint(self.south_west.lat, self.north_east.lat),
            f64::midpoint(self.south_west.lng, self.north_east.lng),
        )
    }
}

/// Stable index of an interned cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellHandle(u32);

impl CellHandle {
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Interning table: one handle per distinct `(i, j)`.
#[derive(Debug, Clone, Default)]
pub struct CellInterner {
    by_key: HashMap<GridCell, CellHandle>,
    cells: Vec<GridCell>,
}

impl CellInterner {
    pub fn intern(&mut self, cell: GridCell) -> CellHandle {
        if let Some(handle) = self.by_key.get(&cell) {
            return *handle;
        }
        let handle = CellHandle(u32::try_from(self.cells.len()).unwrap_or(u32::MAX));
        self.cells.push(cell);
        self.by_key.insert(cell, handle);
        handle
    }

    #[must_use]
    pub fn resolve(&self, handle: CellHandle) -> Option<GridCell> {
        self.cells.get(handle.0 as usize).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_key.clear();
        self.cells.clear();
    }
}

/// Maps coordinates onto cells of a fixed tile size.
#[derive(Debug, Clone)]
pub struct GridAddressing {
    tile_degrees: f64,
    interner: CellInterner,
}

impl GridAddressing {
    #[must_use]
    pub fn new(tile_degrees: f64) -> Self {
        Self {
            tile_degrees,
            interner: CellInterner::default(),
        }
    }

    #[must_use]
    pub const fn tile_degrees(&self) -> f64 {
        self.tile_degrees
    }

    /// The cell covering `pos`, interned on first reference.
    pub fn cell_of(&mut self, pos: LatLng) -> GridCell {
        let cell = self.locate(pos);
        self.interner.intern(cell);
        cell
    }

    /// The cell covering `pos` without touching the interning table.
    #[must_use]
    pub fn locate(&self, pos: LatLng) -> GridCell {
        GridCell::new(self.axis_index(pos.lat), self.axis_index(pos.lng))
    }

    pub fn handle_of(&mut self, pos: LatLng) -> CellHandle {
        let cell = self.cell_of(pos);
        self.interner.intern(cell)
    }

    /// Intern a cell reached by offset rather than by coordinate.
    pub fn intern(&mut self, cell: GridCell) -> CellHandle {
        self.interner.intern(cell)
    }

    #[must_use]
    pub fn resolve(&self, handle: CellHandle) -> Option<GridCell> {
        self.interner.resolve(handle)
    }

    #[must_use]
    pub fn bounds_of(&self, cell: GridCell) -> CellBounds {
        CellBounds {
            south_west: LatLng::new(self.edge(cell.i), self.edge(cell.j)),
            north_east: LatLng::new(
                self.edge(cell.i.saturating_add(1)),
                self.edge(cell.j.saturating_add(1)),
            ),
        }
    }

    #[must_use]
    pub fn known_cells(&self) -> usize {
        self.interner.len()
    }

    pub fn reset(&mut self) {
        self.interner.clear();
    }

    fn edge(&self, index: i32) -> f64 {
        f64::from(index) * self.tile_degrees
    }

    // floor(v / tile), nudged so that edge(idx) <= v < edge(idx + 1) holds exactly.
    fn axis_index(&self, value: f64) -> i32 {
        if !value.is_finite() {
            return 0;
        }
        let mut idx = floor_f64_to_i32(value / self.tile_degrees);
        if self.edge(idx) > value {
            idx = idx.saturating_sub(1);
        } else if self.edge(idx.saturating_add(1)) <= value {
            idx = idx.saturating_add(1);
        }
        idx
    }
}

/// One-tile moves issued by the direction pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// `(d_lat, d_lng)` in tiles.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (1, 0),
            Self::South => (-1, 0),
            Self::East => (0, 1),
            Self::West => (0, -1),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" | "n" | "up" => Ok(Self::North),
            "south" | "s" | "down" => Ok(Self::South),
            "east" | "e" | "right" => Ok(Self::East),
            "west" | "w" | "left" => Ok(Self::West),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_of_floors_both_axes() {
        let mut grid = GridAddressing::new(1.0);
        assert_eq!(grid.cell_of(LatLng::new(5.5, -0.5)), GridCell::new(5, -1));
        assert_eq!(grid.cell_of(LatLng::new(-2.0, 3.999)), GridCell::new(-2, 3));
        let bounds = grid.bounds_of(GridCell::new(5, -1));
        assert_eq!(bounds.south_west, LatLng::new(5.0, -1.0));
        assert_eq!(bounds.north_east, LatLng::new(6.0, 0.0));
        assert_eq!(bounds.center(), LatLng::new(5.5, -0.5));
    }

    #[test]
    fn bounds_always_contain_source_point() {
        let mut grid = GridAddressing::new(0.0001);
        let samples = [
            LatLng::new(36.9895, -122.0628),
            LatLng::new(0.0, 0.0),
            LatLng::new(0.3, 0.7),
            LatLng::new(-0.000_05, 0.000_15),
            LatLng::new(89.999_99, -179.999_99),
            LatLng::new(12.345_678_9, 98.765_432_1),
        ];
        for pos in samples {
            let cell = grid.cell_of(pos);
            assert!(grid.bounds_of(cell).contains(pos), "{pos:?} not in {cell}");
        }
    }

    #[test]
    fn interning_is_stable_and_keyed() {
        let mut grid = GridAddressing::new(1.0);
        let a = grid.handle_of(LatLng::new(5.2, 5.9));
        let b = grid.handle_of(LatLng::new(5.7, 5.1));
        let c = grid.handle_of(LatLng::new(6.1, 5.1));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(grid.resolve(a), Some(GridCell::new(5, 5)));
        assert_eq!(grid.known_cells(), 2);
        grid.reset();
        assert_eq!(grid.known_cells(), 0);
        assert_eq!(grid.resolve(a), None);
    }

    #[test]
    fn non_finite_positions_map_to_origin() {
        let mut grid = GridAddressing::new(0.5);
        assert_eq!(grid.cell_of(LatLng::new(f64::NAN, f64::INFINITY)), GridCell::new(0, 0));
    }

    #[test]
    fn cell_keys_parse_and_print() {
        let cell: GridCell = "5:-3".parse().unwrap();
        assert_eq!(cell, GridCell::new(5, -3));
        assert_eq!(cell.to_string(), "5:-3");
        assert_eq!(cell.luck_key(), "5,-3");
        assert!("5,3".parse::<GridCell>().is_err());
        assert!("a:b".parse::<GridCell>().is_err());
    }

    #[test]
    fn manhattan_counts_both_axes() {
        let origin = GridCell::new(0, 0);
        assert_eq!(origin.manhattan(GridCell::new(3, -4)), 7);
        assert_eq!(GridCell::new(i32::MIN, 0).manhattan(GridCell::new(i32::MAX, 0)), u32::MAX);
    }

    #[test]
    fn directions_step_one_tile() {
        let start = LatLng::new(1.0, 1.0);
        let (d_lat, d_lng) = Direction::North.delta();
        let moved = start.offset(d_lat, d_lng, 0.5);
        assert!((moved.lat - 1.5).abs() < f64::EPSILON);
        assert_eq!(Direction::East.opposite(), Direction::West);
        assert_eq!("up".parse::<Direction>(), Ok(Direction::North));
    }
}
