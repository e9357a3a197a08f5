//! A `MapView` that records what a renderer would have drawn.
use geocoin_game::{CellBounds, GridCell, LatLng, MapView};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct RecordingMap {
    markers: BTreeMap<GridCell, CellBounds>,
    player: Option<LatLng>,
    trail_len: usize,
    pans: Vec<LatLng>,
    refreshes: usize,
    anomalies: Vec<String>,
}

impl RecordingMap {
    #[must_use]
    pub fn visible(&self) -> Vec<GridCell> {
        self.markers.keys().copied().collect()
    }

    #[must_use]
    pub const fn player(&self) -> Option<LatLng> {
        self.player
    }

    #[must_use]
    pub const fn trail_len(&self) -> usize {
        self.trail_len
    }

    #[must_use]
    pub fn pans(&self) -> &[LatLng] {
        &self.pans
    }

    #[must_use]
    pub const fn refreshes(&self) -> usize {
        self.refreshes
    }

    /// Draw calls that made no sense, such as removing an absent marker.
    #[must_use]
    pub fn anomalies(&self) -> &[String] {
        &self.anomalies
    }
}

impl MapView for RecordingMap {
    fn show_cache(&mut self, cell: GridCell, bounds: CellBounds) {
        if self.markers.insert(cell, bounds).is_some() {
            self.anomalies.push(format!("cache {cell} shown twice"));
        }
    }

    fn remove_cache(&mut self, cell: GridCell) {
        if self.markers.remove(&cell).is_none() {
            self.anomalies.push(format!("cache {cell} removed while hidden"));
        }
    }

    fn move_player(&mut self, position: LatLng) {
        self.player = Some(position);
    }

    fn draw_trail(&mut self, trail: &[LatLng]) {
        self.trail_len = trail.len();
    }

    fn pan_to(&mut self, position: LatLng) {
        self.pans.push(position);
    }

    fn refresh_cache(&mut self, cell: GridCell) {
        self.refreshes += 1;
        if !self.markers.contains_key(&cell) {
            self.anomalies.push(format!("cache {cell} refreshed while hidden"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> CellBounds {
        CellBounds {
            south_west: LatLng::new(0.0, 0.0),
            north_east: LatLng::new(1.0, 1.0),
        }
    }

    #[test]
    fn tracks_markers_and_flags_nonsense() {
        let mut map = RecordingMap::default();
        let cell = GridCell::new(1, 1);
        map.show_cache(cell, bounds());
        assert_eq!(map.visible(), vec![cell]);
        map.show_cache(cell, bounds());
        map.remove_cache(cell);
        map.remove_cache(cell);
        map.refresh_cache(cell);
        assert!(map.visible().is_empty());
        assert_eq!(map.anomalies().len(), 3);
        assert_eq!(map.refreshes(), 1);
    }

    #[test]
    fn remembers_player_and_trail() {
        let mut map = RecordingMap::default();
        map.move_player(LatLng::new(2.0, 3.0));
        map.draw_trail(&[LatLng::new(1.0, 1.0), LatLng::new(2.0, 3.0)]);
        map.pan_to(LatLng::new(0.5, 0.5));
        assert_eq!(map.player(), Some(LatLng::new(2.0, 3.0)));
        assert_eq!(map.trail_len(), 2);
        assert_eq!(map.pans(), &[LatLng::new(0.5, 0.5)]);
    }
}
