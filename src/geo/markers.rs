// file: src/geo/markers.rs
// description: replace-all marker set keyed by refresh generation
// reference: shared state guarded by parking_lot

use crate::models::Marker;
use parking_lot::RwLock;
use tracing::debug;

/// Identifies the pulse refresh a marker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MarkerGeneration(pub u64);

#[derive(Debug, Default)]
struct LayerState {
    generation: u64,
    markers: Vec<Marker>,
}

#[derive(Debug, Default)]
pub struct MarkerLayer {
    state: RwLock<LayerState>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every marker and opens a new generation.
    pub fn reset(&self) -> MarkerGeneration {
        let mut state = self.state.write();
        state.generation += 1;
        let cleared = state.markers.len();
        state.markers.clear();
        debug!("Marker layer reset to generation {} ({} cleared)", state.generation, cleared);
        MarkerGeneration(state.generation)
    }

    /// Adds a marker if its generation is still current. Returns whether it was kept.
    pub fn add(&self, generation: MarkerGeneration, marker: Marker) -> bool {
        let mut state = self.state.write();
        if state.generation != generation.0 {
            debug!(
                "Dropping marker from generation {} (current {})",
                generation.0, state.generation
            );
            return false;
        }
        state.markers.push(marker);
        true
    }

    pub fn snapshot(&self) -> Vec<Marker> {
        self.state.read().markers.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
