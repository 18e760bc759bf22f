//! Live export selection: the chosen layer and its options.
//!
//! The map reports layer-stack changes and rectangle edits as they happen.
//! [`ExportSelection`] keeps the last computed layer and option list and
//! only recomputes them when an input actually changed, then broadcasts the
//! new value to subscribers.
//!
//! ```
//! use mapexport::coord::GeoBounds;
//! use mapexport::layer::{ExportLayer, LayerKind, LayerRecord};
//! use mapexport::selection::ExportSelection;
//!
//! let selection = ExportSelection::new(50_000);
//! let mut updates = selection.subscribe();
//!
//! selection.set_layers(vec![LayerRecord {
//!     name: "OpenStreetMap".to_string(),
//!     visible: true,
//!     kind: LayerKind::Single(Some(ExportLayer::new("osm").with_max_zoom(12))),
//! }]);
//! selection.set_bounds(GeoBounds::new(1.0, 0.0, 0.0, 1.0).unwrap());
//!
//! assert_eq!(selection.options().len(), 7);
//! assert!(updates.try_recv().is_ok());
//! ```

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;

use crate::coord::GeoBounds;
use crate::layer::{select_export_layer, LayerRecord, SelectedLayer};
use crate::plan::{export_options, ExportOption};

/// Capacity of the update channel; slow subscribers skip stale updates.
const UPDATE_CHANNEL_CAPACITY: usize = 16;

/// Snapshot sent to subscribers after a recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionUpdate {
    pub layer: Option<SelectedLayer>,
    pub options: Vec<ExportOption>,
}

#[derive(Debug, Default)]
struct SelectionState {
    layers: Vec<LayerRecord>,
    bounds: Option<GeoBounds>,
    selected: Option<SelectedLayer>,
    options: Vec<ExportOption>,
}

/// Memoized export layer and options for the current map state.
#[derive(Debug, Clone)]
pub struct ExportSelection {
    state: Arc<RwLock<SelectionState>>,
    updates: broadcast::Sender<SelectionUpdate>,
    warn_tile_count: u64,
}

impl ExportSelection {
    pub fn new(warn_tile_count: u64) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(SelectionState::default())),
            updates,
            warn_tile_count,
        }
    }

    /// Receives every recomputed selection from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SelectionUpdate> {
        self.updates.subscribe()
    }

    /// Replaces the layer stack (layer added, removed or toggled).
    ///
    /// Returns true when the exportable layer changed.
    pub fn set_layers(&self, layers: Vec<LayerRecord>) -> bool {
        let mut state = self.write();
        if state.layers == layers {
            return false;
        }
        let selected = select_export_layer(&layers);
        state.layers = layers;
        if state.selected == selected {
            return false;
        }
        state.selected = selected;
        self.recompute(&mut state);
        true
    }

    /// Sets the selection rectangle. Returns true when it moved.
    pub fn set_bounds(&self, bounds: GeoBounds) -> bool {
        self.update_bounds(Some(bounds))
    }

    /// Removes the selection rectangle. Returns true when one was set.
    pub fn clear_bounds(&self) -> bool {
        self.update_bounds(None)
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        self.read().bounds
    }

    pub fn selected_layer(&self) -> Option<SelectedLayer> {
        self.read().selected.clone()
    }

    /// Current options, finest zoom first. Empty without a layer or bounds.
    pub fn options(&self) -> Vec<ExportOption> {
        self.read().options.clone()
    }

    fn update_bounds(&self, bounds: Option<GeoBounds>) -> bool {
        let mut state = self.write();
        if state.bounds == bounds {
            return false;
        }
        state.bounds = bounds;
        self.recompute(&mut state);
        true
    }

    fn recompute(&self, state: &mut SelectionState) {
        state.options = match (&state.selected, &state.bounds) {
            (Some(selected), Some(bounds)) => {
                match export_options(&selected.layer, bounds, self.warn_tile_count) {
                    Ok(options) => options,
                    Err(e) => {
                        tracing::warn!(layer = %selected.name, error = %e, "Cannot list export options");
                        Vec::new()
                    }
                }
            }
            _ => Vec::new(),
        };

        tracing::debug!(
            layer = state.selected.as_ref().map(|s| s.name.as_str()),
            options = state.options.len(),
            "Export selection recomputed"
        );

        // No subscribers is fine
        let _ = self.updates.send(SelectionUpdate {
            layer: state.selected.clone(),
            options: state.options.clone(),
        });
    }

    fn read(&self) -> RwLockReadGuard<'_, SelectionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SelectionState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ExportSelection {
    fn default() -> Self {
        Self::new(crate::plan::DEFAULT_WARN_TILE_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{ExportLayer, LayerKind};
    use tokio::sync::broadcast::error::TryRecvError;

    fn layer(name: &str, visible: bool, max_zoom: u8) -> LayerRecord {
        LayerRecord {
            name: name.to_string(),
            visible,
            kind: LayerKind::Single(Some(ExportLayer::new(name).with_max_zoom(max_zoom))),
        }
    }

    fn bounds() -> GeoBounds {
        GeoBounds::new(1.0, 0.0, 0.0, 1.0).unwrap()
    }

    #[test]
    fn test_options_empty_until_layer_and_bounds() {
        let selection = ExportSelection::default();
        assert!(selection.options().is_empty());

        selection.set_layers(vec![layer("osm", true, 12)]);
        assert!(selection.options().is_empty());
        assert_eq!(selection.selected_layer().unwrap().name, "osm");

        selection.set_bounds(bounds());
        let options = selection.options();
        assert_eq!(options.len(), 7);
        assert_eq!(options[0].zoom, 12);
        assert_eq!(options[6].zoom, 6);
    }

    #[test]
    fn test_unchanged_inputs_do_not_notify() {
        let selection = ExportSelection::default();
        let mut updates = selection.subscribe();

        assert!(selection.set_layers(vec![layer("osm", true, 12)]));
        assert!(selection.set_bounds(bounds()));
        assert!(updates.try_recv().is_ok());
        assert!(updates.try_recv().is_ok());

        assert!(!selection.set_bounds(bounds()));
        assert!(!selection.set_layers(vec![layer("osm", true, 12)]));
        assert_eq!(updates.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_hidden_overlay_keeps_selection() {
        let selection = ExportSelection::default();
        selection.set_layers(vec![layer("osm", true, 12)]);
        selection.set_bounds(bounds());
        let mut updates = selection.subscribe();

        // A new hidden layer changes the stack but not the exported layer
        let changed = selection.set_layers(vec![layer("osm", true, 12), layer("topo", false, 15)]);
        assert!(!changed);
        assert_eq!(updates.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_layer_switch_recomputes() {
        let selection = ExportSelection::default();
        selection.set_bounds(bounds());
        selection.set_layers(vec![layer("osm", true, 12)]);
        let mut updates = selection.subscribe();

        assert!(selection.set_layers(vec![layer("osm", true, 12), layer("topo", true, 15)]));
        let update = updates.try_recv().unwrap();
        assert_eq!(update.layer.unwrap().name, "topo");
        assert_eq!(update.options[0].zoom, 15);
    }

    #[test]
    fn test_clear_bounds_empties_options() {
        let selection = ExportSelection::default();
        selection.set_layers(vec![layer("osm", true, 12)]);
        selection.set_bounds(bounds());

        assert!(selection.clear_bounds());
        assert!(selection.options().is_empty());
        assert!(selection.bounds().is_none());
        assert!(!selection.clear_bounds());
    }
}
