//! Exportable imagery layers and output naming.
//!
//! The map's layer stack is modelled as a list of [`LayerRecord`]s in
//! drawing order (bottom first). Only layers flagged as exportable can be
//! written to a container; groups contribute their topmost exportable member.

/// Zoom capabilities of an imagery layer that can be exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLayer {
    id: String,
    min_zoom: Option<u8>,
    max_native_zoom: Option<u8>,
    max_zoom: Option<u8>,
}

/// Maximum zoom assumed for layers that do not advertise one.
pub const DEFAULT_LAYER_MAX_ZOOM: u8 = 18;

impl ExportLayer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            min_zoom: None,
            max_native_zoom: None,
            max_zoom: None,
        }
    }

    pub fn with_min_zoom(mut self, zoom: u8) -> Self {
        self.min_zoom = Some(zoom);
        self
    }

    pub fn with_max_native_zoom(mut self, zoom: u8) -> Self {
        self.max_native_zoom = Some(zoom);
        self
    }

    pub fn with_max_zoom(mut self, zoom: u8) -> Self {
        self.max_zoom = Some(zoom);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Finest zoom offered for export: native maximum, else display maximum, else 18.
    pub fn export_max_zoom(&self) -> u8 {
        self.max_native_zoom
            .or(self.max_zoom)
            .unwrap_or(DEFAULT_LAYER_MAX_ZOOM)
    }

    /// Coarsest zoom the layer serves.
    pub fn export_min_zoom(&self) -> u8 {
        self.min_zoom.unwrap_or(0)
    }
}

/// What a layer-stack entry contains.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    /// A single tile layer; `None` when it cannot be exported
    Single(Option<ExportLayer>),
    /// A wrapper grouping several layers under one name (bottom first)
    Group(Vec<Option<ExportLayer>>),
}

/// One entry of the map's layer stack.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRecord {
    pub name: String,
    pub visible: bool,
    pub kind: LayerKind,
}

/// Layer chosen for export together with its display name.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedLayer {
    pub layer: ExportLayer,
    pub name: String,
}

/// Picks the topmost visible exportable layer.
///
/// Groups are searched top-down and report the group's own name.
pub fn select_export_layer(records: &[LayerRecord]) -> Option<SelectedLayer> {
    records
        .iter()
        .rev()
        .filter(|record| record.visible)
        .find_map(|record| {
            let layer = match &record.kind {
                LayerKind::Single(layer) => layer.clone(),
                LayerKind::Group(members) => members.iter().rev().flatten().next().cloned(),
            }?;
            Some(SelectedLayer {
                layer,
                name: record.name.clone(),
            })
        })
}

/// Lowercases a layer name and collapses runs of spaces, parentheses and
/// path separators into `_`.
pub fn sanitize_layer_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if matches!(c, ' ' | '(' | ')' | '/' | '\\') {
            if !in_run {
                out.push('_');
                in_run = true;
            }
        } else {
            out.extend(c.to_lowercase());
            in_run = false;
        }
    }
    out
}

/// Output file name: `<site>_<sanitized-layer-name>_z<zoom>.jnx`.
///
/// Path separators in `site` become `_` so the name never leaves the output directory.
pub fn export_file_name(site: &str, layer_name: &str, zoom: u8) -> String {
    let site = site.replace(['/', '\\'], "_");
    format!("{}_{}_z{}.jnx", site, sanitize_layer_name(layer_name), zoom)
}
