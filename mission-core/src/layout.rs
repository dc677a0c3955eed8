//! Default placement and reconciliation of grid layout entries.
//!
//! Interactive collision handling belongs to the grid itself; this module
//! only decides where new widgets start and keeps the persisted entries in
//! step with the live widget set.

use screen::{LayoutEntry, Placement, WidgetInstance, WidgetKind};
use std::collections::HashMap;

pub const GRID_COLUMNS: u32 = 48;

const OVERFLOW_COLUMNS: usize = 3;
const OVERFLOW_STEP: u32 = 10;

pub fn default_size(kind: WidgetKind) -> (u32, u32) {
    match kind {
        WidgetKind::Readout => (8, 16),
        WidgetKind::CommandIssuer => (17, 40),
        WidgetKind::Chart => (14, 24),
    }
}

pub fn canonical_position(kind: WidgetKind) -> (u32, u32) {
    match kind {
        WidgetKind::Readout => (0, 0),
        WidgetKind::CommandIssuer => (10, 0),
        WidgetKind::Chart => (0, 20),
    }
}

fn overflow_position(ordinal: usize) -> (u32, u32) {
    let column = (ordinal % OVERFLOW_COLUMNS) as u32;
    let row = (ordinal / OVERFLOW_COLUMNS) as u32;
    (column * OVERFLOW_STEP, row * OVERFLOW_STEP)
}

/// Where a new widget of `kind` goes, given the entries already on screen.
///
/// The kind's canonical spot is used while nothing sits there. After that,
/// placements walk an overflow grid from the current entry count until they
/// reach an origin no existing entry uses.
pub fn default_placement(kind: WidgetKind, existing: &[LayoutEntry]) -> Placement {
    let (width, height) = default_size(kind);
    let occupied = |(x, y): (u32, u32)| existing.iter().any(|e| e.x == x && e.y == y);

    let mut position = canonical_position(kind);
    let mut ordinal = existing.len();
    while occupied(position) {
        position = overflow_position(ordinal);
        ordinal += 1;
    }
    Placement {
        x: position.0,
        y: position.1,
        width,
        height,
    }
}

fn sanitized(entry: &LayoutEntry) -> LayoutEntry {
    let mut entry = entry.clone();
    entry.width = entry.width.clamp(1, GRID_COLUMNS);
    entry.height = entry.height.max(1);
    entry
}

/// One entry per widget, in widget order.
///
/// Entries for unknown widgets and repeated entries for the same widget are
/// dropped. Widgets without an entry get a default placement that avoids
/// every entry kept so far.
pub fn reconcile(entries: &[LayoutEntry], widgets: &[WidgetInstance]) -> Vec<LayoutEntry> {
    let mut by_id: HashMap<&str, &LayoutEntry> = HashMap::new();
    for entry in entries {
        if widgets.iter().any(|w| w.id() == entry.widget_id) {
            by_id.entry(entry.widget_id.as_str()).or_insert(entry);
        } else {
            log::warn!("Dropping layout entry for unknown widget `{}`", entry.widget_id);
        }
    }

    let mut placed: Vec<LayoutEntry> = by_id.values().map(|entry| sanitized(entry)).collect();
    let mut result = Vec::with_capacity(widgets.len());
    for widget in widgets {
        match by_id.get(widget.id()) {
            Some(entry) => result.push(sanitized(entry)),
            None => {
                let placement = default_placement(widget.kind(), &placed);
                let entry = LayoutEntry::new(widget.id(), placement);
                placed.push(entry.clone());
                result.push(entry);
            }
        }
    }
    result
}
