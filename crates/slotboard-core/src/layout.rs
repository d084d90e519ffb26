//! Layout directives derived from coincidence records.
//!
//! The rendering layer turns a directive into width, horizontal translation,
//! alignment, grid placement and height for an item's box.

use crate::coincidence::{CoincidenceRecord, coincidences_by_column};
use crate::config::BoardConfig;
use crate::model::{GridModel, Item, ItemId};
use serde::{Deserialize, Serialize};

/// Width lost per overlapping predecessor by an item that starts alone.
pub const ANCHOR_WIDTH_STEP: f64 = 10.0;

/// Sizing and placement of one item inside its column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutDirective {
    /// Width as a percentage of the column width.
    pub width_percent: f64,
    /// Horizontal translation as a percentage of the item's own width.
    pub offset_percent: f64,
    /// Align the box to the end of the cell (items that start alone).
    pub justify_end: bool,
    /// CSS-style grid line the item starts on; line 1 is the header row.
    pub grid_row_start: u32,
    /// Box height in pixels, one pixel short of the spanned rows for the grid line.
    pub height_px: f64,
}

impl LayoutDirective {
    /// Derive the directive of `item` from its coincidence record.
    ///
    /// An item that is the only one starting in its first row is an anchor:
    /// it keeps the full width minus a step per item ranked before it and is
    /// pushed to the end of the cell. Items starting together share the width
    /// evenly and are translated by their rank.
    pub fn from_record<T>(item: &Item<T>, record: &CoincidenceRecord, row_height: f64) -> Self {
        let anchor = record.row_start_coincidences() == 1;
        let max_concurrent = record.max_coincident_items() as f64;
        let max_order = record.max_order() as f64;

        let (width_percent, offset_percent) = if anchor {
            (100.0 - (max_order - 1.0) * ANCHOR_WIDTH_STEP, 0.0)
        } else {
            (100.0 / (max_concurrent + 1.0), (max_order - 1.0) * 100.0)
        };

        Self {
            width_percent,
            offset_percent,
            justify_end: anchor,
            grid_row_start: item.row_start.saturating_add(1),
            height_px: item.row_span as f64 * row_height - 1.0,
        }
    }
}

/// Compute the directive of every item on the board, in column order.
pub fn layout_board<T>(
    model: &GridModel<T>,
    config: &BoardConfig,
) -> Vec<(ItemId, LayoutDirective)> {
    coincidences_by_column(model)
        .into_iter()
        .flat_map(|(_, records)| records)
        .filter_map(|record| {
            let item = model.item(&record.id)?;
            let directive = LayoutDirective::from_record(item, &record, config.row_height);
            Some((record.id, directive))
        })
        .collect()
}
