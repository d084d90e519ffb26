//! Per-column overlap analysis.
//!
//! For every item of a column and every row it occupies, count how many other
//! items share that row and rank the item among them. The rank walks the
//! column's items in input order, so reordering the input reorders the ranks.
//!
//! The scan is quadratic in the number of items per column. Boards have tens
//! of items per column; a sweep over sorted intervals would be needed for
//! thousands and must keep the same input-order ranking.

use crate::model::{ColumnId, GridModel, Item, ItemId};
use serde::{Deserialize, Serialize};

/// Overlap information for one occupied row of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCoincidence {
    /// 1-indexed board row.
    pub row: u32,
    /// Number of other items occupying this row.
    pub coincident_items: u32,
    /// 1-based rank of the item among all items occupying this row.
    pub order: u32,
    /// Items (self included) starting at the item's first row.
    /// Only filled in on the first row entry; 0 on the following ones.
    pub row_start_coincidences: u32,
}

/// Overlap information for one item, one entry per occupied row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoincidenceRecord {
    pub id: ItemId,
    pub rows: Vec<RowCoincidence>,
}

impl CoincidenceRecord {
    /// Largest number of other items sharing any one row with this item.
    pub fn max_coincident_items(&self) -> u32 {
        self.rows
            .iter()
            .map(|r| r.coincident_items)
            .max()
            .unwrap_or(0)
    }

    /// Largest rank this item takes on any of its rows.
    pub fn max_order(&self) -> u32 {
        self.rows.iter().map(|r| r.order).max().unwrap_or(1)
    }

    /// Number of items starting together with this one.
    pub fn row_start_coincidences(&self) -> u32 {
        self.rows
            .first()
            .map(|r| r.row_start_coincidences)
            .unwrap_or(1)
    }
}

/// Resolve the coincidences of the items of a single column.
///
/// Items are compared by range only; callers pass the items of one column.
pub fn resolve_column<'a, T: 'a>(
    items: impl IntoIterator<Item = &'a Item<T>>,
) -> Vec<CoincidenceRecord> {
    let items: Vec<&Item<T>> = items.into_iter().collect();

    items
        .iter()
        .map(|current| {
            let start = current.row_start;
            let rows = (start..=current.row_end())
                .map(|row| {
                    let mut occupying = 0u32;
                    let mut order = 0u32;
                    for other in &items {
                        if other.id == current.id {
                            occupying += 1;
                            if order == 0 {
                                order = occupying;
                            }
                        } else if other.occupies(row) {
                            occupying += 1;
                        }
                    }

                    let row_start_coincidences = if row == start {
                        items.iter().filter(|other| other.row_start == start).count() as u32
                    } else {
                        0
                    };

                    RowCoincidence {
                        row,
                        coincident_items: occupying - 1,
                        order,
                        row_start_coincidences,
                    }
                })
                .collect();

            CoincidenceRecord {
                id: current.id.clone(),
                rows,
            }
        })
        .collect()
}

/// Resolve every column of a board, in column order.
pub fn coincidences_by_column<T>(
    model: &GridModel<T>,
) -> Vec<(ColumnId, Vec<CoincidenceRecord>)> {
    model
        .items_by_column()
        .into_iter()
        .map(|(column, items)| (column.id.clone(), resolve_column(items)))
        .collect()
}
