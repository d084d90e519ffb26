//! Board data model: columns, rows and the items placed in them.
//!
//! The model is a read-only snapshot owned by the host. The core only reads it
//! and proposes relocations; it never mutates a model in place.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while building or validating a board.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Item {id} has row_start {row_start}, rows are 1-indexed")]
    InvalidRowStart { id: ItemId, row_start: i64 },
    #[error("Item {id} has row_span {row_span}, must be at least 1")]
    InvalidRowSpan { id: ItemId, row_span: i64 },
    #[error("Item {id} spans {row_span} rows from row {row_start}, past the last row {rows}")]
    RowRangeOutOfBounds {
        id: ItemId,
        row_start: u32,
        row_span: u32,
        rows: usize,
    },
    #[error("Item {id} references unknown column {column_id}")]
    UnknownColumn { id: ItemId, column_id: ColumnId },
    #[error("Duplicate item id: {0}")]
    DuplicateItem(ItemId),
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Opaque identifier of a board item.
    ItemId
);
string_id!(
    /// Opaque identifier of a column.
    ColumnId
);
string_id!(
    /// Opaque identifier of a row.
    RowId
);

impl ItemId {
    /// Generate a fresh random item id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// A board column. Its position in [`GridModel::columns`] is its grid index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub label: String,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// A board row. Its position in [`GridModel::rows`] is its grid index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub label: String,
}

impl Row {
    pub fn new(id: impl Into<RowId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// A time-boxed item placed in one column over one or more rows.
///
/// `row_start` is 1-indexed; the item occupies rows
/// `row_start..=row_start + row_span - 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item<T> {
    pub id: ItemId,
    pub column_id: ColumnId,
    pub row_start: u32,
    pub row_span: u32,
    pub payload: T,
}

impl<T> Item<T> {
    /// Create an item, rejecting zero `row_start` or `row_span` and ranges
    /// ending past `u32::MAX`.
    pub fn new(
        id: impl Into<ItemId>,
        column_id: impl Into<ColumnId>,
        row_start: u32,
        row_span: u32,
        payload: T,
    ) -> ModelResult<Self> {
        let id = id.into();
        if row_start < 1 {
            return Err(ModelError::InvalidRowStart {
                id,
                row_start: row_start.into(),
            });
        }
        if row_span < 1 {
            return Err(ModelError::InvalidRowSpan {
                id,
                row_span: row_span.into(),
            });
        }
        if row_start.checked_add(row_span - 1).is_none() {
            return Err(ModelError::RowRangeOutOfBounds {
                id,
                row_start,
                row_span,
                rows: u32::MAX as usize,
            });
        }
        Ok(Self {
            id,
            column_id: column_id.into(),
            row_start,
            row_span,
            payload,
        })
    }

    /// Last occupied row (1-indexed, inclusive).
    pub fn row_end(&self) -> u32 {
        self.row_start.saturating_add(self.row_span.saturating_sub(1))
    }

    /// Check whether the item occupies the given 1-indexed row.
    pub fn occupies(&self, row: u32) -> bool {
        row >= self.row_start && row <= self.row_end()
    }
}

/// A snapshot of the whole board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridModel<T> {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub items: Vec<Item<T>>,
}

impl<T> Default for GridModel<T> {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            items: Vec::new(),
        }
    }
}

impl<T> GridModel<T> {
    pub fn new(columns: Vec<Column>, rows: Vec<Row>, items: Vec<Item<T>>) -> Self {
        Self {
            columns,
            rows,
            items,
        }
    }

    /// Get an item by id.
    pub fn item(&self, id: &ItemId) -> Option<&Item<T>> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Grid index of a column.
    pub fn column_index(&self, id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|column| &column.id == id)
    }

    /// Items of one column, in input order.
    pub fn items_in_column<'a>(&'a self, id: &'a ColumnId) -> impl Iterator<Item = &'a Item<T>> {
        self.items.iter().filter(move |item| &item.column_id == id)
    }

    /// Items grouped by column, in column order. Each group keeps the input
    /// order of `items`; columns without items yield an empty group.
    pub fn items_by_column(&self) -> Vec<(&Column, Vec<&Item<T>>)> {
        self.columns
            .iter()
            .map(|column| (column, self.items_in_column(&column.id).collect()))
            .collect()
    }

    /// Check row ranges, column references and id uniqueness of every item.
    /// Every item must end on or before the last row of the board.
    ///
    /// Deserialized boards bypass [`Item::new`], so hosts loading boards from
    /// files should call this before handing the model to the core.
    pub fn validate(&self) -> ModelResult<()> {
        let mut seen = std::collections::HashSet::new();
        for item in &self.items {
            if !seen.insert(&item.id) {
                return Err(ModelError::DuplicateItem(item.id.clone()));
            }
            if item.row_start < 1 {
                return Err(ModelError::InvalidRowStart {
                    id: item.id.clone(),
                    row_start: item.row_start.into(),
                });
            }
            if item.row_span < 1 {
                return Err(ModelError::InvalidRowSpan {
                    id: item.id.clone(),
                    row_span: item.row_span.into(),
                });
            }
            let row_end = u64::from(item.row_start) + u64::from(item.row_span) - 1;
            if row_end > self.rows.len() as u64 {
                return Err(ModelError::RowRangeOutOfBounds {
                    id: item.id.clone(),
                    row_start: item.row_start,
                    row_span: item.row_span,
                    rows: self.rows.len(),
                });
            }
            if self.column_index(&item.column_id).is_none() {
                return Err(ModelError::UnknownColumn {
                    id: item.id.clone(),
                    column_id: item.column_id.clone(),
                });
            }
        }
        Ok(())
    }
}
