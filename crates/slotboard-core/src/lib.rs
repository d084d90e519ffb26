//! Slotboard Core Library
//!
//! Layout and drag logic for column/row schedule boards. The host renders the
//! board and owns its items; this crate sizes overlapping items and turns drag
//! gestures into relocation batches.

pub mod coincidence;
pub mod commit;
pub mod config;
pub mod drag;
pub mod layout;
pub mod model;
pub mod position;
pub mod selection;

pub use coincidence::{
    CoincidenceRecord, RowCoincidence, coincidences_by_column, resolve_column,
};
pub use commit::{
    BoxFuture, CommitError, CommitResult, CommitSink, GestureId, InFlightCommit, Relocation,
    Settlement,
};
pub use config::{BoardConfig, ConfigError, DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT};
pub use drag::{
    ActiveDragState, DragAxisPolicy, DragCoordinator, DragError, DragEvent, DragResult,
};
pub use layout::{LayoutDirective, layout_board};
pub use model::{Column, ColumnId, GridModel, Item, ItemId, ModelError, Row, RowId};
pub use position::{GridDelta, GridPosition};
pub use selection::{SelectedItem, SelectionSet};
