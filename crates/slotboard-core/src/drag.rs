//! Drag gesture coordination.
//!
//! A [`DragCoordinator`] turns pointer deltas reported by the host into a
//! validated relocation batch. Every gesture runs Idle -> Dragging -> Idle;
//! any failure along the way is a silent cancel back to Idle.
//!
//! Grid positions are 0-indexed internally. An item's 1-indexed `row_start`
//! is converted on the way in (`row_start - 1`) and relocations carry row ids,
//! so no 1-indexed value leaves the coordinator.

use crate::commit::{CommitError, CommitSink, GestureId, InFlightCommit, Relocation, Settlement};
use crate::model::{ColumnId, GridModel, Item, ItemId};
use crate::position::{self, GridDelta, GridPosition};
use crate::selection::SelectionSet;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::rc::{Rc, Weak};
use thiserror::Error;

/// Why a gesture ended without a commit, or why a commit failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DragError {
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("Column not found: {0}")]
    ColumnNotFound(ColumnId),
    #[error("Drop position ({column_index}, {row_index}) is outside the board")]
    OutOfBounds { column_index: i64, row_index: i64 },
    #[error("Item dropped in its starting cell")]
    NoMovement,
    #[error("No item of the move-set fits on the board")]
    EmptyBatch,
    #[error("No drag in progress")]
    NotDragging,
    #[error(transparent)]
    CommitRejected(#[from] CommitError),
}

/// Result type for drag operations.
pub type DragResult<T> = Result<T, DragError>;

/// Decides per item whether horizontal dragging is allowed.
/// Vertical dragging is always allowed.
pub trait DragAxisPolicy {
    fn can_drag_on_x(&self, id: &ItemId) -> bool;
}

impl<F> DragAxisPolicy for F
where
    F: Fn(&ItemId) -> bool,
{
    fn can_drag_on_x(&self, id: &ItemId) -> bool {
        self(id)
    }
}

/// Where the dragged item currently hovers. Read by the rendering layer to
/// paint the ghost and highlight target cells.
///
/// Not clamped: indices may point outside the board while dragging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDragState {
    pub id: ItemId,
    pub column_index: i64,
    pub row_index: i64,
    pub row_span: u32,
}

impl ActiveDragState {
    pub fn position(&self) -> GridPosition {
        GridPosition::new(self.column_index, self.row_index)
    }
}

/// Change notifications, drained with [`DragCoordinator::poll_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    /// A gesture started on an item.
    Started(ActiveDragState),
    /// The hovered cell was recomputed.
    Moved(ActiveDragState),
    /// A gesture ended without a commit.
    Cancelled { id: ItemId, reason: DragError },
    /// A batch was handed to the commit sink.
    Committed {
        gesture: GestureId,
        batch: Vec<Relocation>,
    },
    /// The commit sink resolved or rejected a batch.
    Settled {
        gesture: GestureId,
        rejected: Option<CommitError>,
    },
    /// The selection was cleared after a multi-item move.
    SelectionCleared,
    /// The active drag state was cleared.
    Ended { id: ItemId },
}

/// Per-gesture data, alive from `start` to `end`.
#[derive(Debug, Clone)]
struct DragSession {
    gesture: GestureId,
    item_id: ItemId,
    initial: GridPosition,
    row_span: u32,
    pixel_anchor: Point,
    column_width: f64,
    row_height: f64,
    can_drag_on_x: bool,
    can_drag_on_y: bool,
}

/// Owns the drag state and the multi-selection of one board.
///
/// Change notifications queue up until drained with
/// [`poll_events`](Self::poll_events); hosts drain them once per frame.
pub struct DragCoordinator<T, S: CommitSink> {
    sink: S,
    axis_policy: Option<Box<dyn DragAxisPolicy>>,
    selection: SelectionSet<T>,
    session: Option<DragSession>,
    active: Option<ActiveDragState>,
    /// Gesture that wrote `active`.
    active_gesture: Option<GestureId>,
    /// Last axis-restricted pointer delta.
    pixel_delta: Vec2,
    /// Ticket of the commit owning `active`, dead once its handle is dropped.
    pending: Option<(GestureId, Weak<()>)>,
    next_gesture: u64,
    events: Vec<DragEvent>,
}

impl<T, S: CommitSink> DragCoordinator<T, S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            axis_policy: None,
            selection: SelectionSet::new(),
            session: None,
            active: None,
            active_gesture: None,
            pixel_delta: Vec2::ZERO,
            pending: None,
            next_gesture: 0,
            events: Vec::new(),
        }
    }

    /// Install the horizontal drag policy. Queried once per gesture, at start.
    pub fn with_axis_policy(mut self, policy: impl DragAxisPolicy + 'static) -> Self {
        self.axis_policy = Some(Box::new(policy));
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn selection(&self) -> &SelectionSet<T> {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionSet<T> {
        &mut self.selection
    }

    /// Current hover state, `None` outside of a gesture.
    pub fn active(&self) -> Option<&ActiveDragState> {
        if self.is_abandoned() {
            return None;
        }
        self.active.as_ref()
    }

    /// Last pointer delta after axis restriction, for translating overlays.
    pub fn pixel_delta(&self) -> Vec2 {
        if self.is_abandoned() {
            return Vec2::ZERO;
        }
        self.pixel_delta
    }

    /// Whether a gesture is accepting pointer moves.
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Drain pending change notifications.
    ///
    /// Also closes a gesture whose commit handle was dropped, so the drained
    /// events end with its `Ended`.
    pub fn poll_events(&mut self) -> Vec<DragEvent> {
        self.reap_abandoned();
        std::mem::take(&mut self.events)
    }

    /// Begin dragging `id`.
    ///
    /// Fails without entering Dragging when the item or its column is not in
    /// `model`. Starting while another gesture is active abandons that one.
    pub fn start(
        &mut self,
        model: &GridModel<T>,
        id: &ItemId,
        column_width: f64,
        row_height: f64,
    ) -> DragResult<()> {
        let item = model
            .item(id)
            .ok_or_else(|| DragError::ItemNotFound(id.clone()))?;
        let column_index = model
            .column_index(&item.column_id)
            .ok_or_else(|| DragError::ColumnNotFound(item.column_id.clone()))?;

        self.reap_abandoned();
        if let Some(previous) = self.session.take() {
            log::debug!(
                "Drag {} on {} abandoned by a new gesture",
                previous.gesture,
                previous.item_id
            );
        }

        let initial = GridPosition::new(column_index as i64, item.row_start as i64 - 1);
        let pixel_anchor = position::pixel_of(initial, column_width, row_height)
            + Vec2::new(column_width / 2.0, 0.0);
        let can_drag_on_x = self
            .axis_policy
            .as_ref()
            .is_none_or(|policy| policy.can_drag_on_x(id));

        let gesture = GestureId(self.next_gesture);
        self.next_gesture += 1;

        log::debug!(
            "Drag {} started on {} at ({}, {})",
            gesture,
            id,
            initial.column_index,
            initial.row_index
        );

        let state = ActiveDragState {
            id: id.clone(),
            column_index: initial.column_index,
            row_index: initial.row_index,
            row_span: item.row_span,
        };
        self.session = Some(DragSession {
            gesture,
            item_id: id.clone(),
            initial,
            row_span: item.row_span,
            pixel_anchor,
            column_width,
            row_height,
            can_drag_on_x,
            can_drag_on_y: true,
        });
        self.active = Some(state.clone());
        self.active_gesture = Some(gesture);
        self.pixel_delta = Vec2::ZERO;
        self.events.push(DragEvent::Started(state));
        Ok(())
    }

    /// Report the pointer's total displacement since the gesture started.
    /// Ignored outside of a gesture.
    pub fn move_by(&mut self, delta: Vec2) {
        let Some(session) = &self.session else {
            return;
        };

        let restricted = Vec2::new(
            if session.can_drag_on_x { delta.x } else { 0.0 },
            if session.can_drag_on_y { delta.y } else { 0.0 },
        );
        let current = position::grid_of(
            session.pixel_anchor + restricted,
            session.column_width,
            session.row_height,
        );

        let state = ActiveDragState {
            id: session.item_id.clone(),
            column_index: current.column_index,
            row_index: current.row_index,
            row_span: session.row_span,
        };
        self.pixel_delta = restricted;
        if self.active.as_ref() != Some(&state) {
            self.events.push(DragEvent::Moved(state.clone()));
        }
        self.active = Some(state);
    }

    /// Finish the gesture and hand the batch to the sink.
    ///
    /// On a cancel the coordinator is back to Idle when this returns. On
    /// success the sink has been called once; the hover state stays visible
    /// until the returned commit is settled and passed to [`complete`].
    /// A new gesture may start in between; its state is not touched by the
    /// older completion.
    ///
    /// [`complete`]: Self::complete
    pub fn end(&mut self, model: &GridModel<T>) -> DragResult<InFlightCommit> {
        let Some(session) = self.session.take() else {
            return Err(DragError::NotDragging);
        };

        match self.plan(model, &session) {
            Ok((batch, moved_multiple)) => {
                log::debug!(
                    "Drag {} committing {} relocation(s)",
                    session.gesture,
                    batch.len()
                );
                let future = self.sink.commit(&batch);
                self.events.push(DragEvent::Committed {
                    gesture: session.gesture,
                    batch: batch.clone(),
                });
                let ticket = Rc::new(());
                self.pending = Some((session.gesture, Rc::downgrade(&ticket)));
                Ok(InFlightCommit {
                    gesture: session.gesture,
                    batch,
                    moved_multiple,
                    future,
                    ticket,
                })
            }
            Err(reason) => {
                log::debug!("Drag {} cancelled: {}", session.gesture, reason);
                self.events.push(DragEvent::Cancelled {
                    id: session.item_id.clone(),
                    reason: reason.clone(),
                });
                self.close(session.gesture);
                Err(reason)
            }
        }
    }

    /// Apply the outcome of a settled commit.
    ///
    /// Clears the selection after a multi-item move whatever the outcome and
    /// clears the hover state if no newer gesture has replaced it. A rejected
    /// batch is logged and returned; nothing is retried.
    pub fn complete(&mut self, settlement: Settlement) -> DragResult<Vec<Relocation>> {
        let Settlement {
            gesture,
            batch,
            moved_multiple,
            result,
            ..
        } = settlement;

        if let Err(err) = &result {
            log::warn!("Drag {} commit failed: {}", gesture, err);
        }
        self.events.push(DragEvent::Settled {
            gesture,
            rejected: result.as_ref().err().cloned(),
        });

        if moved_multiple {
            self.selection.clear();
            self.events.push(DragEvent::SelectionCleared);
        }
        self.close(gesture);

        result?;
        Ok(batch)
    }

    /// End the gesture and wait for the commit before returning.
    ///
    /// Holding `&mut self` across the commit keeps the next gesture from
    /// starting until this one settles.
    pub async fn end_and_settle(&mut self, model: &GridModel<T>) -> DragResult<Vec<Relocation>> {
        let in_flight = self.end(model)?;
        let settlement = in_flight.settle().await;
        self.complete(settlement)
    }

    /// Validate the drop and build the batch. Returns the batch and whether
    /// more than one item was moved.
    fn plan(
        &self,
        model: &GridModel<T>,
        session: &DragSession,
    ) -> DragResult<(Vec<Relocation>, bool)> {
        let active = self.active.as_ref().ok_or(DragError::NotDragging)?;
        let dropped_at = active.position();
        if !position::in_bounds(dropped_at, &model.columns, &model.rows) {
            return Err(DragError::OutOfBounds {
                column_index: dropped_at.column_index,
                row_index: dropped_at.row_index,
            });
        }

        let delta = position::delta(session.initial, dropped_at);
        if !position::has_movement(delta) {
            return Err(DragError::NoMovement);
        }

        let dragged = model
            .item(&session.item_id)
            .ok_or_else(|| DragError::ItemNotFound(session.item_id.clone()))?;

        let move_set: Vec<&Item<T>> = if self.selection.len() > 1 {
            self.selection
                .ids()
                .filter_map(|id| model.item(id))
                .collect()
        } else {
            vec![dragged]
        };
        let moved_multiple = move_set.len() > 1;

        let batch: Vec<Relocation> = move_set
            .into_iter()
            .filter_map(|item| relocate(model, item, delta))
            .collect();

        if batch.is_empty() {
            return Err(DragError::EmptyBatch);
        }
        Ok((batch, moved_multiple))
    }

    fn close(&mut self, gesture: GestureId) {
        if self.active_gesture != Some(gesture) {
            log::debug!("Drag {} settled after a newer gesture started", gesture);
            return;
        }
        if let Some(state) = self.active.take() {
            self.events.push(DragEvent::Ended { id: state.id });
        }
        self.active_gesture = None;
        self.pending = None;
        self.pixel_delta = Vec2::ZERO;
    }

    /// Whether the commit owning the hover state was dropped unsettled.
    fn is_abandoned(&self) -> bool {
        self.pending.as_ref().is_some_and(|(gesture, ticket)| {
            Some(*gesture) == self.active_gesture && ticket.strong_count() == 0
        })
    }

    fn reap_abandoned(&mut self) {
        if !self.is_abandoned() {
            return;
        }
        if let Some((gesture, _)) = self.pending.take() {
            log::warn!("Drag {} commit dropped before it settled", gesture);
            self.close(gesture);
        }
    }
}

/// Shift one item by `delta`, or `None` if it would leave the board.
fn relocate<T>(model: &GridModel<T>, item: &Item<T>, delta: GridDelta) -> Option<Relocation> {
    let column_index = model.column_index(&item.column_id)?;
    let current = GridPosition::new(column_index as i64, item.row_start as i64 - 1);
    let target = delta.apply(current);
    if !position::in_bounds(target, &model.columns, &model.rows) {
        return None;
    }
    Some(Relocation {
        id: item.id.clone(),
        new_column_id: model.columns[target.column_index as usize].id.clone(),
        new_row_id: model.rows[target.row_index as usize].id.clone(),
        row_span: item.row_span,
    })
}
