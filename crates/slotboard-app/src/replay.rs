//! Plays a script against a board the way an interactive host would: the
//! board is owned here, batches committed by the coordinator are applied to it
//! and the updated snapshot is used for the next gesture.

use crate::script::{Gesture, Script};
use kurbo::{Rect, Size, Vec2};
use serde::Serialize;
use slotboard_core::position::pixel_of;
use slotboard_core::{
    BoardConfig, BoxFuture, CommitResult, CommitSink, DragCoordinator, DragError, GridModel,
    GridPosition, ItemId, LayoutDirective, Relocation, SelectedItem, layout_board,
};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

type Payload = serde_json::Value;

/// Sink that queues batches for the host to apply once the gesture completes.
#[derive(Clone, Default)]
pub struct QueueSink {
    pending: Rc<RefCell<Vec<Relocation>>>,
}

impl QueueSink {
    fn take(&self) -> Vec<Relocation> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }
}

impl CommitSink for QueueSink {
    fn commit(&self, batch: &[Relocation]) -> BoxFuture<'static, CommitResult> {
        self.pending.borrow_mut().extend_from_slice(batch);
        Box::pin(async { Ok(()) })
    }
}

/// Outcome of one scripted gesture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GestureReport {
    Committed { item: ItemId, batch: Vec<Relocation> },
    Cancelled { item: ItemId, reason: String },
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub gestures: Vec<GestureReport>,
    /// Layout of the board after the last gesture.
    pub layout: Vec<(ItemId, LayoutDirective)>,
    pub board: GridModel<Payload>,
}

/// Apply a committed batch to the host's board.
///
/// Relocations carry row ids; the 1-indexed `row_start` is recovered from the
/// row's position.
pub fn apply_batch(board: &mut GridModel<Payload>, batch: &[Relocation]) {
    for relocation in batch {
        let row_index = board
            .rows
            .iter()
            .position(|row| row.id == relocation.new_row_id);
        let Some(row_index) = row_index else {
            log::warn!(
                "Unknown row {} in batch, skipping {}",
                relocation.new_row_id,
                relocation.id
            );
            continue;
        };
        if let Some(item) = board.items.iter_mut().find(|item| item.id == relocation.id) {
            item.column_id = relocation.new_column_id.clone();
            item.row_start = row_index as u32 + 1;
            item.row_span = relocation.row_span;
        }
    }
}

/// Bounds of an item's cell range, used as its selection snapshot.
fn item_bounds(board: &GridModel<Payload>, id: &ItemId, config: &BoardConfig) -> Option<Rect> {
    let item = board.item(id)?;
    let column_index = board.column_index(&item.column_id)?;
    let origin = pixel_of(
        GridPosition::new(column_index as i64, item.row_start as i64 - 1),
        config.column_width,
        config.row_height,
    );
    Some(Rect::from_origin_size(
        origin,
        Size::new(config.column_width, item.row_span as f64 * config.row_height),
    ))
}

/// Run every gesture of the script.
pub async fn replay(script: Script) -> ReplayReport {
    let Script {
        config,
        mut board,
        selection,
        locked_x,
        gestures,
    } = script;

    let sink = QueueSink::default();
    let locked: HashSet<ItemId> = locked_x.into_iter().collect();
    let mut coordinator: DragCoordinator<Payload, QueueSink> = DragCoordinator::new(sink.clone())
        .with_axis_policy(move |id: &ItemId| !locked.contains(id));

    for id in &selection {
        let (Some(bounds), Some(item)) = (item_bounds(&board, id, &config), board.item(id)) else {
            log::warn!("Selected item {} is not on the board", id);
            continue;
        };
        coordinator
            .selection_mut()
            .add(SelectedItem::new(id.clone(), bounds, item.payload.clone()));
    }

    let mut reports = Vec::with_capacity(gestures.len());
    for gesture in &gestures {
        let report = play(&mut coordinator, &board, &config, gesture).await;
        apply_batch(&mut board, &sink.take());
        for event in coordinator.poll_events() {
            log::trace!("{:?}", event);
        }
        reports.push(report);
    }

    let layout = layout_board(&board, &config);
    ReplayReport {
        gestures: reports,
        layout,
        board,
    }
}

async fn play(
    coordinator: &mut DragCoordinator<Payload, QueueSink>,
    board: &GridModel<Payload>,
    config: &BoardConfig,
    gesture: &Gesture,
) -> GestureReport {
    let cancelled = |reason: DragError| GestureReport::Cancelled {
        item: gesture.item.clone(),
        reason: reason.to_string(),
    };

    let started = coordinator.start(
        board,
        &gesture.item,
        config.column_width,
        config.row_height,
    );
    if let Err(reason) = started {
        return cancelled(reason);
    }
    for &(dx, dy) in &gesture.moves {
        coordinator.move_by(Vec2::new(dx, dy));
    }

    match coordinator.end_and_settle(board).await {
        Ok(batch) => {
            log::info!("{} moved {} item(s)", gesture.item, batch.len());
            GestureReport::Committed {
                item: gesture.item.clone(),
                batch,
            }
        }
        Err(reason) => {
            log::info!("{} not moved: {}", gesture.item, reason);
            cancelled(reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"{
        "config": {"column_width": 100, "row_height": 50},
        "board": {
            "columns": [{"id": "A", "label": "A"}, {"id": "B", "label": "B"}, {"id": "C", "label": "C"}],
            "rows": [
                {"id": "r1", "label": "1"}, {"id": "r2", "label": "2"}, {"id": "r3", "label": "3"},
                {"id": "r4", "label": "4"}, {"id": "r5", "label": "5"}, {"id": "r6", "label": "6"}
            ],
            "items": [
                {"id": "x", "column_id": "A", "row_start": 2, "row_span": 1, "payload": null},
                {"id": "y", "column_id": "B", "row_start": 6, "row_span": 1, "payload": null}
            ]
        },
        "gestures": [
            {"item": "x", "moves": [[100, 0], [220, 0]]},
            {"item": "x", "moves": [[10, 10]]},
            {"item": "missing"}
        ]
    }"#;

    #[test]
    fn test_replay_applies_committed_batches() {
        let script = Script::from_json(SCRIPT).unwrap();
        let report = pollster::block_on(replay(script));

        assert_eq!(report.gestures.len(), 3);
        assert!(matches!(
            &report.gestures[0],
            GestureReport::Committed { batch, .. } if batch[0].new_column_id.as_str() == "C"
        ));
        assert!(matches!(&report.gestures[1], GestureReport::Cancelled { .. }));
        assert!(matches!(&report.gestures[2], GestureReport::Cancelled { .. }));

        let x = report.board.item(&ItemId::new("x")).unwrap();
        assert_eq!(x.column_id.as_str(), "C");
        assert_eq!(x.row_start, 2);
        assert_eq!(report.layout.len(), 2);
    }

    #[test]
    fn test_replay_multi_selection_partial_commit() {
        let mut script = Script::from_json(SCRIPT).unwrap();
        script.selection = vec![ItemId::new("x"), ItemId::new("y")];
        script.gestures = vec![Gesture {
            item: ItemId::new("x"),
            moves: vec![(0.0, 50.0)],
        }];

        let report = pollster::block_on(replay(script));
        let GestureReport::Committed { batch, .. } = &report.gestures[0] else {
            panic!("expected a commit");
        };
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].new_row_id.as_str(), "r3");
        assert_eq!(report.board.item(&ItemId::new("y")).unwrap().row_start, 6);
    }

    #[test]
    fn test_locked_items_move_vertically_only() {
        let mut script = Script::from_json(SCRIPT).unwrap();
        script.locked_x = vec![ItemId::new("x")];
        script.gestures = vec![Gesture {
            item: ItemId::new("x"),
            moves: vec![(200.0, 100.0)],
        }];

        let report = pollster::block_on(replay(script));
        let x = report.board.item(&ItemId::new("x")).unwrap();
        assert_eq!(x.column_id.as_str(), "A");
        assert_eq!(x.row_start, 4);
    }

    #[test]
    fn test_apply_batch_skips_unknown_rows() {
        let mut board = Script::from_json(SCRIPT).unwrap().board;
        let batch = vec![Relocation {
            id: ItemId::new("x"),
            new_column_id: "B".into(),
            new_row_id: "r99".into(),
            row_span: 1,
        }];
        apply_batch(&mut board, &batch);
        assert_eq!(board.item(&ItemId::new("x")).unwrap().column_id.as_str(), "A");
    }
}
