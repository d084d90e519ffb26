//! Commit batches and the host's asynchronous commit sink.

use crate::model::{ColumnId, ItemId, RowId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use thiserror::Error;

/// Boxed future for commits. Single-threaded, so no `Send` bound.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Error returned by a commit sink that refused or failed to apply a batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Commit rejected: {0}")]
pub struct CommitError(pub String);

impl CommitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Result type for commits.
pub type CommitResult = Result<(), CommitError>;

/// One item relocation of a commit batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    pub id: ItemId,
    pub new_column_id: ColumnId,
    pub new_row_id: RowId,
    /// Unchanged by a move.
    pub row_span: u32,
}

/// Receiver of relocation batches, implemented by the host owning the items.
///
/// Called at most once per gesture and only with a non-empty batch. The host
/// applies the batch and feeds a fresh model snapshot back to the core.
pub trait CommitSink {
    fn commit(&self, batch: &[Relocation]) -> BoxFuture<'static, CommitResult>;
}

impl<F> CommitSink for F
where
    F: Fn(&[Relocation]) -> BoxFuture<'static, CommitResult>,
{
    fn commit(&self, batch: &[Relocation]) -> BoxFuture<'static, CommitResult> {
        self(batch)
    }
}

/// Identifier of one drag gesture, unique per coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GestureId(pub(crate) u64);

impl fmt::Display for GestureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A batch handed to the sink whose future has not settled yet.
///
/// Obtained from [`DragCoordinator::end`](crate::DragCoordinator::end). Await
/// [`settle`](Self::settle) and pass the result back to
/// [`DragCoordinator::complete`](crate::DragCoordinator::complete) to finish
/// the gesture.
///
/// Dropping the handle, or the [`Settlement`] built from it, before
/// `complete` abandons the commit: the sink's future is never polled and the
/// coordinator stops reporting the gesture's hover state.
#[must_use = "the gesture is abandoned unless the commit is settled and completed"]
pub struct InFlightCommit {
    pub(crate) gesture: GestureId,
    pub(crate) batch: Vec<Relocation>,
    pub(crate) moved_multiple: bool,
    pub(crate) future: BoxFuture<'static, CommitResult>,
    /// Held until `complete`; the coordinator watches it through a `Weak`.
    pub(crate) ticket: Rc<()>,
}

impl InFlightCommit {
    pub fn gesture(&self) -> GestureId {
        self.gesture
    }

    pub fn batch(&self) -> &[Relocation] {
        &self.batch
    }

    /// Whether the gesture moved a multi-item selection.
    pub fn moved_multiple(&self) -> bool {
        self.moved_multiple
    }

    /// Wait for the sink to resolve or reject the batch.
    pub async fn settle(self) -> Settlement {
        let result = self.future.await;
        Settlement {
            gesture: self.gesture,
            batch: self.batch,
            moved_multiple: self.moved_multiple,
            result,
            ticket: self.ticket,
        }
    }
}

impl fmt::Debug for InFlightCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFlightCommit")
            .field("gesture", &self.gesture)
            .field("batch", &self.batch)
            .field("moved_multiple", &self.moved_multiple)
            .finish_non_exhaustive()
    }
}

/// Outcome of an in-flight commit.
#[must_use = "pass the settlement to DragCoordinator::complete to finish the gesture"]
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub gesture: GestureId,
    pub batch: Vec<Relocation>,
    pub moved_multiple: bool,
    pub result: CommitResult,
    pub(crate) ticket: Rc<()>,
}
