//! Slotboard Application
//!
//! A command-line host for the slotboard core: loads a board with a script of
//! drag gestures, replays them and reports the commits and the final layout.

mod replay;
mod script;

pub use replay::{GestureReport, QueueSink, ReplayReport, apply_batch, replay};
pub use script::{Gesture, Script, ScriptError};
