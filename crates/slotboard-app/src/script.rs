//! Replay scripts: a board, an optional selection and the gestures to play.

use serde::Deserialize;
use slotboard_core::{BoardConfig, ConfigError, GridModel, ItemId, ModelError};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or running a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// One scripted drag gesture.
#[derive(Debug, Clone, Deserialize)]
pub struct Gesture {
    /// Item under the pointer when the gesture starts.
    pub item: ItemId,
    /// Successive pointer displacements since the gesture started, in pixels.
    #[serde(default)]
    pub moves: Vec<(f64, f64)>,
}

/// A full replay script.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub config: BoardConfig,
    pub board: GridModel<serde_json::Value>,
    /// Items selected before the first gesture.
    #[serde(default)]
    pub selection: Vec<ItemId>,
    /// Items that may only be dragged vertically.
    #[serde(default)]
    pub locked_x: Vec<ItemId>,
    #[serde(default)]
    pub gestures: Vec<Gesture>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        let script: Self = serde_json::from_str(json)?;
        script.config.validate()?;
        script.board.validate()?;
        Ok(script)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCRIPT: &str = r#"{
        "config": {"column_width": 100, "row_height": 50},
        "board": {
            "columns": [{"id": "A", "label": "Room A"}, {"id": "B", "label": "Room B"}],
            "rows": [{"id": "r1", "label": "08:00"}, {"id": "r2", "label": "09:00"}],
            "items": [{"id": "x", "column_id": "A", "row_start": 1, "row_span": 1, "payload": {"title": "Standup"}}]
        },
        "locked_x": ["x"],
        "gestures": [{"item": "x", "moves": [[10, 0], [10, 50]]}]
    }"#;

    #[test]
    fn test_parse_script() {
        let script = Script::from_json(SCRIPT).unwrap();
        assert_eq!(script.config.column_width, 100.0);
        assert_eq!(script.board.items.len(), 1);
        assert!(script.selection.is_empty());
        assert_eq!(script.locked_x, vec![ItemId::new("x")]);
        assert_eq!(script.gestures[0].moves, vec![(10.0, 0.0), (10.0, 50.0)]);
    }

    #[test]
    fn test_rejects_invalid_board() {
        let json = SCRIPT.replace(r#""row_span": 1"#, r#""row_span": 0"#);
        let err = Script::from_json(&json).unwrap_err();
        assert!(matches!(err, ScriptError::Model(ModelError::InvalidRowSpan { .. })));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let json = SCRIPT.replace(r#""row_height": 50"#, r#""row_height": 0"#);
        assert!(matches!(
            Script::from_json(&json).unwrap_err(),
            ScriptError::Config(_)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCRIPT.as_bytes()).unwrap();
        let script = Script::load(file.path()).unwrap();
        assert_eq!(script.gestures.len(), 1);
    }
}
