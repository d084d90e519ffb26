//! Board geometry configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Column width used when the host has not measured its columns yet.
pub const DEFAULT_COLUMN_WIDTH: f64 = 300.0;
/// Default row height in pixels.
pub const DEFAULT_ROW_HEIGHT: f64 = 50.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid {field}: {value}, must be a positive finite number")]
    InvalidDimension { field: &'static str, value: f64 },
}

/// Pixel geometry of the board's cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub column_width: f64,
    pub row_height: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            column_width: DEFAULT_COLUMN_WIDTH,
            row_height: DEFAULT_ROW_HEIGHT,
        }
    }
}

impl BoardConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject zero, negative or non-finite cell dimensions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dimensions = [
            ("column_width", self.column_width),
            ("row_height", self.row_height),
        ];
        for (field, value) in dimensions {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidDimension { field, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BoardConfig::default();
        assert_eq!(config.column_width, 300.0);
        assert_eq!(config.row_height, 50.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = BoardConfig::from_json(r#"{"row_height": 40}"#).unwrap();
        assert_eq!(config.row_height, 40.0);
        assert_eq!(config.column_width, DEFAULT_COLUMN_WIDTH);
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        let err = BoardConfig::from_json(r#"{"column_width": 0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDimension { field: "column_width", .. }
        ));
        assert!(BoardConfig::from_json(r#"{"row_height": -5}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"column_width": 120, "row_height": 30}}"#).unwrap();
        let config = BoardConfig::load(file.path()).unwrap();
        assert_eq!(config.column_width, 120.0);
        assert_eq!(config.row_height, 30.0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BoardConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
