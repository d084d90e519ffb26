//! Pixel <-> grid coordinate transforms.
//!
//! Everything here is pure. Grid positions are 0-indexed and signed: a pointer
//! dragged above or left of the board maps to negative indices, and bounds are
//! only checked by [`in_bounds`].

use crate::model::{Column, Row};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A 0-indexed logical cell address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPosition {
    pub column_index: i64,
    pub row_index: i64,
}

impl GridPosition {
    pub fn new(column_index: i64, row_index: i64) -> Self {
        Self {
            column_index,
            row_index,
        }
    }
}

/// Difference between two grid positions, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridDelta {
    pub columns: i64,
    pub rows: i64,
}

impl GridDelta {
    pub const ZERO: GridDelta = GridDelta { columns: 0, rows: 0 };

    /// Apply the delta to a position.
    pub fn apply(self, position: GridPosition) -> GridPosition {
        GridPosition::new(
            position.column_index + self.columns,
            position.row_index + self.rows,
        )
    }
}

/// Top-left pixel of a cell.
pub fn pixel_of(position: GridPosition, column_width: f64, row_height: f64) -> Point {
    Point::new(
        position.column_index as f64 * column_width,
        position.row_index as f64 * row_height,
    )
}

/// Cell containing a pixel. Floors toward negative infinity.
pub fn grid_of(point: Point, column_width: f64, row_height: f64) -> GridPosition {
    GridPosition::new(
        (point.x / column_width).floor() as i64,
        (point.y / row_height).floor() as i64,
    )
}

/// Cell delta going from `from` to `to`.
pub fn delta(from: GridPosition, to: GridPosition) -> GridDelta {
    GridDelta {
        columns: to.column_index - from.column_index,
        rows: to.row_index - from.row_index,
    }
}

/// Check that a position addresses an existing cell.
/// Always false when the board has no columns or no rows.
pub fn in_bounds(position: GridPosition, columns: &[Column], rows: &[Row]) -> bool {
    position.column_index >= 0
        && (position.column_index as u64) < columns.len() as u64
        && position.row_index >= 0
        && (position.row_index as u64) < rows.len() as u64
}

pub fn has_movement(delta: GridDelta) -> bool {
    delta.columns != 0 || delta.rows != 0
}

/// Offset of `target`'s top-left corner relative to `base`'s.
///
/// Used to stack selection overlays relative to the item being dragged.
pub fn relative_position(target: Rect, base: Rect) -> Vec2 {
    Vec2::new(target.x0 - base.x0, target.y0 - base.y0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(n: usize) -> Vec<Column> {
        (0..n)
            .map(|i| Column::new(format!("c{i}"), format!("Column {i}")))
            .collect()
    }

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| Row::new(format!("r{i}"), format!("Row {i}")))
            .collect()
    }

    #[test]
    fn test_pixel_of() {
        assert_eq!(pixel_of(GridPosition::new(0, 0), 100.0, 50.0), Point::ZERO);
        assert_eq!(
            pixel_of(GridPosition::new(3, 5), 100.0, 50.0),
            Point::new(300.0, 250.0)
        );
        assert_eq!(
            pixel_of(GridPosition::new(2, 4), 75.0, 40.0),
            Point::new(150.0, 160.0)
        );
    }

    #[test]
    fn test_pixel_of_zero_dimensions() {
        assert_eq!(pixel_of(GridPosition::new(5, 3), 0.0, 0.0), Point::ZERO);
    }

    #[test]
    fn test_grid_of_floors() {
        assert_eq!(
            grid_of(Point::new(350.0, 275.0), 100.0, 50.0),
            GridPosition::new(3, 5)
        );
        assert_eq!(
            grid_of(Point::new(149.0, 99.0), 100.0, 50.0),
            GridPosition::new(1, 1)
        );
        assert_eq!(
            grid_of(Point::new(200.0, 100.0), 100.0, 50.0),
            GridPosition::new(2, 2)
        );
    }

    #[test]
    fn test_grid_of_negative_pixels() {
        assert_eq!(
            grid_of(Point::new(-50.0, -25.0), 100.0, 50.0),
            GridPosition::new(-1, -1)
        );
        assert_eq!(
            grid_of(Point::new(-150.0, -1.0), 100.0, 50.0),
            GridPosition::new(-2, -1)
        );
    }

    #[test]
    fn test_grid_of_inverts_pixel_of() {
        for (w, h) in [(100.0, 50.0), (75.0, 40.0), (300.0, 48.0), (64.0, 24.0)] {
            for c in 0..12 {
                for r in 0..30 {
                    let position = GridPosition::new(c, r);
                    assert_eq!(grid_of(pixel_of(position, w, h), w, h), position);
                }
            }
        }
    }

    #[test]
    fn test_delta() {
        let a = GridPosition::new(2, 3);
        assert_eq!(delta(a, a), GridDelta::ZERO);
        assert_eq!(
            delta(GridPosition::new(1, 2), GridPosition::new(4, 5)),
            GridDelta { columns: 3, rows: 3 }
        );
        assert_eq!(
            delta(GridPosition::new(5, 4), GridPosition::new(2, 1)),
            GridDelta { columns: -3, rows: -3 }
        );
        let d = delta(GridPosition::new(1, 6), GridPosition::new(3, 2));
        assert_eq!(d.apply(GridPosition::new(1, 6)), GridPosition::new(3, 2));
    }

    #[test]
    fn test_in_bounds() {
        let cols = columns(3);
        let rws = rows(6);
        assert!(in_bounds(GridPosition::new(0, 0), &cols, &rws));
        assert!(in_bounds(GridPosition::new(2, 5), &cols, &rws));
        assert!(!in_bounds(GridPosition::new(3, 0), &cols, &rws));
        assert!(!in_bounds(GridPosition::new(0, 6), &cols, &rws));
        assert!(!in_bounds(GridPosition::new(-1, 0), &cols, &rws));
        assert!(!in_bounds(GridPosition::new(0, -1), &cols, &rws));
    }

    #[test]
    fn test_in_bounds_empty_board() {
        assert!(!in_bounds(GridPosition::new(0, 0), &[], &rows(4)));
        assert!(!in_bounds(GridPosition::new(0, 0), &columns(4), &[]));
        assert!(!in_bounds(GridPosition::new(0, 0), &[], &[]));
    }

    #[test]
    fn test_has_movement() {
        assert!(!has_movement(GridDelta::ZERO));
        assert!(has_movement(GridDelta { columns: 1, rows: 0 }));
        assert!(has_movement(GridDelta { columns: 0, rows: -1 }));
        assert!(has_movement(GridDelta { columns: -2, rows: 3 }));
    }

    #[test]
    fn test_relative_position() {
        let base = Rect::new(100.0, 40.0, 200.0, 90.0);
        let target = Rect::new(130.0, 20.0, 230.0, 70.0);
        assert_eq!(relative_position(target, base), Vec2::new(30.0, -20.0));
        assert_eq!(relative_position(base, base), Vec2::ZERO);
    }
}
