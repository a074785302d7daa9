//! Renderer-agnostic geometry for list and grid presentation.
//!
//! Everything here is a pure function of its inputs so the UI can call it
//! every frame and tests can compare results directly.

use crate::fs::entries::{EntryCollection, ViewMode};

/// Row/column assignment for a listing of `item_count` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub mode: ViewMode,
    pub columns: usize,
    pub row_count: usize,
    pub item_count: usize,
}

/// Selection movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Geometry for `collection` in its own view mode.
pub fn project(collection: &EntryCollection, available_width: usize, item_width: usize) -> Projection {
    project_count(
        collection.len(),
        collection.view_mode(),
        available_width,
        item_width,
    )
}

/// Geometry for `item_count` entries.
///
/// Grid: as many fixed-width columns as fit, at least one. List: one column.
pub fn project_count(
    item_count: usize,
    mode: ViewMode,
    available_width: usize,
    item_width: usize,
) -> Projection {
    let columns = match mode {
        ViewMode::List => 1,
        ViewMode::Grid => (available_width / item_width.max(1)).max(1),
    };
    Projection {
        mode,
        columns,
        row_count: item_count.div_ceil(columns),
        item_count,
    }
}

impl Projection {
    /// `(row, column)` of the entry at `index`.
    pub fn cell_of(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.item_count {
            return None;
        }
        Some((index / self.columns, index % self.columns))
    }

    /// Entry index at `(row, column)`, if a cell there holds one.
    pub fn index_at(&self, row: usize, column: usize) -> Option<usize> {
        if column >= self.columns {
            return None;
        }
        let index = row * self.columns + column;
        (index < self.item_count).then_some(index)
    }

    /// Index reached by moving one step from `index`. Stays put at edges.
    pub fn move_by(&self, index: usize, direction: Direction) -> usize {
        let Some((row, column)) = self.cell_of(index) else {
            return index;
        };
        match direction {
            Direction::Up if row > 0 => index - self.columns,
            Direction::Down if row + 1 < self.row_count => {
                (index + self.columns).min(self.item_count - 1)
            }
            Direction::Left if column > 0 => index - 1,
            Direction::Right if column + 1 < self.columns && index + 1 < self.item_count => {
                index + 1
            }
            _ => index,
        }
    }
}

/// Scroll offset (in rows) that keeps `row` inside a window of `visible_rows`.
pub fn scroll_to_show(row: usize, scroll_offset: usize, visible_rows: usize) -> usize {
    if visible_rows == 0 {
        return scroll_offset;
    }
    if row < scroll_offset {
        row
    } else if row >= scroll_offset + visible_rows {
        row + 1 - visible_rows
    } else {
        scroll_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_projection_fits_columns() {
        let p = project_count(21, ViewMode::Grid, 650, 200);
        assert_eq!(p.columns, 3);
        assert_eq!(p.row_count, 7);
    }

    #[test]
    fn list_projection_is_one_column() {
        let p = project_count(21, ViewMode::List, 650, 200);
        assert_eq!(p.columns, 1);
        assert_eq!(p.row_count, 21);
    }

    #[test]
    fn narrow_grid_keeps_one_column() {
        let p = project_count(5, ViewMode::Grid, 50, 200);
        assert_eq!(p.columns, 1);
        assert_eq!(p.row_count, 5);
    }

    #[test]
    fn zero_item_width_does_not_divide_by_zero() {
        let p = project_count(4, ViewMode::Grid, 10, 0);
        assert_eq!(p.columns, 10);
        assert_eq!(p.row_count, 1);
    }

    #[test]
    fn empty_listing_has_no_rows() {
        let p = project_count(0, ViewMode::Grid, 650, 200);
        assert_eq!(p.row_count, 0);
        assert_eq!(p.cell_of(0), None);
    }

    #[test]
    fn projection_is_deterministic() {
        let a = project_count(13, ViewMode::Grid, 81, 20);
        let b = project_count(13, ViewMode::Grid, 81, 20);
        assert_eq!(a, b);
    }

    #[test]
    fn project_uses_collection_mode() {
        let c = EntryCollection::new("/tmp".into(), Vec::new())
            .with_view_mode(ViewMode::Grid)
            .prepare();
        let p = project(&c, 100, 20);
        assert_eq!(p.mode, ViewMode::Grid);
        assert_eq!(p.item_count, 2);
        assert_eq!(p.columns, 5);
        assert_eq!(p.row_count, 1);
    }

    #[test]
    fn cell_and_index_agree() {
        let p = project_count(7, ViewMode::Grid, 60, 20);
        assert_eq!(p.cell_of(4), Some((1, 1)));
        assert_eq!(p.index_at(1, 1), Some(4));
        assert_eq!(p.index_at(2, 1), None);
        assert_eq!(p.index_at(0, 3), None);
    }

    #[test]
    fn grid_movement() {
        // 3 columns, 7 items: rows [0 1 2] [3 4 5] [6]
        let p = project_count(7, ViewMode::Grid, 60, 20);
        assert_eq!(p.move_by(4, Direction::Up), 1);
        assert_eq!(p.move_by(1, Direction::Up), 1);
        assert_eq!(p.move_by(1, Direction::Down), 4);
        assert_eq!(p.move_by(5, Direction::Down), 6);
        assert_eq!(p.move_by(6, Direction::Down), 6);
        assert_eq!(p.move_by(3, Direction::Left), 3);
        assert_eq!(p.move_by(4, Direction::Left), 3);
        assert_eq!(p.move_by(5, Direction::Right), 5);
        assert_eq!(p.move_by(6, Direction::Right), 6);
    }

    #[test]
    fn list_movement_ignores_horizontal() {
        let p = project_count(3, ViewMode::List, 80, 20);
        assert_eq!(p.move_by(1, Direction::Left), 1);
        assert_eq!(p.move_by(1, Direction::Right), 1);
        assert_eq!(p.move_by(1, Direction::Down), 2);
        assert_eq!(p.move_by(2, Direction::Down), 2);
    }

    #[test]
    fn scroll_follows_row() {
        assert_eq!(scroll_to_show(0, 5, 10), 0);
        assert_eq!(scroll_to_show(12, 0, 10), 3);
        assert_eq!(scroll_to_show(4, 2, 10), 2);
        assert_eq!(scroll_to_show(4, 2, 0), 2);
    }
}
