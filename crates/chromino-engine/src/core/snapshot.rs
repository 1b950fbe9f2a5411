use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SnapshotError;

use super::tile::{Cell, TilePos};

/// An immutable capture of the board at one instant.
///
/// The grid is `width` x `height` cells with the origin at the bottom-left
/// corner, stored row-major from the bottom row up. A snapshot also carries
/// the derived list of active (falling) tiles; in gameplay the falling piece
/// is a tromino of at most three tiles, but the model itself does not cap
/// the list.
///
/// Snapshots are never mutated: every transformation (`slide_left`,
/// `slide_right`, `fall_once`, `fall_to_bottom`, `rotate`) produces a new
/// snapshot. Illegal moves are `None`, not errors - "no legal move" is an
/// expected outcome, not an exceptional one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) cells: Vec<Cell>,
    pub(crate) active: Vec<TilePos>,
}

/// Horizontal slide direction. Internal; the public surface is
/// [`BoardSnapshot::slide_left`] and [`BoardSnapshot::slide_right`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlideDir {
    Left,
    Right,
}

impl SlideDir {
    /// Destination of a tile at `x`, or `None` at the boundary column.
    fn dest(self, x: usize, width: usize) -> Option<usize> {
        match self {
            SlideDir::Left => x.checked_sub(1),
            SlideDir::Right => (x + 1 < width).then_some(x + 1),
        }
    }

    /// Column a tile would arrive from, or `None` at the boundary.
    fn source(self, x: usize, width: usize) -> Option<usize> {
        match self {
            SlideDir::Left => (x + 1 < width).then_some(x + 1),
            SlideDir::Right => x.checked_sub(1),
        }
    }
}

impl BoardSnapshot {
    /// Captures a snapshot from a per-cell dump of the live board.
    ///
    /// `cells` is row-major from the bottom row up. This is the single
    /// validation point for the cell invariants (exactly one pivot at most,
    /// pivot implies active, grounded excludes active); the active tile list
    /// is derived here by scanning the grid.
    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self, SnapshotError> {
        let expected = width * height;
        if cells.len() != expected {
            return Err(SnapshotError::CellCount {
                width,
                height,
                expected,
                found: cells.len(),
            });
        }

        let mut pivot_seen = false;
        for (i, cell) in cells.iter().enumerate() {
            let (x, y) = (i % width, i / width);
            if cell.pivot {
                if pivot_seen {
                    return Err(SnapshotError::MultiplePivots);
                }
                pivot_seen = true;
                if !cell.active {
                    return Err(SnapshotError::InactivePivot { x, y });
                }
            }
            if cell.grounded && cell.active {
                return Err(SnapshotError::GroundedActive { x, y });
            }
        }

        let mut snapshot = Self {
            width,
            height,
            cells,
            active: Vec::new(),
        };
        snapshot.active = snapshot.find_active_tiles();
        Ok(snapshot)
    }

    /// An all-empty board of the given dimensions.
    #[must_use]
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; width * height],
            active: Vec::new(),
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The derived active tile list, bottom row first.
    #[must_use]
    pub fn active(&self) -> &[TilePos] {
        &self.active
    }

    /// Consumes the snapshot, returning the raw cell buffer (row-major from
    /// the bottom row up). Counterpart of [`BoardSnapshot::from_cells`] for
    /// callers that apply a chosen transformation back to a live board.
    #[must_use]
    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    pub(crate) fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    #[must_use]
    pub fn cell_at(&self, x: usize, y: usize) -> Cell {
        self.cells[self.index(x, y)]
    }

    #[must_use]
    pub fn cell(&self, pos: TilePos) -> Cell {
        self.cell_at(pos.x, pos.y)
    }

    /// The position `(dx, dy)` away from `pos`, or `None` when it falls
    /// outside the board.
    #[must_use]
    pub fn offset(&self, pos: TilePos, dx: i32, dy: i32) -> Option<TilePos> {
        let x = pos.x.checked_add_signed(dx as isize)?;
        let y = pos.y.checked_add_signed(dy as isize)?;
        (x < self.width && y < self.height).then_some(TilePos::new(x, y))
    }

    /// Scans the grid for active-flagged cells, bottom row first.
    #[must_use]
    pub fn find_active_tiles(&self) -> Vec<TilePos> {
        let mut tiles = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.cell_at(x, y).active {
                    tiles.push(TilePos::new(x, y));
                }
            }
        }
        tiles
    }

    /// Slides the falling piece one column to the left.
    ///
    /// Illegal (`None`) when there is no falling piece, any active tile is at
    /// the boundary column, or the destination cell holds a non-active tile.
    #[must_use]
    pub fn slide_left(&self) -> Option<Self> {
        self.slide(SlideDir::Left)
    }

    /// Mirror of [`BoardSnapshot::slide_left`].
    #[must_use]
    pub fn slide_right(&self) -> Option<Self> {
        self.slide(SlideDir::Right)
    }

    fn slide(&self, dir: SlideDir) -> Option<Self> {
        if self.active.is_empty() {
            return None;
        }
        for &pos in &self.active {
            let dest = dir.dest(pos.x, self.width)?;
            let neighbor = self.cell_at(dest, pos.y);
            if !neighbor.is_empty() && !neighbor.active {
                return None;
            }
        }

        // Legal: every active-flagged cell moves one column, vacated cells
        // become empty. Movement goes by the board flags, not the list, so
        // flagged cells missing from the list still travel.
        let mut cells = Vec::with_capacity(self.cells.len());
        let mut active = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let incoming = dir
                    .source(x, self.width)
                    .map(|sx| self.cell_at(sx, y))
                    .filter(|c| c.active);
                let cell = match incoming {
                    Some(moved) => {
                        active.push(TilePos::new(x, y));
                        moved
                    }
                    None if self.cell_at(x, y).active => Cell::EMPTY,
                    None => self.cell_at(x, y),
                };
                cells.push(cell);
            }
        }

        Some(Self {
            width: self.width,
            height: self.height,
            cells,
            active,
        })
    }

    /// One discrete gravity step.
    ///
    /// Bottom-up scan: an occupied cell at row 0, or directly above a
    /// grounded cell, becomes grounded; a non-grounded occupied cell above an
    /// empty cell drops one row. Total - gravity always "succeeds". The
    /// result carries no active list: for tree purposes a fall ends the
    /// piece's turn.
    #[must_use]
    pub fn fall_once(&self) -> Self {
        let mut cells = self.cells.clone();
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = self.index(x, y);
                if cells[idx].is_empty() {
                    continue;
                }
                if y == 0 || cells[self.index(x, y - 1)].grounded {
                    cells[idx].grounded = true;
                } else if cells[self.index(x, y - 1)].is_empty() {
                    let below = self.index(x, y - 1);
                    cells[below] = Cell {
                        grounded: false,
                        ..cells[idx]
                    };
                    cells[idx] = Cell::EMPTY;
                }
            }
        }
        Self {
            width: self.width,
            height: self.height,
            cells,
            active: Vec::new(),
        }
    }

    /// Drops every loose tile to its final resting place.
    ///
    /// Each column is compacted by sliding non-grounded occupied cells down
    /// into the lowest contiguous empty run. If any column holds a
    /// non-grounded occupied cell with no empty run beneath it (row 0
    /// included), the terrain is irregular and the whole operation falls back
    /// to a single [`BoardSnapshot::fall_once`] of the original snapshot.
    ///
    /// Landed tiles become grounded ordinary board tiles; the result's active
    /// list is always empty. Idempotent: compacting a compacted board is a
    /// no-op.
    #[must_use]
    pub fn fall_to_bottom(&self) -> Self {
        let mut cells = self.cells.clone();
        for x in 0..self.width {
            let mut empty_slot: Option<usize> = None;
            for y in 0..self.height {
                let idx = self.index(x, y);
                if cells[idx].is_empty() {
                    if empty_slot.is_none() {
                        empty_slot = Some(y);
                    }
                } else if !cells[idx].grounded {
                    let Some(slot) = empty_slot.filter(|_| y > 0) else {
                        return self.fall_once();
                    };
                    cells[self.index(x, slot)] = Cell::settled(cells[idx].color);
                    cells[idx] = Cell::EMPTY;
                    empty_slot = Some(slot + 1);
                }
            }
        }
        Self {
            width: self.width,
            height: self.height,
            cells,
            active: Vec::new(),
        }
    }
}

impl fmt::Display for BoardSnapshot {
    /// Renders the board top row first, one color character per cell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                write!(f, "{}", self.cell_at(x, y).color.as_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TileColor;

    /// The 8x8 cross fixture: column x=2 fully active red, row y=2 active
    /// red for x=3..=7.
    fn cross_board() -> BoardSnapshot {
        let mut cells = vec![Cell::EMPTY; 64];
        for y in 0..8 {
            cells[y * 8 + 2] = Cell::falling(TileColor::Red);
        }
        for x in 3..8 {
            cells[2 * 8 + x] = Cell::falling(TileColor::Red);
        }
        BoardSnapshot::from_cells(8, 8, cells).unwrap()
    }

    #[test]
    fn test_find_active_tiles_cross() {
        let board = cross_board();
        let active = board.find_active_tiles();
        assert_eq!(active.len(), 13);
        for pos in &active {
            assert!(pos.x == 2 || pos.y == 2, "unexpected active tile {pos:?}");
        }
        assert_eq!(board.active(), &active[..]);
    }

    #[test]
    fn test_slide_left_shifts_every_active_cell() {
        let board = cross_board();
        let slid = board.slide_left().unwrap();

        for (before, after) in board.active().iter().zip(slid.active()) {
            assert_eq!(after.x + 1, before.x);
            assert_eq!(after.y, before.y);
        }
        for y in 0..8 {
            for x in 0..8 {
                let expected = if x == 1 || (y == 2 && (1..7).contains(&x)) {
                    Cell::falling(TileColor::Red)
                } else {
                    Cell::EMPTY
                };
                assert_eq!(slid.cell_at(x, y), expected, "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_slide_left_blocked_at_wall() {
        let board = cross_board();
        let once = board.slide_left().unwrap();
        let twice = once.slide_left().unwrap();

        // The long arm now spans x=0..=5 with the column at x=0.
        for y in 0..8 {
            assert_eq!(twice.cell_at(0, y), Cell::falling(TileColor::Red));
        }
        assert!(twice.slide_left().is_none());
    }

    #[test]
    fn test_slide_right_blocked_at_wall() {
        let mut cells = vec![Cell::EMPTY; 64];
        for y in 0..8 {
            cells[y * 8 + 5] = Cell::falling(TileColor::Red);
        }
        for x in 0..5 {
            cells[2 * 8 + x] = Cell::falling(TileColor::Red);
        }
        let board = BoardSnapshot::from_cells(8, 8, cells).unwrap();

        let once = board.slide_right().unwrap();
        assert_eq!(once.cell_at(6, 0), Cell::falling(TileColor::Red));
        let twice = once.slide_right().unwrap();
        for y in 0..8 {
            assert_eq!(twice.cell_at(7, y), Cell::falling(TileColor::Red));
        }
        assert!(twice.slide_right().is_none());
    }

    #[test]
    fn test_slide_blocked_by_settled_tile() {
        let mut cells = vec![Cell::EMPTY; 16];
        cells[1] = Cell::settled(TileColor::Blue);
        cells[2] = Cell::falling(TileColor::Red);
        let board = BoardSnapshot::from_cells(4, 4, cells).unwrap();

        assert!(board.slide_left().is_none());
        assert!(board.slide_right().is_some());
    }

    #[test]
    fn test_fall_once_quadrants() {
        // Left half occupied in the top four rows, right half in the bottom
        // four. One step grounds the right half and drops the left by one.
        let mut cells = vec![Cell::EMPTY; 64];
        for y in 0..8 {
            for x in 0..8 {
                if (x > 3) != (y > 3) {
                    cells[y * 8 + x] = Cell {
                        color: TileColor::Red,
                        ..Cell::EMPTY
                    };
                }
            }
        }
        let board = BoardSnapshot::from_cells(8, 8, cells).unwrap();
        let dropped = board.fall_once();

        for y in 0..8 {
            for x in 0..8 {
                let cell = dropped.cell_at(x, y);
                if x < 4 && (3..7).contains(&y) {
                    assert_eq!(cell.color, TileColor::Red);
                    assert!(!cell.grounded, "({x}, {y}) should still be loose");
                } else if x > 3 && y < 4 {
                    assert_eq!(cell.color, TileColor::Red);
                    assert!(cell.grounded, "({x}, {y}) should have grounded");
                } else {
                    assert!(cell.is_empty(), "({x}, {y}) should be empty");
                }
            }
        }
    }

    #[test]
    fn test_fall_to_bottom_compacts_columns() {
        let mut cells = vec![Cell::EMPTY; 64];
        for y in 0..8 {
            for x in 0..8 {
                if (x > 3) != (y > 3) {
                    cells[y * 8 + x] = Cell {
                        color: TileColor::Red,
                        ..Cell::EMPTY
                    };
                }
            }
        }
        let board = BoardSnapshot::from_cells(8, 8, cells).unwrap();
        // Right-half columns sit on row 0 with no empty run below, which
        // forces the single-step fallback first.
        let settled = board.fall_once().fall_to_bottom();

        assert!(settled.active().is_empty());
        for y in 0..8 {
            for x in 0..8 {
                let cell = settled.cell_at(x, y);
                if y < 4 {
                    assert_eq!(cell.color, TileColor::Red);
                    assert!(cell.grounded);
                    assert!(!cell.active);
                } else {
                    assert!(cell.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_fall_to_bottom_idempotent() {
        let mut cells = vec![Cell::EMPTY; 48];
        cells[3 * 6 + 1] = Cell::falling(TileColor::Green);
        cells[5 * 6 + 1] = Cell::falling(TileColor::Red);
        cells[4 * 6 + 4] = Cell {
            color: TileColor::Blue,
            ..Cell::EMPTY
        };
        let board = BoardSnapshot::from_cells(6, 8, cells).unwrap();

        let once = board.fall_to_bottom();
        let twice = once.fall_to_bottom();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fall_once_grounds_on_grounded_stack() {
        let mut cells = vec![Cell::EMPTY; 16];
        cells[0] = Cell::settled(TileColor::Blue);
        cells[4] = Cell::falling(TileColor::Red);
        let board = BoardSnapshot::from_cells(4, 4, cells).unwrap();

        let dropped = board.fall_once();
        let cell = dropped.cell_at(0, 1);
        assert_eq!(cell.color, TileColor::Red);
        assert!(cell.grounded);
    }

    #[test]
    fn test_from_cells_rejects_bad_shapes() {
        let err = BoardSnapshot::from_cells(4, 4, vec![Cell::EMPTY; 15]).unwrap_err();
        assert!(matches!(err, SnapshotError::CellCount { expected: 16, found: 15, .. }));

        let mut cells = vec![Cell::EMPTY; 16];
        cells[0] = Cell::falling_pivot(TileColor::Red);
        cells[1] = Cell::falling_pivot(TileColor::Red);
        let err = BoardSnapshot::from_cells(4, 4, cells).unwrap_err();
        assert!(matches!(err, SnapshotError::MultiplePivots));

        let mut cells = vec![Cell::EMPTY; 16];
        cells[5] = Cell {
            color: TileColor::Red,
            pivot: true,
            ..Cell::EMPTY
        };
        let err = BoardSnapshot::from_cells(4, 4, cells).unwrap_err();
        assert!(matches!(err, SnapshotError::InactivePivot { x: 1, y: 1 }));

        let mut cells = vec![Cell::EMPTY; 16];
        cells[2] = Cell {
            color: TileColor::Red,
            active: true,
            grounded: true,
            ..Cell::EMPTY
        };
        let err = BoardSnapshot::from_cells(4, 4, cells).unwrap_err();
        assert!(matches!(err, SnapshotError::GroundedActive { x: 2, y: 0 }));
    }

    #[test]
    fn test_snapshot_serde_round_trip() {
        let mut cells = vec![Cell::EMPTY; 16];
        cells[9] = Cell::falling_pivot(TileColor::Green);
        cells[13] = Cell::falling(TileColor::Blue);
        cells[0] = Cell::settled(TileColor::Yellow);
        let board = BoardSnapshot::from_cells(4, 4, cells).unwrap();

        let json = serde_json::to_string(&board).unwrap();
        let back: BoardSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(board, back);
    }
}
