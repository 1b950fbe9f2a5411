use super::{
    snapshot::BoardSnapshot,
    tile::{Cell, TilePos},
};

/// 4-bit orthogonal-neighbour descriptor: which of the four cells around an
/// anchor satisfy some predicate (1=above, 2=right, 4=below, 8=left).
///
/// Used to classify the falling piece's shape around its pivot for rotation,
/// and by the board evaluator to grade same-color connectivity. Purely a
/// connectivity descriptor - it carries no rendering meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeighborMask(u8);

impl NeighborMask {
    pub const NONE: Self = Self(0);
    pub const ABOVE: Self = Self(1);
    pub const RIGHT: Self = Self(2);
    pub const BELOW: Self = Self(4);
    pub const LEFT: Self = Self(8);

    /// The four orthogonal directions paired with their unit offsets.
    pub const DIRECTIONS: [(Self, (i32, i32)); 4] = [
        (Self::ABOVE, (0, 1)),
        (Self::RIGHT, (1, 0)),
        (Self::BELOW, (0, -1)),
        (Self::LEFT, (-1, 0)),
    ];

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[must_use]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Number of set directions.
    #[must_use]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}

impl BoardSnapshot {
    /// Rotates the falling piece one 90-degree clockwise step around its
    /// pivot.
    ///
    /// The 1-2 non-pivot active tiles are classified by their orthogonal
    /// offset from the pivot into a [`NeighborMask`]; each of the ten valid
    /// shapes has its own fixed destination recipe (single tiles swap one
    /// quarter turn, L-shapes 3-cycle through the corner cell, I-pieces
    /// exchange horizontal and vertical). `None` when there is no falling
    /// piece or pivot, when a destination is off the board or occupied, or
    /// when the mask matches no known shape. No active tile is ever lost or
    /// duplicated.
    #[must_use]
    pub fn rotate(&self) -> Option<Self> {
        if self.active.is_empty() {
            return None;
        }
        let pivot = self.find_pivot()?;

        let mut mask = NeighborMask::NONE;
        for &tile in &self.active {
            for (bit, (dx, dy)) in NeighborMask::DIRECTIONS {
                if self.offset(pivot, dx, dy) == Some(tile) {
                    mask.insert(bit);
                }
            }
        }

        let mut cells = self.cells.clone();
        let width = self.width;
        let idx = |p: TilePos| p.y * width + p.x;

        let active = match mask.bits() {
            // Lone tile above: swap to the right of the pivot.
            1 => {
                let above = self.offset(pivot, 0, 1)?;
                let dest = self.offset(pivot, 1, 0)?;
                if !self.cell(dest).is_empty() {
                    return None;
                }
                cells[idx(dest)] = cells[idx(above)];
                cells[idx(above)] = Cell::EMPTY;
                vec![pivot, dest]
            }
            // Lone tile right: swap below.
            2 => {
                let right = self.offset(pivot, 1, 0)?;
                let dest = self.offset(pivot, 0, -1)?;
                if !self.cell(dest).is_empty() {
                    return None;
                }
                cells[idx(dest)] = cells[idx(right)];
                cells[idx(right)] = Cell::EMPTY;
                vec![pivot, dest]
            }
            // Lone tile below: swap to the left.
            4 => {
                let below = self.offset(pivot, 0, -1)?;
                let dest = self.offset(pivot, -1, 0)?;
                if !self.cell(dest).is_empty() {
                    return None;
                }
                cells[idx(dest)] = cells[idx(below)];
                cells[idx(below)] = Cell::EMPTY;
                vec![pivot, dest]
            }
            // Lone tile left: swap above.
            8 => {
                let left = self.offset(pivot, -1, 0)?;
                let dest = self.offset(pivot, 0, 1)?;
                if !self.cell(dest).is_empty() {
                    return None;
                }
                cells[idx(dest)] = cells[idx(left)];
                cells[idx(left)] = Cell::EMPTY;
                vec![pivot, dest]
            }
            // L with arms above and right: 3-cycle through the NE corner.
            3 => {
                let above = self.offset(pivot, 0, 1)?;
                let right = self.offset(pivot, 1, 0)?;
                let corner = self.offset(pivot, 1, 1)?;
                if !self.cell(corner).is_empty() {
                    return None;
                }
                cells[idx(corner)] = cells[idx(above)];
                cells[idx(above)] = cells[idx(pivot)];
                cells[idx(pivot)] = cells[idx(right)];
                cells[idx(right)] = Cell::EMPTY;
                vec![pivot, above, corner]
            }
            // L with arms right and below: 3-cycle through the SE corner.
            6 => {
                let right = self.offset(pivot, 1, 0)?;
                let below = self.offset(pivot, 0, -1)?;
                let corner = self.offset(pivot, 1, -1)?;
                if !self.cell(corner).is_empty() {
                    return None;
                }
                cells[idx(corner)] = cells[idx(right)];
                cells[idx(right)] = cells[idx(pivot)];
                cells[idx(pivot)] = cells[idx(below)];
                cells[idx(below)] = Cell::EMPTY;
                vec![pivot, right, corner]
            }
            // L with arms below and left: 3-cycle through the SW corner.
            12 => {
                let below = self.offset(pivot, 0, -1)?;
                let left = self.offset(pivot, -1, 0)?;
                let corner = self.offset(pivot, -1, -1)?;
                if !self.cell(corner).is_empty() {
                    return None;
                }
                cells[idx(corner)] = cells[idx(below)];
                cells[idx(below)] = cells[idx(pivot)];
                cells[idx(pivot)] = cells[idx(left)];
                cells[idx(left)] = Cell::EMPTY;
                vec![pivot, below, corner]
            }
            // L with arms left and above: 3-cycle through the NW corner.
            9 => {
                let left = self.offset(pivot, -1, 0)?;
                let above = self.offset(pivot, 0, 1)?;
                let corner = self.offset(pivot, -1, 1)?;
                if !self.cell(corner).is_empty() {
                    return None;
                }
                cells[idx(corner)] = cells[idx(left)];
                cells[idx(left)] = cells[idx(pivot)];
                cells[idx(pivot)] = cells[idx(above)];
                cells[idx(above)] = Cell::EMPTY;
                vec![pivot, left, corner]
            }
            // Horizontal I: arms fold to above and below.
            10 => {
                let left = self.offset(pivot, -1, 0)?;
                let right = self.offset(pivot, 1, 0)?;
                let above = self.offset(pivot, 0, 1)?;
                let below = self.offset(pivot, 0, -1)?;
                if !self.cell(above).is_empty() || !self.cell(below).is_empty() {
                    return None;
                }
                cells[idx(above)] = cells[idx(left)];
                cells[idx(left)] = Cell::EMPTY;
                cells[idx(below)] = cells[idx(right)];
                cells[idx(right)] = Cell::EMPTY;
                vec![pivot, above, below]
            }
            // Vertical I: arms fold to left and right.
            5 => {
                let above = self.offset(pivot, 0, 1)?;
                let below = self.offset(pivot, 0, -1)?;
                let left = self.offset(pivot, -1, 0)?;
                let right = self.offset(pivot, 1, 0)?;
                if !self.cell(left).is_empty() || !self.cell(right).is_empty() {
                    return None;
                }
                cells[idx(left)] = cells[idx(below)];
                cells[idx(below)] = Cell::EMPTY;
                cells[idx(right)] = cells[idx(above)];
                cells[idx(above)] = Cell::EMPTY;
                vec![pivot, left, right]
            }
            // Mask 0 (no adjacent arms) and unknown shapes: nothing to rotate.
            _ => return None,
        };

        Some(Self {
            width: self.width,
            height: self.height,
            cells,
            active,
        })
    }

    fn find_pivot(&self) -> Option<TilePos> {
        for y in 0..self.height {
            for x in 0..self.width {
                if self.cell_at(x, y).pivot {
                    return Some(TilePos::new(x, y));
                }
            }
        }
        None
    }
}
