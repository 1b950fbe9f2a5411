use serde::{Deserialize, Serialize};

/// Color of a single board tile.
///
/// `Red`, `Green`, and `Blue` participate in cluster scoring. `Yellow` tiles
/// fall and stack like any other but are never scored. `Empty` marks a vacant
/// cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileColor {
    Red,
    Green,
    Blue,
    Yellow,
    #[default]
    Empty,
}

impl TileColor {
    /// The colors that participate in cluster scoring.
    pub const MATCHABLE: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Green => 'G',
            Self::Blue => 'B',
            Self::Yellow => 'Y',
            Self::Empty => '.',
        }
    }

    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'R' => Some(Self::Red),
            'G' => Some(Self::Green),
            'B' => Some(Self::Blue),
            'Y' => Some(Self::Yellow),
            '.' => Some(Self::Empty),
            _ => None,
        }
    }
}

/// One board location: a color plus the falling/settled flags.
///
/// Invariants, checked once at snapshot capture: a pivot cell is always
/// active, and a grounded cell is never active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub color: TileColor,
    /// Part of the falling piece.
    pub active: bool,
    /// Permanently settled; will never move again.
    pub grounded: bool,
    /// Rotation anchor of the falling piece.
    pub pivot: bool,
}

impl Cell {
    pub const EMPTY: Self = Self {
        color: TileColor::Empty,
        active: false,
        grounded: false,
        pivot: false,
    };

    /// An active falling tile of the given color.
    #[must_use]
    pub fn falling(color: TileColor) -> Self {
        Self {
            color,
            active: true,
            ..Self::EMPTY
        }
    }

    /// The pivot tile of the falling piece.
    #[must_use]
    pub fn falling_pivot(color: TileColor) -> Self {
        Self {
            pivot: true,
            ..Self::falling(color)
        }
    }

    /// A permanently settled tile of the given color.
    #[must_use]
    pub fn settled(color: TileColor) -> Self {
        Self {
            color,
            grounded: true,
            ..Self::EMPTY
        }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.color.is_empty()
    }
}

/// Board coordinate, origin at the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePos {
    pub x: usize,
    pub y: usize,
}

impl TilePos {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}
