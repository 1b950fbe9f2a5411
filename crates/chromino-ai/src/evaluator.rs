use std::collections::VecDeque;

use chromino_engine::{BoardSnapshot, NeighborMask, TileColor, TilePos};

use crate::StateNode;

/// Points awarded per visited cluster cell, indexed by how many of its four
/// neighbours match its color. Exponential: denser clusters are worth
/// disproportionately more.
const CONNECTION_VALUES: [i32; 5] = [0, 1, 2, 4, 8];

/// Static positional weights for empty cells, `width` x `height`, origin
/// bottom-left.
///
/// Every empty cell contributes its weight to the board score, so the table
/// biases the AI toward keeping the weighted regions clear: values are low
/// at the side columns, peak at the horizontal center, and grow with row
/// height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTable {
    width: usize,
    height: usize,
    values: Vec<i32>,
}

impl WeightTable {
    /// A table from explicit row-major values (bottom row first).
    ///
    /// # Panics
    ///
    /// Panics if `values` does not hold exactly `width * height` entries.
    #[must_use]
    pub fn new(width: usize, height: usize, values: Vec<i32>) -> Self {
        assert_eq!(
            values.len(),
            width * height,
            "weight table needs {} values for a {width}x{height} board",
            width * height,
        );
        Self {
            width,
            height,
            values,
        }
    }

    /// Builds a table by evaluating `f(x, y)` for every cell.
    #[must_use]
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> i32,
    {
        let mut values = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                values.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            values,
        }
    }

    /// The production table for the 7x13 board.
    #[must_use]
    pub fn standard() -> Self {
        const ROW_BANDS: [(usize, [i32; 7]); 5] = [
            (4, [1, 2, 3, 4, 3, 2, 1]),
            (4, [2, 4, 6, 8, 6, 4, 2]),
            (2, [3, 8, 12, 16, 12, 8, 3]),
            (1, [6, 8, 12, 16, 12, 8, 6]),
            (2, [12, 16, 24, 32, 24, 16, 12]),
        ];
        let mut values = Vec::with_capacity(7 * 13);
        for (rows, band) in ROW_BANDS {
            for _ in 0..rows {
                values.extend_from_slice(&band);
            }
        }
        Self::new(7, 13, values)
    }

    /// A table with the standard shape for non-standard board sizes: column
    /// weights peak at the horizontal center and double through three height
    /// bands. [`WeightTable::standard`] stays authoritative for 7x13.
    #[must_use]
    pub fn graded(width: usize, height: usize) -> Self {
        Self::from_fn(width, height, |x, y| {
            let center = i32::try_from(x.min(width - 1 - x)).unwrap_or(i32::MAX) + 1;
            let band = if height == 0 { 0 } else { y * 3 / height };
            center << band
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn value_at(&self, x: usize, y: usize) -> i32 {
        self.values[y * self.width + x]
    }

    /// Sum over the whole table; the score of a fully empty board.
    #[must_use]
    pub fn total(&self) -> i32 {
        self.values.iter().sum()
    }
}

/// Per-color cluster subtotals for one settled board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorScores {
    pub red: i32,
    pub green: i32,
    pub blue: i32,
}

impl ColorScores {
    #[must_use]
    pub fn total(self) -> i32 {
        self.red + self.green + self.blue
    }
}

/// Scores fully settled boards: positional weights for empty cells plus
/// flood-fill connectivity per matchable color.
#[derive(Debug, Clone)]
pub struct BoardEvaluator {
    weights: WeightTable,
}

impl BoardEvaluator {
    #[must_use]
    pub fn new(weights: WeightTable) -> Self {
        Self { weights }
    }

    /// Evaluator for the production 7x13 board.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(WeightTable::standard())
    }

    #[must_use]
    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Positional score: the summed weight of every empty cell.
    ///
    /// # Panics
    ///
    /// Panics if the snapshot's dimensions do not match the weight table -
    /// a silent wrong score would be worse than a loud failure.
    #[must_use]
    pub fn positional_score(&self, snapshot: &BoardSnapshot) -> i32 {
        assert_eq!(
            (snapshot.width(), snapshot.height()),
            (self.weights.width(), self.weights.height()),
            "snapshot dimensions do not match the configured weight table",
        );
        let mut score = 0;
        for y in 0..snapshot.height() {
            for x in 0..snapshot.width() {
                if snapshot.cell_at(x, y).is_empty() {
                    score += self.weights.value_at(x, y);
                }
            }
        }
        score
    }

    /// Connectivity scores for red, green, and blue clusters.
    ///
    /// Per color, flood-fills with 4-directional adjacency from the bottom
    /// row only: a same-color region that does not reach the floor through
    /// its own color is never discovered and never scored. That restriction
    /// is deliberate - on a settled board every region rests on the floor
    /// eventually, and the scoring model relies on it.
    ///
    /// Each visited cell contributes [`CONNECTION_VALUES`] indexed by its
    /// same-color neighbour count; the cluster then earns a growth bonus of
    /// total same-color links times the number of cells bordering empty
    /// space. Yellow and empty cells never score.
    #[must_use]
    pub fn color_scores(&self, snapshot: &BoardSnapshot) -> ColorScores {
        ColorScores {
            red: Self::cluster_score(snapshot, TileColor::Red),
            green: Self::cluster_score(snapshot, TileColor::Green),
            blue: Self::cluster_score(snapshot, TileColor::Blue),
        }
    }

    fn cluster_score(snapshot: &BoardSnapshot, color: TileColor) -> i32 {
        let width = snapshot.width();
        let mut visited = vec![false; width * snapshot.height()];
        let mut queue = VecDeque::new();

        // Only floor cells seed the search.
        for x in 0..width {
            if snapshot.cell_at(x, 0).color == color {
                visited[x] = true;
                queue.push_back(TilePos::new(x, 0));
            }
        }

        let mut value = 0;
        let mut color_count = 0;
        let mut adj_empty_count = 0;
        while let Some(pos) = queue.pop_front() {
            let mut mask = NeighborMask::NONE;
            let mut borders_empty = false;
            for (bit, (dx, dy)) in NeighborMask::DIRECTIONS {
                let Some(neighbor) = snapshot.offset(pos, dx, dy) else {
                    continue;
                };
                let cell = snapshot.cell(neighbor);
                if cell.color == color {
                    mask.insert(bit);
                    color_count += 1;
                    let idx = neighbor.y * width + neighbor.x;
                    if !visited[idx] {
                        visited[idx] = true;
                        queue.push_back(neighbor);
                    }
                } else if cell.is_empty() {
                    borders_empty = true;
                }
            }
            value += CONNECTION_VALUES[mask.count() as usize];
            if borders_empty {
                adj_empty_count += 1;
            }
        }

        value + color_count * adj_empty_count
    }

    /// Full board score for a settled snapshot: positional weights plus
    /// color connectivity.
    #[must_use]
    pub fn quantify(&self, snapshot: &BoardSnapshot) -> i32 {
        self.positional_score(snapshot) + self.color_scores(snapshot).total()
    }

    /// Backward-propagates values through a built tree.
    ///
    /// Leaves (no active tiles) get a final board evaluation, with the
    /// per-color subtotals stored on the node; interior nodes take the
    /// maximum over their present children, with 0 as the floor candidate.
    pub fn fill_tree_values(&self, node: &mut StateNode) {
        if node.is_leaf() {
            let scores = self.color_scores(node.snapshot());
            node.red_value = scores.red;
            node.green_value = scores.green;
            node.blue_value = scores.blue;
            node.value = self.positional_score(node.snapshot()) + scores.total();
            return;
        }

        let mut max_value = 0;
        for child in [
            node.left.as_deref_mut(),
            node.right.as_deref_mut(),
            node.below.as_deref_mut(),
        ]
        .into_iter()
        .flatten()
        {
            self.fill_tree_values(child);
            max_value = max_value.max(child.value);
        }
        node.value = max_value;
    }
}
