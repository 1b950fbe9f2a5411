use chromino_engine::BoardSnapshot;

use crate::{BoardEvaluator, StateNode, WeightTable};

/// A single command for the falling piece, consumed once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Slide the piece one column left.
    Left,
    /// Slide the piece one column right.
    Right,
    /// Rotate the piece a quarter turn clockwise.
    Rotate,
    /// Let gravity act without steering.
    Fall,
    /// No piece on the board to steer.
    #[default]
    Wait,
}

/// The four evaluated search trees for one tick: the board as captured plus
/// its quarter-turn rotations.
///
/// Rotations are chained sequentially, so a blocked quarter turn also prunes
/// every later one: if `root90` cannot be produced, `root180` and `root270`
/// are absent too. Each present tree is fully expanded and value-filled.
#[derive(Debug, Clone)]
pub struct SearchTrees {
    root: StateNode,
    root90: Option<StateNode>,
    root180: Option<StateNode>,
    root270: Option<StateNode>,
}

impl SearchTrees {
    /// Expands and evaluates the search trees for `snapshot`.
    #[must_use]
    pub fn build(snapshot: BoardSnapshot, evaluator: &BoardEvaluator) -> Self {
        fn expand(snapshot: BoardSnapshot, evaluator: &BoardEvaluator) -> StateNode {
            let mut node = StateNode::new(snapshot);
            node.build_tree();
            evaluator.fill_tree_values(&mut node);
            node
        }

        let root = expand(snapshot, evaluator);
        let root90 = root
            .snapshot()
            .rotate()
            .map(|s| expand(s, evaluator));
        let root180 = root90
            .as_ref()
            .and_then(|n| n.snapshot().rotate())
            .map(|s| expand(s, evaluator));
        let root270 = root180
            .as_ref()
            .and_then(|n| n.snapshot().rotate())
            .map(|s| expand(s, evaluator));
        Self {
            root,
            root90,
            root180,
            root270,
        }
    }

    #[must_use]
    pub fn root(&self) -> &StateNode {
        &self.root
    }

    #[must_use]
    pub fn root90(&self) -> Option<&StateNode> {
        self.root90.as_ref()
    }

    #[must_use]
    pub fn root180(&self) -> Option<&StateNode> {
        self.root180.as_ref()
    }

    #[must_use]
    pub fn root270(&self) -> Option<&StateNode> {
        self.root270.as_ref()
    }

    /// Picks the tick's action from the filled trees.
    ///
    /// Dropping in place is the baseline; a slide or rotation is chosen only
    /// when it strictly beats the current best, checked in the fixed order
    /// fall, left, right, rotate. Ties therefore resolve toward the earlier,
    /// less disruptive action. Rotation competes with the best value across
    /// all present rotated trees.
    #[must_use]
    pub fn choose_move(&self) -> Action {
        let mut action = Action::Fall;
        let mut best = self.root.below().map_or(0, StateNode::value).max(0);

        if let Some(left) = self.root.left()
            && left.value() > best
        {
            best = left.value();
            action = Action::Left;
        }
        if let Some(right) = self.root.right()
            && right.value() > best
        {
            best = right.value();
            action = Action::Right;
        }

        let rotate_value = [
            self.root90.as_ref(),
            self.root180.as_ref(),
            self.root270.as_ref(),
        ]
        .into_iter()
        .flatten()
        .map(StateNode::value)
        .fold(0, i32::max);
        if rotate_value > best {
            action = Action::Rotate;
        }

        action
    }
}

/// Per-tick move selection: capture a snapshot, plan, act on the best line.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    evaluator: BoardEvaluator,
}

impl DecisionEngine {
    #[must_use]
    pub fn new(weights: WeightTable) -> Self {
        Self {
            evaluator: BoardEvaluator::new(weights),
        }
    }

    /// Engine for the production 7x13 board.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            evaluator: BoardEvaluator::standard(),
        }
    }

    #[must_use]
    pub fn evaluator(&self) -> &BoardEvaluator {
        &self.evaluator
    }

    /// Builds the evaluated search trees for one tick.
    #[must_use]
    pub fn plan(&self, snapshot: BoardSnapshot) -> SearchTrees {
        SearchTrees::build(snapshot, &self.evaluator)
    }

    /// The action for this tick; `None` means no board was captured, which
    /// always yields [`Action::Wait`].
    #[must_use]
    pub fn decide(&self, snapshot: Option<BoardSnapshot>) -> Action {
        match snapshot {
            Some(snapshot) => self.plan(snapshot).choose_move(),
            None => Action::Wait,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromino_engine::{Cell, TileColor};

    fn domino_board(
        width: usize,
        height: usize,
        pivot: (usize, usize),
        arm: (usize, usize),
    ) -> BoardSnapshot {
        let mut cells = vec![Cell::EMPTY; width * height];
        cells[pivot.1 * width + pivot.0] = Cell::falling_pivot(TileColor::Green);
        cells[arm.1 * width + arm.0] = Cell::falling(TileColor::Red);
        BoardSnapshot::from_cells(width, height, cells).unwrap()
    }

    #[test]
    fn test_wait_without_snapshot() {
        let engine = DecisionEngine::standard();
        assert_eq!(engine.decide(None), Action::Wait);
    }

    #[test]
    fn test_fall_when_nothing_improves() {
        // Uniform zero weights: every placement scores the same, so no slide
        // or rotation strictly improves on dropping in place.
        let engine = DecisionEngine::new(WeightTable::from_fn(5, 6, |_, _| 0));
        let board = domino_board(5, 6, (2, 3), (2, 4));
        assert_eq!(engine.decide(Some(board)), Action::Fall);
    }

    #[test]
    fn test_slide_toward_cheap_column() {
        // Keeping (0, 0) and (0, 1) filled costs nothing; everywhere else an
        // occupied cell forfeits 100 points. The piece starts at the right
        // wall, so rotation is blocked and the best line slides left twice.
        let weights = WeightTable::from_fn(3, 4, |x, y| i32::from(x != 0 || y > 1) * 100);
        let engine = DecisionEngine::new(weights);
        let board = domino_board(3, 4, (2, 2), (2, 3));

        let trees = engine.plan(board.clone());
        assert!(trees.root90().is_none(), "wall must block the quarter turn");
        assert!(trees.root180().is_none(), "pruned with the rest of the chain");

        assert_eq!(engine.decide(Some(board)), Action::Left);
    }

    #[test]
    fn test_rotate_to_reach_cheap_cells() {
        // Zero-weight cells at (0, 0) and (1, 0) can only both be covered by
        // a horizontal pair, which takes one quarter turn from the starting
        // vertical piece. Dropping vertically covers at most one of them.
        let weights = WeightTable::from_fn(3, 4, |x, y| i32::from(x > 1 || y > 0) * 100);
        let engine = DecisionEngine::new(weights);
        let board = domino_board(3, 4, (1, 2), (1, 3));

        let trees = engine.plan(board.clone());
        assert_eq!(trees.root().value(), 900);
        assert_eq!(trees.root90().unwrap().value(), 1000);
        assert_eq!(trees.root270().unwrap().value(), 1000);

        assert_eq!(engine.decide(Some(board)), Action::Rotate);
    }
}
