use chromino_engine::BoardSnapshot;

/// One node in the per-tick placement search tree.
///
/// A node owns one board snapshot and up to three children: the result of
/// sliding the falling piece left, sliding it right, and letting it drop to
/// rest. Children are exclusively owned - the tree has no back edges and no
/// sharing, and is discarded wholesale at the end of the tick.
///
/// A node whose snapshot has no active tiles is a leaf: the piece has
/// settled and the node's `value` is a final board evaluation. For interior
/// nodes `value` is the maximum over the present children, filled in by
/// [`BoardEvaluator::fill_tree_values`](crate::BoardEvaluator::fill_tree_values).
#[derive(Debug, Clone)]
pub struct StateNode {
    pub(crate) snapshot: BoardSnapshot,
    pub(crate) value: i32,
    pub(crate) red_value: i32,
    pub(crate) green_value: i32,
    pub(crate) blue_value: i32,
    pub(crate) left: Option<Box<StateNode>>,
    pub(crate) right: Option<Box<StateNode>>,
    pub(crate) below: Option<Box<StateNode>>,
}

impl StateNode {
    #[must_use]
    pub fn new(snapshot: BoardSnapshot) -> Self {
        Self {
            snapshot,
            value: 0,
            red_value: 0,
            green_value: 0,
            blue_value: 0,
            left: None,
            right: None,
            below: None,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> &BoardSnapshot {
        &self.snapshot
    }

    /// Best achievable score from this node downward.
    #[must_use]
    pub fn value(&self) -> i32 {
        self.value
    }

    #[must_use]
    pub fn red_value(&self) -> i32 {
        self.red_value
    }

    #[must_use]
    pub fn green_value(&self) -> i32 {
        self.green_value
    }

    #[must_use]
    pub fn blue_value(&self) -> i32 {
        self.blue_value
    }

    #[must_use]
    pub fn left(&self) -> Option<&StateNode> {
        self.left.as_deref()
    }

    #[must_use]
    pub fn right(&self) -> Option<&StateNode> {
        self.right.as_deref()
    }

    #[must_use]
    pub fn below(&self) -> Option<&StateNode> {
        self.below.as_deref()
    }

    /// No piece left to move: the value here is a final board evaluation.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.snapshot.active().is_empty()
    }

    /// Expands the slide/drop tree below this node.
    ///
    /// Walks the left spine (each visited node gets a drop child and a
    /// left-slide child, advancing into the latter until a wall or obstacle
    /// blocks it), then symmetrically the right spine from this node. The
    /// spines enumerate "slide this far, then drop" placements; drop
    /// children are always leaves.
    pub fn build_tree(&mut self) {
        let mut current = &mut *self;
        loop {
            current.below = Some(Box::new(StateNode::new(
                current.snapshot.fall_to_bottom(),
            )));
            current.left = current
                .snapshot
                .slide_left()
                .map(|s| Box::new(StateNode::new(s)));
            match current.left.as_deref_mut() {
                Some(next) => current = next,
                None => break,
            }
        }

        let mut current = &mut *self;
        loop {
            if current.below.is_none() {
                current.below = Some(Box::new(StateNode::new(
                    current.snapshot.fall_to_bottom(),
                )));
            }
            current.right = current
                .snapshot
                .slide_right()
                .map(|s| Box::new(StateNode::new(s)));
            match current.right.as_deref_mut() {
                Some(next) => current = next,
                None => break,
            }
        }
    }
}
