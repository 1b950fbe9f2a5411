pub use self::{decision::*, evaluator::*, state_tree::*};

mod decision;
mod evaluator;
mod state_tree;
