pub use self::{rotation::*, snapshot::*, tile::*};

pub(crate) mod rotation;
pub(crate) mod snapshot;
pub(crate) mod tile;
