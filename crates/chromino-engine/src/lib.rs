pub use self::core::*;

pub mod core;

/// A cell buffer that cannot be turned into a valid [`BoardSnapshot`].
///
/// Snapshot capture is the only place the board invariants are enforced;
/// every transformation afterwards preserves them by construction.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SnapshotError {
    #[display("expected {expected} cells for a {width}x{height} board, got {found}")]
    CellCount {
        width: usize,
        height: usize,
        expected: usize,
        found: usize,
    },
    #[display("more than one pivot cell on the board")]
    MultiplePivots,
    #[display("pivot cell at ({x}, {y}) is not active")]
    InactivePivot { x: usize, y: usize },
    #[display("cell at ({x}, {y}) is both grounded and active")]
    GroundedActive { x: usize, y: usize },
}
