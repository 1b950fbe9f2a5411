use arrayvec::ArrayVec;
use chromino_engine::TileColor;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

/// One tile of an unspawned piece: its offset from the spawn anchor, its
/// color, and whether it is the rotation pivot.
#[derive(Debug, Clone, Copy)]
pub struct PieceTile {
    pub dx: i32,
    pub dy: i32,
    pub color: TileColor,
    pub pivot: bool,
}

/// A tromino ready to spawn. The pivot tile sits at offset `(0, 0)`.
pub type Piece = ArrayVec<PieceTile, 3>;

/// Produces random trominoes from a seeded PCG stream, so a session replays
/// identically for the same seed.
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    rng: Pcg32,
}

impl PieceGenerator {
    /// Arm offsets of the three spawnable shapes, relative to the pivot.
    const SHAPES: [[(i32, i32); 2]; 3] = [
        // Corner piece, arm above and arm right.
        [(0, 1), (1, 0)],
        // Corner piece, arm above and arm left.
        [(0, 1), (-1, 0)],
        // Horizontal bar.
        [(-1, 0), (1, 0)],
    ];

    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// The next piece: a uniformly random shape with an independently random
    /// matchable color per tile.
    pub fn next_piece(&mut self) -> Piece {
        let shape = Self::SHAPES[self.rng.random_range(0..Self::SHAPES.len())];
        let mut piece = Piece::new();
        piece.push(PieceTile {
            dx: 0,
            dy: 0,
            color: self.random_color(),
            pivot: true,
        });
        for (dx, dy) in shape {
            piece.push(PieceTile {
                dx,
                dy,
                color: self.random_color(),
                pivot: false,
            });
        }
        piece
    }

    fn random_color(&mut self) -> TileColor {
        TileColor::MATCHABLE[self.rng.random_range(0..TileColor::MATCHABLE.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pieces_are_well_formed() {
        let mut generator = PieceGenerator::new(7);
        for _ in 0..50 {
            let piece = generator.next_piece();
            assert_eq!(piece.len(), 3);
            assert!(piece[0].pivot);
            assert_eq!((piece[0].dx, piece[0].dy), (0, 0));
            for tile in &piece[1..] {
                assert!(!tile.pivot);
                assert!(TileColor::MATCHABLE.contains(&tile.color));
                assert_eq!(tile.dx.abs() + tile.dy.abs(), 1, "arms touch the pivot");
            }
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = PieceGenerator::new(42);
        let mut b = PieceGenerator::new(42);
        for _ in 0..20 {
            let (pa, pb) = (a.next_piece(), b.next_piece());
            for (ta, tb) in pa.iter().zip(&pb) {
                assert_eq!((ta.dx, ta.dy, ta.color), (tb.dx, tb.dy, tb.color));
            }
        }
    }
}
