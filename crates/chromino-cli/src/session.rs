use anyhow::Context as _;
use chromino_ai::{Action, ColorScores, DecisionEngine};
use chromino_engine::{BoardSnapshot, Cell, TilePos};

use crate::generator::PieceGenerator;

/// Why a self-play session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The tick budget ran out with the board still playable.
    TickBudget,
    /// A fresh piece had nowhere to spawn.
    Blocked,
}

/// A headless self-play session.
///
/// Each tick mirrors the live game loop: capture the board, ask the decision
/// engine for one action, apply it, then let gravity pull every loose tile
/// down one row. A new piece spawns whenever no tile is falling.
pub struct GameSession {
    board: BoardSnapshot,
    engine: DecisionEngine,
    generator: PieceGenerator,
    pieces_spawned: usize,
    ticks_played: usize,
}

impl GameSession {
    #[must_use]
    pub fn new(
        width: usize,
        height: usize,
        engine: DecisionEngine,
        generator: PieceGenerator,
    ) -> Self {
        Self {
            board: BoardSnapshot::empty(width, height),
            engine,
            generator,
            pieces_spawned: 0,
            ticks_played: 0,
        }
    }

    #[must_use]
    pub fn board(&self) -> &BoardSnapshot {
        &self.board
    }

    #[must_use]
    pub fn pieces_spawned(&self) -> usize {
        self.pieces_spawned
    }

    #[must_use]
    pub fn ticks_played(&self) -> usize {
        self.ticks_played
    }

    /// Full board score under the session's evaluator.
    #[must_use]
    pub fn score(&self) -> i32 {
        self.engine.evaluator().quantify(&self.board)
    }

    #[must_use]
    pub fn color_scores(&self) -> ColorScores {
        self.engine.evaluator().color_scores(&self.board)
    }

    /// Runs until the tick budget is exhausted or a spawn is blocked.
    pub fn run(&mut self, max_ticks: usize) -> anyhow::Result<Outcome> {
        for _ in 0..max_ticks {
            if !self.tick()? {
                return Ok(Outcome::Blocked);
            }
        }
        Ok(Outcome::TickBudget)
    }

    /// One tick of the loop; `Ok(false)` when the next piece cannot spawn.
    fn tick(&mut self) -> anyhow::Result<bool> {
        if self.board.active().is_empty() && !self.spawn()? {
            return Ok(false);
        }
        self.ticks_played += 1;

        let action = self.engine.decide(Some(self.board.clone()));
        let steered = match action {
            Action::Left => self.board.slide_left(),
            Action::Right => self.board.slide_right(),
            Action::Rotate => self.board.rotate(),
            Action::Fall | Action::Wait => None,
        };
        if let Some(next) = steered {
            self.board = next;
        }

        self.apply_gravity()
            .context("gravity step produced an inconsistent board")?;
        Ok(true)
    }

    /// One gravity step, then re-capture. Tiles that grounded this step stop
    /// being part of the falling piece, and the pivot flag goes with them.
    fn apply_gravity(&mut self) -> anyhow::Result<()> {
        let mut cells = self.board.fall_once().into_cells();
        for cell in &mut cells {
            if cell.grounded {
                cell.active = false;
                cell.pivot = false;
            }
        }
        self.board = BoardSnapshot::from_cells(self.board.width(), self.board.height(), cells)?;
        Ok(())
    }

    /// Places the next piece at the spawn anchor, one row below the top so
    /// upward arms fit. `Ok(false)` when any target cell is occupied or off
    /// the board.
    fn spawn(&mut self) -> anyhow::Result<bool> {
        let piece = self.generator.next_piece();
        let width = self.board.width();
        let anchor = TilePos::new(width / 2, self.board.height() - 2);

        let mut targets = Vec::with_capacity(piece.len());
        for tile in &piece {
            let Some(pos) = self.board.offset(anchor, tile.dx, tile.dy) else {
                return Ok(false);
            };
            if !self.board.cell(pos).is_empty() {
                return Ok(false);
            }
            targets.push((pos, tile.color, tile.pivot));
        }

        let mut cells = self.board.clone().into_cells();
        for (pos, color, pivot) in targets {
            cells[pos.y * width + pos.x] = if pivot {
                Cell::falling_pivot(color)
            } else {
                Cell::falling(color)
            };
        }
        self.board = BoardSnapshot::from_cells(width, self.board.height(), cells)?;
        self.pieces_spawned += 1;
        Ok(true)
    }
}
