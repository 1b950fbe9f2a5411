use anyhow::ensure;
use chromino_ai::{DecisionEngine, WeightTable};
use clap::{Parser, Subcommand};
use rand::Rng as _;

use crate::{
    generator::PieceGenerator,
    session::{GameSession, Outcome},
};

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run a headless self-play session
    AutoPlay(#[clap(flatten)] AutoPlayArg),
}

#[derive(Debug, Clone, clap::Args)]
struct AutoPlayArg {
    /// Board width in columns
    #[arg(long, default_value_t = 7)]
    width: usize,
    /// Board height in rows
    #[arg(long, default_value_t = 13)]
    height: usize,
    /// Maximum number of ticks to simulate
    #[arg(long, default_value_t = 400)]
    ticks: usize,
    /// Seed for piece generation; random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

impl Default for AutoPlayArg {
    fn default() -> Self {
        Self {
            width: 7,
            height: 13,
            ticks: 400,
            seed: None,
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::AutoPlay(AutoPlayArg::default())) {
        Mode::AutoPlay(arg) => run_auto(&arg),
    }
}

fn run_auto(arg: &AutoPlayArg) -> anyhow::Result<()> {
    ensure!(arg.width >= 3, "board must be at least 3 columns wide");
    ensure!(arg.height >= 4, "board must be at least 4 rows tall");

    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let weights = if (arg.width, arg.height) == (7, 13) {
        WeightTable::standard()
    } else {
        WeightTable::graded(arg.width, arg.height)
    };
    let engine = DecisionEngine::new(weights);
    let generator = PieceGenerator::new(seed);

    eprintln!(
        "Self-play on a {}x{} board, seed {seed}, up to {} ticks",
        arg.width, arg.height, arg.ticks,
    );
    let mut session = GameSession::new(arg.width, arg.height, engine, generator);
    let outcome = session.run(arg.ticks)?;

    println!("{}", session.board());
    match outcome {
        Outcome::TickBudget => println!("stopped: tick budget exhausted"),
        Outcome::Blocked => println!("stopped: no room to spawn"),
    }
    println!(
        "ticks: {}, pieces: {}",
        session.ticks_played(),
        session.pieces_spawned(),
    );
    let colors = session.color_scores();
    println!(
        "score: {} (red {}, green {}, blue {})",
        session.score(),
        colors.red,
        colors.green,
        colors.blue,
    );
    Ok(())
}
