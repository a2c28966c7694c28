//! Self-Play Training Binary
//!
//! Runs external-sampling MCCFR for heads-up leduc hold'em and
//! writes the resulting tabular policy directory, optionally
//! exporting a frozen JSON checkpoint alongside it.

use clap::Parser;
use deckbench::agents::checkpoint::Checkpoint;
use deckbench::agents::tabular::Tabular;
use deckbench::env::Game;
use deckbench::env::leduc::Leduc;
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "train a tabular card game policy by self-play")]
struct Args {
    #[arg(long, value_enum, default_value_t = Game::LeducHoldem)]
    env: Game,
    #[arg(long, default_value_t = 10_000)]
    epochs: usize,
    /// directory to write the policy tables into
    #[arg(long)]
    dir: PathBuf,
    /// optional path for a frozen JSON checkpoint export
    #[arg(long)]
    checkpoint: Option<PathBuf>,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    deckbench::log();
    anyhow::ensure!(
        args.env == Game::LeducHoldem,
        "self-play training only supports leduc-holdem, got {}",
        args.env
    );
    let env = Leduc::new(2, args.seed)?;
    let policy = Tabular::train(&env, args.epochs, args.seed);
    policy.save(&args.dir)?;
    if let Some(ref path) = args.checkpoint {
        let game = args.env.to_string();
        Checkpoint::from((&policy, game.as_str())).save(path)?;
    }
    log::info!("training complete after {} epochs", policy.epochs());
    Ok(())
}
