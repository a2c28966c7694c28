//! Tournament Evaluation Binary
//!
//! Binds one model per seat of a card game environment, plays a fixed
//! number of episodes, and prints per-seat mean rewards to stdout as
//! `<seat> <specifier> <mean reward>` lines.

use clap::Parser;
use colored::Colorize;
use deckbench::agents;
use deckbench::device::Device;
use deckbench::env::Game;
use deckbench::table::Table;

#[derive(Parser)]
#[command(about = "evaluate card game models against each other")]
struct Args {
    /// game to evaluate in
    #[arg(long, value_enum, default_value_t = Game::Uno)]
    env: Game,
    /// one specifier per seat: a checkpoint file, a tabular policy
    /// directory, a registry key, or the literal "random"
    #[arg(long, num_args(0..), default_values_t = [String::from("random"), String::from("random")])]
    models: Vec<String>,
    /// CUDA visibility mask; empty pins evaluation to the CPU
    #[arg(long, default_value = "")]
    cuda: String,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// episodes to average rewards over
    #[arg(long, default_value_t = 10_000)]
    num_games: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    deckbench::log();
    unsafe { std::env::set_var("CUDA_VISIBLE_DEVICES", &args.cuda) };
    let device = Device::detect(&args.cuda);
    match device.is_gpu() {
        true => println!("--> Running on the GPU"),
        false => println!("--> Running on the CPU"),
    }
    log::info!(
        "evaluating {} over {} games on {}",
        args.env,
        args.num_games,
        device
    );
    let mut env = args.env.make(args.seed, args.models.len())?;
    let agents = args
        .models
        .iter()
        .enumerate()
        .map(|(seat, model)| {
            agents::resolve(model, env.as_ref(), device, args.seed.wrapping_add(seat as u64))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    env.seed(args.seed);
    let mut table = Table::sit(env, agents)?;
    let rewards = table.tournament(args.num_games);
    for ((seat, model), reward) in args.models.iter().enumerate().zip(rewards.iter()) {
        let signed = match *reward > 0. {
            true => format!("{:+.4}", reward).green(),
            false => format!("{:+.4}", reward).red(),
        };
        log::info!("{:<2} {:<32} {}", seat, model, signed);
        println!("{} {} {}", seat, model, reward);
    }
    Ok(())
}
