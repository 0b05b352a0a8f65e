//! Demo battle runner.
//!
//! A single run prints the turn log and the final board. Several runs play
//! consecutive seeds in parallel and print win-rate statistics.

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use vanguard_core::battle::{BattleOutcome, TurnReport, Winner};
use vanguard_core::config::{BattleConfig, DEFAULT_MAX_ROUNDS};
use vanguard_core::content::roster;

#[derive(Debug, Parser)]
#[command(name = "vanguard", version, about = "Run Vanguard demo battles")]
struct Args {
    /// Seed of the first battle; further runs use the following seeds.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Call a stalemate after this many rounds.
    #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
    max_rounds: u32,

    /// Number of battles to play.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    runs: u64,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Tracing filter, e.g. `vanguard_core=debug`.
    #[arg(long, default_value = "warn")]
    log: String,
}

/// One battle, as printed with `--json`.
#[derive(Debug, Serialize)]
struct BattleRecord<'a> {
    config: BattleConfig,
    outcome: BattleOutcome,
    turns: &'a [TurnReport],
}

/// Aggregate over many battles.
#[derive(Debug, Default, Serialize)]
struct Stats {
    runs: u64,
    left_wins: u64,
    right_wins: u64,
    draws: u64,
    stalemates: u64,
    mean_rounds: f64,
}

impl Stats {
    #[allow(clippy::cast_precision_loss)]
    fn collect(outcomes: &[BattleOutcome]) -> Self {
        let mut stats = Self::default();
        let mut rounds_total = 0u64;
        for outcome in outcomes {
            stats.runs += 1;
            let rounds = match *outcome {
                BattleOutcome::Decided { winner, rounds } => {
                    match winner {
                        Winner::Left => stats.left_wins += 1,
                        Winner::Right => stats.right_wins += 1,
                        Winner::Draw => stats.draws += 1,
                    }
                    rounds
                }
                BattleOutcome::Stalemate { rounds } => {
                    stats.stalemates += 1;
                    rounds
                }
            };
            rounds_total += u64::from(rounds);
        }
        if stats.runs > 0 {
            stats.mean_rounds = rounds_total as f64 / stats.runs as f64;
        }
        stats
    }

    #[allow(clippy::cast_precision_loss)]
    fn rate(&self, count: u64) -> f64 {
        100.0 * count as f64 / self.runs.max(1) as f64
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log)?;

    let config = BattleConfig::default()
        .with_seed(args.seed)
        .with_max_rounds(args.max_rounds);

    if args.runs == 1 {
        run_single(config, args.json)
    } else {
        run_many(config, args.runs, args.json)
    }
}

fn setup_logging(filter: &str) -> Result<()> {
    let filter =
        EnvFilter::try_new(filter).with_context(|| format!("invalid log filter {filter:?}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run_single(config: BattleConfig, json: bool) -> Result<()> {
    let mut battle = roster::demo_battle(&config).context("assembling the demo roster")?;
    let outcome = battle.run().context("running the battle")?;

    if json {
        let record = BattleRecord {
            config,
            outcome,
            turns: battle.log(),
        };
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("{}", battle.arena());
    for turn in battle.log() {
        println!("{turn}");
    }
    println!();
    print!("{}", battle.arena());
    match outcome {
        BattleOutcome::Decided { winner, rounds } => {
            println!("{winner:?} wins after {rounds} rounds");
        }
        BattleOutcome::Stalemate { rounds } => println!("stalemate after {rounds} rounds"),
    }
    Ok(())
}

fn run_many(config: BattleConfig, runs: u64, json: bool) -> Result<()> {
    let outcomes = (0..runs)
        .into_par_iter()
        .map(|offset| {
            let config = config.with_seed(config.seed.wrapping_add(offset));
            let mut battle = roster::demo_battle(&config)?;
            battle.run()
        })
        .collect::<Result<Vec<_>, _>>()
        .context("running battles")?;

    let stats = Stats::collect(&outcomes);
    tracing::info!(runs = stats.runs, "all battles finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("battles:     {}", stats.runs);
    println!("left wins:   {} ({:.1}%)", stats.left_wins, stats.rate(stats.left_wins));
    println!("right wins:  {} ({:.1}%)", stats.right_wins, stats.rate(stats.right_wins));
    println!("draws:       {} ({:.1}%)", stats.draws, stats.rate(stats.draws));
    println!("stalemates:  {} ({:.1}%)", stats.stalemates, stats.rate(stats.stalemates));
    println!("mean rounds: {:.2}", stats.mean_rounds);
    Ok(())
}
