//! Arena CLI: run batches of seeded bot games from the command line.
//!
//! Usage:
//!   cargo run --release --bin arena -- --games 200 --strategy greedy
//!   cargo run --release --bin arena -- --games 50 --width 10 --height 12 --max-moves 500

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hexfall_engine::engine::autoplay::{run_batch, strategy_by_name};
use hexfall_engine::engine::config::{load_config, load_default_config};

#[derive(Parser)]
#[command(name = "arena", about = "Run batches of seeded hexfall bot games")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    games: usize,

    /// First seed; game i uses seed + i
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Completed moves per game before stopping
    #[arg(long, default_value = "200")]
    max_moves: usize,

    /// Bot strategy: "greedy" or "random"
    #[arg(long, default_value = "greedy")]
    strategy: String,

    /// Path to hexfall.toml
    #[arg(long, env = "HEXFALL_CONFIG")]
    config: Option<PathBuf>,

    /// Override grid width
    #[arg(long)]
    width: Option<u32>,

    /// Override grid height
    #[arg(long)]
    height: Option<u32>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => load_config(path)?,
        None => load_default_config(),
    };
    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(height) = cli.height {
        config.height = height;
    }
    config.validate()?;

    let strategy = strategy_by_name(&cli.strategy)
        .ok_or_else(|| format!("Unknown strategy: {}", cli.strategy))?;

    eprintln!(
        "Playing {} games ({}x{}, {}), seeds {}..{}",
        cli.games,
        config.width,
        config.height,
        strategy.name(),
        cli.seed,
        cli.seed.wrapping_add(cli.games as u64)
    );

    let report = run_batch(&config, strategy.as_ref(), cli.seed, cli.games, cli.max_moves)?;
    println!("{}", report.summary());
    Ok(())
}
