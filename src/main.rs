use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use hexfall_engine::engine::autoplay::strategy_by_name;
use hexfall_engine::engine::config::{load_config, load_default_config};
use hexfall_engine::engine::models::{GameEvent, RotateOutcome};
use hexfall_engine::engine::session::Session;

#[derive(Parser)]
#[command(name = "hexfall", about = "Play a seeded hexfall game headlessly, streaming events as JSON lines")]
struct Cli {
    /// Path to hexfall.toml (default: auto-discover)
    #[arg(long, env = "HEXFALL_CONFIG")]
    config: Option<PathBuf>,

    /// RNG seed, overrides the config file
    #[arg(long, env = "HEXFALL_SEED")]
    seed: Option<u64>,

    /// Stop after this many completed moves
    #[arg(long, default_value = "50")]
    moves: u64,

    /// Bot strategy: "greedy" or "random"
    #[arg(long, default_value = "greedy")]
    strategy: String,

    /// Do not print events
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => load_config(path)?,
        None => load_default_config(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    let seed = config.seed.unwrap_or_else(rand::random);
    config.seed = Some(seed);

    let strategy = strategy_by_name(&cli.strategy)
        .ok_or_else(|| format!("Unknown strategy: {}", cli.strategy))?;

    let mut session = Session::new(config)?;
    if !cli.quiet {
        session.subscribe(Box::new(|event: &GameEvent| match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "failed to encode event"),
        }));
    }
    session.request_initial_population()?;
    tracing::info!(
        seed,
        width = session.config().width,
        height = session.config().height,
        strategy = strategy.name(),
        "game started"
    );

    let mut bot_rng = StdRng::seed_from_u64(seed.rotate_left(17));
    let mut attempts = 0u64;
    while session.moves() < cli.moves && attempts < cli.moves * 50 {
        let Some((index, clockwise)) = strategy.choose(&session, &mut bot_rng) else {
            break;
        };
        attempts += 1;
        let result = session.issue_rotate_at(index, clockwise)?;
        if let RotateOutcome::GameOver { .. } = result.outcome {
            break;
        }
    }

    tracing::info!(
        score = session.score(),
        moves = session.moves(),
        attempts,
        state = ?session.state(),
        "game finished"
    );
    Ok(())
}
