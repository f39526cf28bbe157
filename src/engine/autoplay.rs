//! Seeded headless play: bot strategies and a parallel batch runner.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::engine::config::{AnimationTimings, GameConfig};
use crate::engine::error::EngineError;
use crate::engine::models::{GameEvent, RotateOutcome};
use crate::engine::session::Session;
use crate::game::rotation::{rotate_hexagons, RotationResult};

/// Attempts allowed per requested move before a game is abandoned.
const ATTEMPTS_PER_MOVE: usize = 50;
const BOT_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Picks a selection point and direction for the next rotation.
pub trait RotationStrategy: Send + Sync {
    fn name(&self) -> &str;
    fn choose(&self, session: &Session, rng: &mut StdRng) -> Option<(usize, bool)>;
}

/// Uniformly random point and direction.
pub struct RandomStrategy;

impl RotationStrategy for RandomStrategy {
    fn name(&self) -> &str {
        "random"
    }

    fn choose(&self, session: &Session, rng: &mut StdRng) -> Option<(usize, bool)> {
        let points = session.topology().selection_points().len();
        if points == 0 {
            return None;
        }
        Some((rng.gen_range(0..points), rng.gen_bool(0.5)))
    }
}

/// First rotation found, scanning from a random start, that produces a
/// match on a scratch copy of the board. Falls back to random.
pub struct GreedyStrategy;

impl RotationStrategy for GreedyStrategy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn choose(&self, session: &Session, rng: &mut StdRng) -> Option<(usize, bool)> {
        let points = session.topology().selection_points();
        if points.is_empty() {
            return None;
        }
        let start = rng.gen_range(0..points.len());
        let mut scratch_events = Vec::new();
        for offset in 0..points.len() {
            let point = &points[(start + offset) % points.len()];
            for clockwise in [true, false] {
                let mut board = session.board().clone();
                scratch_events.clear();
                let result = rotate_hexagons(
                    &mut board,
                    session.topology(),
                    point,
                    clockwise,
                    0.0,
                    &mut scratch_events,
                );
                if matches!(result, RotationResult::Matched { .. }) {
                    return Some((point.index, clockwise));
                }
            }
        }
        RandomStrategy.choose(session, rng)
    }
}

pub fn strategy_by_name(name: &str) -> Option<Box<dyn RotationStrategy>> {
    match name {
        "random" => Some(Box::new(RandomStrategy)),
        "greedy" => Some(Box::new(GreedyStrategy)),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub seed: u64,
    pub score: u64,
    pub moves: u64,
    pub attempts: usize,
    pub bombs_spawned: usize,
    pub game_over: bool,
    pub duration_ms: f64,
}

/// Play one seeded game until game over, `max_moves` completed moves, or
/// the attempt budget runs out.
pub fn play_game(
    config: &GameConfig,
    strategy: &dyn RotationStrategy,
    seed: u64,
    max_moves: usize,
) -> Result<GameSummary, EngineError> {
    let t0 = Instant::now();
    let mut config = config.clone();
    config.seed = Some(seed);
    config.timings = AnimationTimings::instant();

    let mut session = Session::new(config)?;
    session.request_initial_population()?;
    let mut bot_rng = StdRng::seed_from_u64(seed ^ BOT_SEED_SALT);

    let mut attempts = 0;
    let mut bombs_spawned = 0;
    let mut game_over = false;
    while (session.moves() as usize) < max_moves && attempts < max_moves * ATTEMPTS_PER_MOVE {
        let Some((index, clockwise)) = strategy.choose(&session, &mut bot_rng) else {
            break;
        };
        attempts += 1;
        let result = session.issue_rotate_at(index, clockwise)?;
        bombs_spawned += result
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::TileSpawned { kind, .. } if kind.is_bomb()))
            .count();
        if let RotateOutcome::GameOver { .. } = result.outcome {
            game_over = true;
            break;
        }
    }

    Ok(GameSummary {
        seed,
        score: session.score(),
        moves: session.moves(),
        attempts,
        bombs_spawned,
        game_over,
        duration_ms: t0.elapsed().as_secs_f64() * 1000.0,
    })
}

/// Aggregated results from a batch of games.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub strategy: String,
    pub games: Vec<GameSummary>,
}

impl BatchReport {
    pub fn avg_score(&self) -> f64 {
        if self.games.is_empty() {
            return 0.0;
        }
        self.games.iter().map(|g| g.score as f64).sum::<f64>() / self.games.len() as f64
    }

    pub fn score_stddev(&self) -> f64 {
        if self.games.len() < 2 {
            return 0.0;
        }
        let avg = self.avg_score();
        let variance = self
            .games
            .iter()
            .map(|g| (g.score as f64 - avg).powi(2))
            .sum::<f64>()
            / (self.games.len() - 1) as f64;
        variance.sqrt()
    }

    pub fn game_over_rate(&self) -> f64 {
        self.games.iter().filter(|g| g.game_over).count() as f64 / self.games.len().max(1) as f64
    }

    pub fn avg_moves(&self) -> f64 {
        self.games.iter().map(|g| g.moves as f64).sum::<f64>() / self.games.len().max(1) as f64
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Autoplay Results ({} games, {})", self.games.len(), self.strategy)];
        lines.push("=".repeat(60));
        lines.push(format!(
            "  score: avg={:.1} +/- {:.1}  max={}",
            self.avg_score(),
            self.score_stddev(),
            self.games.iter().map(|g| g.score).max().unwrap_or(0)
        ));
        lines.push(format!(
            "  moves: avg={:.1}  game over: {:.1}%  bombs: {}",
            self.avg_moves(),
            self.game_over_rate() * 100.0,
            self.games.iter().map(|g| g.bombs_spawned).sum::<usize>()
        ));
        if !self.games.is_empty() {
            let total_ms: f64 = self.games.iter().map(|g| g.duration_ms).sum();
            lines.push(format!(
                "  Avg game: {:.1}ms  |  Total: {:.2}s",
                total_ms / self.games.len() as f64,
                total_ms / 1000.0
            ));
        }
        lines.join("\n")
    }
}

/// Play `games` seeded games in parallel; game i uses `base_seed + i`, wrapping.
pub fn run_batch(
    config: &GameConfig,
    strategy: &dyn RotationStrategy,
    base_seed: u64,
    games: usize,
    max_moves: usize,
) -> Result<BatchReport, EngineError> {
    let games: Vec<GameSummary> = (0..games as u64)
        .into_par_iter()
        .map(|i| play_game(config, strategy, base_seed.wrapping_add(i), max_moves))
        .collect::<Result<_, _>>()?;
    Ok(BatchReport {
        strategy: strategy.name().to_string(),
        games,
    })
}
