//! The game session: sole owner of board, policies, score and listeners.
//!
//! Commands run synchronously and one at a time. Input is disabled for the
//! whole of a command, so nothing observes a half-resolved board.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engine::config::GameConfig;
use crate::engine::error::EngineError;
use crate::engine::events::{EventBus, Listener, ListenerId};
use crate::engine::models::{GameEvent, IgnoreReason, RotateOutcome, SessionState};
use crate::game::board::Board;
use crate::game::bomb::tick_bombs;
use crate::game::cascade::{spawn_tile, CascadeContext, CascadeResolver};
use crate::game::colors::ColorPolicy;
use crate::game::rotation::{rotate_hexagons, RotationResult};
use crate::game::scoring::ScoreKeeper;
use crate::game::topology::{Topology, WorldPoint};
use crate::game::types::TileId;

/// Outcome of a command plus the events it produced, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult<O> {
    pub outcome: O,
    pub events: Vec<GameEvent>,
}

impl<O> CommandResult<O> {
    fn quiet(outcome: O) -> Self {
        Self {
            outcome,
            events: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulateOutcome {
    Populated { tiles: usize },
    Ignored { reason: IgnoreReason },
}

#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    topology: Topology,
    board: Board,
    colors: ColorPolicy,
    scores: ScoreKeeper,
    resolver: CascadeResolver,
    rng: StdRng,
    listeners: EventBus,
    state: SessionState,
    moves: u64,
}

impl Session {
    /// New session with an empty board, awaiting initial population.
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        let board = Board::new(config.width, config.height);
        Self::from_board(config, board)
    }

    /// Session over a prepared board. A full board is ready for play.
    pub fn from_board(config: GameConfig, board: Board) -> Result<Self, EngineError> {
        config.validate()?;
        if board.width() != config.width || board.height() != config.height {
            return Err(EngineError::Configuration(format!(
                "board is {}x{} but config asks for {}x{}",
                board.width(),
                board.height(),
                config.width,
                config.height
            )));
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = if board.is_full() {
            SessionState::Ready
        } else {
            SessionState::AwaitingPopulation
        };
        Ok(Self {
            topology: Topology::new(config.width, config.height),
            colors: ColorPolicy::new(config.palette.clone()),
            scores: ScoreKeeper::new(config.score_multiplier, config.bomb_spawn_threshold),
            resolver: CascadeResolver::new(config.bomb_initial_moves),
            rng,
            board,
            listeners: EventBus::new(),
            state,
            moves: 0,
            config,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u64 {
        self.scores.score()
    }

    /// Completed moves (rotations that led to a match).
    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn input_enabled(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Fill every empty cell through the color policy.
    pub fn request_initial_population(
        &mut self,
    ) -> Result<CommandResult<PopulateOutcome>, EngineError> {
        if self.state != SessionState::AwaitingPopulation {
            let reason = match self.state {
                SessionState::GameOver => IgnoreReason::GameOver,
                SessionState::Busy => IgnoreReason::InputDisabled,
                _ => IgnoreReason::AlreadyPopulated,
            };
            return Ok(CommandResult::quiet(PopulateOutcome::Ignored { reason }));
        }
        self.state = SessionState::Busy;

        let mut events = Vec::new();
        let bomb_moves = self.config.bomb_initial_moves;
        let mut ctx = CascadeContext {
            board: &mut self.board,
            colors: &self.colors,
            scores: &mut self.scores,
            rng: &mut self.rng,
            timings: &self.config.timings,
            events: &mut events,
        };
        for c in ctx.board.vacant_coordinates() {
            spawn_tile(&mut ctx, c, bomb_moves)?;
        }
        let tiles = events.len();
        tracing::info!(
            width = self.config.width,
            height = self.config.height,
            tiles,
            "board populated"
        );

        self.state = SessionState::Ready;
        self.listeners.publish(&events);
        Ok(CommandResult {
            outcome: PopulateOutcome::Populated { tiles },
            events,
        })
    }

    /// Rotate the triple at the selection point nearest `world`.
    pub fn issue_rotate(
        &mut self,
        world: WorldPoint,
        clockwise: bool,
    ) -> Result<CommandResult<RotateOutcome>, EngineError> {
        match self.topology.nearest_selection_point(world) {
            Some(point) => self.issue_rotate_at(point.index, clockwise),
            None => Ok(CommandResult::quiet(RotateOutcome::Ignored {
                reason: IgnoreReason::NoTriple,
            })),
        }
    }

    /// Rotate the triple at selection point `index`.
    pub fn issue_rotate_at(
        &mut self,
        index: usize,
        clockwise: bool,
    ) -> Result<CommandResult<RotateOutcome>, EngineError> {
        let ignored = |reason| Ok(CommandResult::quiet(RotateOutcome::Ignored { reason }));
        match self.state {
            SessionState::Ready => {}
            SessionState::GameOver => return ignored(IgnoreReason::GameOver),
            SessionState::Busy => return ignored(IgnoreReason::InputDisabled),
            SessionState::AwaitingPopulation => return ignored(IgnoreReason::NotPopulated),
        }
        let Some(point) = self.topology.selection_point(index).copied() else {
            return ignored(IgnoreReason::NoTriple);
        };

        self.state = SessionState::Busy;
        let mut events = Vec::new();
        let rotation = rotate_hexagons(
            &mut self.board,
            &self.topology,
            &point,
            clockwise,
            self.config.timings.rotate_secs,
            &mut events,
        );

        let (attempts, moved) = match rotation {
            RotationResult::NoTriple => {
                self.state = SessionState::Ready;
                return ignored(IgnoreReason::NoTriple);
            }
            RotationResult::Exhausted => {
                self.state = SessionState::Ready;
                self.listeners.publish(&events);
                return Ok(CommandResult {
                    outcome: RotateOutcome::NoMatch,
                    events,
                });
            }
            RotationResult::Matched { attempts, moved, .. } => (attempts, moved),
        };

        let mut ctx = CascadeContext {
            board: &mut self.board,
            colors: &self.colors,
            scores: &mut self.scores,
            rng: &mut self.rng,
            timings: &self.config.timings,
            events: &mut events,
        };
        // Leaves the session Busy on failure: a fatal error ends input.
        let report = self.resolver.resolve(&mut ctx, &moved)?;
        self.moves += 1;
        events.push(GameEvent::MoveCompleted);

        let outcome = self.finish_move(&report.bombs_spawned, &mut events);
        let outcome = outcome.unwrap_or(RotateOutcome::Moved {
            attempts,
            destroyed: report.destroyed,
            cascade_rounds: report.rounds,
            score: self.scores.score(),
        });
        self.listeners.publish(&events);
        Ok(CommandResult { outcome, events })
    }

    /// Count down bombs after a completed move. Returns the game-over
    /// outcome if any bomb ran out.
    fn finish_move(
        &mut self,
        spawned_this_move: &BTreeSet<TileId>,
        events: &mut Vec<GameEvent>,
    ) -> Option<RotateOutcome> {
        let detonated = tick_bombs(&mut self.board, spawned_this_move, events);
        if detonated.is_empty() {
            self.state = SessionState::Ready;
            return None;
        }
        let final_score = self.scores.score();
        tracing::info!(final_score, moves = self.moves, bombs = detonated.len(), "game over");
        self.state = SessionState::GameOver;
        events.push(GameEvent::GameOver { final_score });
        Some(RotateOutcome::GameOver { final_score })
    }
}
