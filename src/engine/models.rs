//! Events emitted to rendering/UI collaborators and command outcomes.

use serde::{Deserialize, Serialize};

use crate::game::coords::Coordinate;
use crate::game::topology::WorldPoint;
use crate::game::types::{Color, TileId, TileKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    TileSpawned {
        tile_id: TileId,
        coordinate: Coordinate,
        color: Color,
        kind: TileKind,
        world_from: WorldPoint,
        world_to: WorldPoint,
        duration: f32,
    },
    TileMoved {
        tile_id: TileId,
        from: Coordinate,
        to: Coordinate,
        world_from: WorldPoint,
        world_to: WorldPoint,
        duration: f32,
    },
    TileDestroyed {
        tile_id: TileId,
    },
    ScoreChanged {
        score: u64,
    },
    BombTicked {
        tile_id: TileId,
        moves_left: u32,
    },
    MoveCompleted,
    GameOver {
        final_score: u64,
    },
}

/// Why a command was dropped without touching the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    InputDisabled,
    GameOver,
    NotPopulated,
    AlreadyPopulated,
    /// Fewer than three tiles around the selection point.
    NoTriple,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RotateOutcome {
    Ignored { reason: IgnoreReason },
    /// Three rotations without a match; the board is as it was.
    NoMatch,
    Moved {
        attempts: u8,
        destroyed: usize,
        cascade_rounds: usize,
        score: u64,
    },
    GameOver {
        final_score: u64,
    },
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    AwaitingPopulation,
    Ready,
    /// A command is in flight; input is disabled.
    Busy,
    GameOver,
}
