//! Three-tile rotation around a selection point.

use std::collections::BTreeSet;

use crate::engine::models::GameEvent;

use super::board::Board;
use super::matching::matches_around;
use super::topology::{cell_world_position, SelectionPoint, Topology};
use super::types::TileId;

/// Rotations tried per command; three steps of a 3-cycle is the identity.
pub const MAX_ROTATIONS: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationResult {
    /// Fewer than three tiles around the point.
    NoTriple,
    /// A step produced a match and rotation stopped there.
    Matched {
        attempts: u8,
        moved: [TileId; 3],
        matched: BTreeSet<TileId>,
    },
    /// All attempts were made without a match; placement is back where it started.
    Exhausted,
}

/// Whether the triangle points the other way, so walking the list forward
/// would turn the tiles against the requested direction.
pub fn is_inverted(board: &Board, tiles: &[TileId; 3], clockwise: bool) -> bool {
    let x = |id: TileId| {
        board
            .tile(id)
            .map(|t| cell_world_position(t.coordinate).x)
            .unwrap_or_default()
    };
    let (x0, x1) = (x(tiles[0]), x(tiles[1]));
    if clockwise {
        x1 < x0
    } else {
        x1 > x0
    }
}

/// Cycle three tiles, ordered topmost first, one step.
///
/// Each tile takes the cell of the next tile in list order, or of the
/// previous one when the layout is inverted. Board indexing is updated
/// immediately; the emitted moves describe the animation.
pub fn rotate_once(
    board: &mut Board,
    tiles: [TileId; 3],
    clockwise: bool,
    duration: f32,
    events: &mut Vec<GameEvent>,
) -> bool {
    let mut cells = Vec::with_capacity(3);
    for id in tiles {
        match board.tile(id) {
            Some(t) => cells.push(t.coordinate),
            None => return false,
        }
    }
    let step = if is_inverted(board, &tiles, clockwise) { 2 } else { 1 };
    let moves: Vec<_> = (0..3).map(|i| (tiles[i], cells[(i + step) % 3])).collect();
    if !board.permute(&moves) {
        return false;
    }
    for (i, &(id, to)) in moves.iter().enumerate() {
        events.push(GameEvent::TileMoved {
            tile_id: id,
            from: cells[i],
            to,
            world_from: cell_world_position(cells[i]),
            world_to: cell_world_position(to),
            duration,
        });
    }
    true
}

/// Rotate the triple at `point` up to `MAX_ROTATIONS` times, stopping at
/// the first step whose rotated tiles form a match.
///
/// The triple is re-read after every step so the list stays ordered by
/// position and each step applies the same permutation of cells.
pub fn rotate_hexagons(
    board: &mut Board,
    topology: &Topology,
    point: &SelectionPoint,
    clockwise: bool,
    duration: f32,
    events: &mut Vec<GameEvent>,
) -> RotationResult {
    for attempt in 1..=MAX_ROTATIONS {
        let Some(tiles) = topology.tiles_near_selection_point(point, board) else {
            return RotationResult::NoTriple;
        };
        if !rotate_once(board, tiles, clockwise, duration, events) {
            return RotationResult::NoTriple;
        }
        let matched = matches_around(board, tiles);
        if !matched.is_empty() {
            tracing::debug!(point = point.index, attempt, matched = matched.len(), "rotation matched");
            return RotationResult::Matched {
                attempts: attempt,
                moved: tiles,
                matched,
            };
        }
    }
    RotationResult::Exhausted
}
