//! Bomb tiles: move countdown and color-wide blast.

use std::collections::BTreeSet;

use crate::engine::models::GameEvent;

use super::board::Board;
use super::types::{TileId, TileKind};

pub const DEFAULT_BOMB_MOVES: u32 = 7;

/// Every live tile sharing the bomb's color, the bomb included.
pub fn blast_radius(board: &Board, bomb: TileId) -> BTreeSet<TileId> {
    let mut hit = BTreeSet::new();
    let Some(tile) = board.tile(bomb) else {
        return hit;
    };
    let color = tile.color;
    hit.extend(board.tiles().filter(|t| t.color.matches(&color)).map(|t| t.id));
    hit.insert(bomb);
    hit
}

/// Decrement every live bomb not in `exempt` by one move.
///
/// Returns the ids of bombs whose counter reached zero.
pub fn tick_bombs(
    board: &mut Board,
    exempt: &BTreeSet<TileId>,
    events: &mut Vec<GameEvent>,
) -> Vec<TileId> {
    let ids: Vec<TileId> = board
        .bombs()
        .map(|t| t.id)
        .filter(|id| !exempt.contains(id))
        .collect();
    let mut detonated = Vec::new();
    for id in ids {
        let Some(tile) = board.tile_mut(id) else {
            continue;
        };
        if let TileKind::Bomb { moves_left } = &mut tile.kind {
            *moves_left = moves_left.saturating_sub(1);
            events.push(GameEvent::BombTicked {
                tile_id: id,
                moves_left: *moves_left,
            });
            if *moves_left == 0 {
                detonated.push(id);
            }
        }
    }
    detonated
}
