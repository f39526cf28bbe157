//! Match detection: same-colored triangles around a tile.

use std::collections::BTreeSet;

use super::board::Board;
use super::coords::clockwise_pairs;
use super::types::TileId;

/// Smallest run that counts as a match: the center and two neighbors.
pub const MIN_MATCH: usize = 3;

/// Tiles forming same-colored triangles with `id` at the center.
///
/// Always contains `id` itself when it is on the board, so a result of
/// size 1 means no match. Anything larger has at least `MIN_MATCH` tiles.
pub fn adjacent_same_color_run(board: &Board, id: TileId) -> BTreeSet<TileId> {
    let mut run = BTreeSet::new();
    let Some(center) = board.tile(id) else {
        return run;
    };
    run.insert(id);
    for (a, b) in clockwise_pairs() {
        let (Some(first), Some(second)) = (
            board.neighbor(center.coordinate, a),
            board.neighbor(center.coordinate, b),
        ) else {
            continue;
        };
        if center.color.matches_both(&first.color, &second.color) {
            run.insert(first.id);
            run.insert(second.id);
        }
    }
    run
}

pub fn is_match(run: &BTreeSet<TileId>) -> bool {
    run.len() >= MIN_MATCH
}

/// Union of every non-trivial run centered on one of `ids`.
pub fn matches_around<I>(board: &Board, ids: I) -> BTreeSet<TileId>
where
    I: IntoIterator<Item = TileId>,
{
    let mut matched = BTreeSet::new();
    for id in ids {
        let run = adjacent_same_color_run(board, id);
        if is_match(&run) {
            matched.extend(run);
        }
    }
    matched
}
