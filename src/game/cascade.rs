//! Cascade resolution: settle, clear, fall, refill, repeat.
//!
//! A cascade starts from the tiles a rotation just moved and loops until a
//! settle pass finds nothing. Each sub-phase is public so tools and tests
//! can drive the machine one step at a time; `resolve` runs the full loop.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::engine::config::AnimationTimings;
use crate::engine::error::EngineError;
use crate::engine::models::GameEvent;

use super::board::Board;
use super::bomb::blast_radius;
use super::colors::ColorPolicy;
use super::coords::{Coordinate, Direction};
use super::matching::matches_around;
use super::scoring::ScoreKeeper;
use super::topology::{cell_world_position, WorldPoint};
use super::types::{TileId, TileKind};

/// New tiles start this far above their cell.
pub const SPAWN_HEIGHT: f32 = 15.0;
const MAX_CASCADE_ROUNDS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadePhase {
    Idle,
    Settling,
    Clearing,
    Falling,
    Refilling,
}

/// Borrowed session state a cascade operates on.
pub struct CascadeContext<'a> {
    pub board: &'a mut Board,
    pub colors: &'a ColorPolicy,
    pub scores: &'a mut ScoreKeeper,
    pub rng: &'a mut StdRng,
    pub timings: &'a AnimationTimings,
    pub events: &'a mut Vec<GameEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Settle passes that found a match.
    pub rounds: usize,
    pub destroyed: usize,
    pub bombs_spawned: BTreeSet<TileId>,
}

#[derive(Debug, Clone)]
pub struct CascadeResolver {
    phase: CascadePhase,
    /// Set only for the duration of `resolve`.
    active: bool,
    bomb_moves: u32,
}

impl CascadeResolver {
    pub fn new(bomb_moves: u32) -> Self {
        Self {
            phase: CascadePhase::Idle,
            active: false,
            bomb_moves,
        }
    }

    pub fn phase(&self) -> CascadePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Record the sub-phase of a running cascade. Standalone step calls
    /// leave the resolver idle.
    fn enter(&mut self, phase: CascadePhase) {
        if self.active {
            self.phase = phase;
        }
    }

    /// Run the cascade to a fixed point starting from `just_moved`.
    ///
    /// Starting while a cascade is already running is a programming error
    /// and returns `ReentrancyViolation` without touching the board.
    pub fn resolve(
        &mut self,
        ctx: &mut CascadeContext<'_>,
        just_moved: &[TileId],
    ) -> Result<CascadeReport, EngineError> {
        if self.is_active() {
            return Err(EngineError::ReentrancyViolation);
        }
        self.active = true;
        let result = self.run(ctx, just_moved);
        self.active = false;
        self.phase = CascadePhase::Idle;
        result
    }

    fn run(
        &mut self,
        ctx: &mut CascadeContext<'_>,
        just_moved: &[TileId],
    ) -> Result<CascadeReport, EngineError> {
        let mut report = CascadeReport::default();
        let mut pending: BTreeSet<TileId> = just_moved.iter().copied().collect();

        while report.rounds < MAX_CASCADE_ROUNDS {
            let matched = self.settle(ctx.board, pending.iter().copied());
            if matched.is_empty() {
                break;
            }
            report.rounds += 1;
            report.destroyed += self.clear(ctx, &matched);

            pending = self.fall(ctx.board, ctx.timings, ctx.events);
            let spawned = self.refill(ctx)?;
            for &id in &spawned {
                if ctx.board.tile(id).is_some_and(|t| t.is_bomb()) {
                    report.bombs_spawned.insert(id);
                }
            }
            // A bomb caught by a later blast no longer exists.
            report.bombs_spawned.retain(|id| ctx.board.tile(*id).is_some());
            tracing::debug!(
                round = report.rounds,
                matched = matched.len(),
                fell = pending.len(),
                spawned = spawned.len(),
                "cascade round"
            );
            pending.extend(spawned);
        }
        if report.rounds == MAX_CASCADE_ROUNDS {
            tracing::warn!(rounds = report.rounds, "cascade round limit reached");
        }
        Ok(report)
    }

    /// Union of the matches centered on each of `ids`.
    pub fn settle<I>(&mut self, board: &Board, ids: I) -> BTreeSet<TileId>
    where
        I: IntoIterator<Item = TileId>,
    {
        self.enter(CascadePhase::Settling);
        matches_around(board, ids)
    }

    /// Remove `matched` and, for every bomb among them, every tile of the
    /// bomb's color. Credits the score. Returns how many tiles were removed.
    pub fn clear(&mut self, ctx: &mut CascadeContext<'_>, matched: &BTreeSet<TileId>) -> usize {
        self.enter(CascadePhase::Clearing);
        let destroy = destroy_set(ctx.board, matched);
        for &id in &destroy {
            if ctx.board.remove(id).is_some() {
                ctx.events.push(GameEvent::TileDestroyed { tile_id: id });
            }
        }
        if !destroy.is_empty() {
            let score = ctx.scores.add_score(destroy.len());
            ctx.events.push(GameEvent::ScoreChanged { score });
        }
        destroy.len()
    }

    /// Drop unsupported tiles one row per pass until every tile rests on
    /// row 0 or on another tile. All tiles found in a pass move together.
    /// Returns every tile that moved.
    pub fn fall(
        &mut self,
        board: &mut Board,
        timings: &AnimationTimings,
        events: &mut Vec<GameEvent>,
    ) -> BTreeSet<TileId> {
        self.enter(CascadePhase::Falling);
        let mut moved = BTreeSet::new();
        loop {
            let unsupported: Vec<(TileId, Coordinate)> = board
                .tiles()
                .filter(|t| t.coordinate.row > 0)
                .map(|t| (t.id, t.coordinate.neighbor(Direction::Below)))
                .filter(|&(_, below)| board.is_vacant(below))
                .collect();
            if unsupported.is_empty() {
                break;
            }
            for (id, to) in unsupported {
                if let Some(from) = board.move_tile(id, to) {
                    events.push(GameEvent::TileMoved {
                        tile_id: id,
                        from,
                        to,
                        world_from: cell_world_position(from),
                        world_to: cell_world_position(to),
                        duration: timings.fall_secs,
                    });
                    moved.insert(id);
                }
            }
        }
        moved
    }

    /// Spawn a tile in every vacant cell, in generation order. The first
    /// spawn after the bomb flag is armed becomes a bomb.
    pub fn refill(&mut self, ctx: &mut CascadeContext<'_>) -> Result<Vec<TileId>, EngineError> {
        self.enter(CascadePhase::Refilling);
        let mut spawned = Vec::new();
        for c in ctx.board.vacant_coordinates() {
            let id = spawn_tile(ctx, c, self.bomb_moves)?;
            spawned.extend(id);
        }
        Ok(spawned)
    }
}

/// Matched tiles plus the color-wide blast of every matched bomb.
pub fn destroy_set(board: &Board, matched: &BTreeSet<TileId>) -> BTreeSet<TileId> {
    let mut destroy = matched.clone();
    for &id in matched {
        if board.tile(id).is_some_and(|t| t.is_bomb()) {
            destroy.extend(blast_radius(board, id));
        }
    }
    destroy
}

/// Spawn one tile at `c` with a policy-chosen color, entering from above.
pub(crate) fn spawn_tile(
    ctx: &mut CascadeContext<'_>,
    c: Coordinate,
    bomb_moves: u32,
) -> Result<Option<TileId>, EngineError> {
    let color = ctx.colors.choose_color(c, ctx.board, ctx.rng)?;
    let kind = if ctx.scores.take_bomb() {
        TileKind::Bomb {
            moves_left: bomb_moves,
        }
    } else {
        TileKind::Normal
    };
    let Some(id) = ctx.board.spawn(c, color, kind) else {
        return Ok(None);
    };
    let world_to = cell_world_position(c);
    ctx.events.push(GameEvent::TileSpawned {
        tile_id: id,
        coordinate: c,
        color,
        kind,
        world_from: WorldPoint::new(world_to.x, world_to.y + SPAWN_HEIGHT),
        world_to,
        duration: ctx.timings.spawn_secs,
    });
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::engine::config::default_palette;
    use crate::game::types::Color;

    struct Fixture {
        board: Board,
        colors: ColorPolicy,
        scores: ScoreKeeper,
        rng: StdRng,
        timings: AnimationTimings,
        events: Vec<GameEvent>,
    }

    impl Fixture {
        fn new(width: u32, height: u32) -> Self {
            Self {
                board: Board::new(width, height),
                colors: ColorPolicy::new(default_palette()),
                scores: ScoreKeeper::new(5, 50),
                rng: StdRng::seed_from_u64(3),
                timings: AnimationTimings::instant(),
                events: Vec::new(),
            }
        }

        fn ctx(&mut self) -> CascadeContext<'_> {
            CascadeContext {
                board: &mut self.board,
                colors: &self.colors,
                scores: &mut self.scores,
                rng: &mut self.rng,
                timings: &self.timings,
                events: &mut self.events,
            }
        }
    }

    fn color(i: usize) -> Color {
        default_palette()[i]
    }

    #[test]
    fn test_fall_reaches_fixed_point() {
        let mut f = Fixture::new(1, 5);
        for row in [0, 2, 4] {
            f.board.spawn(Coordinate::new(0, row), color(row as usize), TileKind::Normal);
        }
        let mut resolver = CascadeResolver::new(7);
        let moved = resolver.fall(&mut f.board, &f.timings, &mut f.events);
        assert_eq!(moved.len(), 2);
        let rows: Vec<i32> = f.board.tiles().map(|t| t.coordinate.row).collect();
        assert_eq!(rows, vec![0, 1, 2]);
        // 2->1 and 4->3 in the first pass, then 3->2.
        assert_eq!(f.events.len(), 3);
        assert!(resolver.fall(&mut f.board, &f.timings, &mut f.events).is_empty());
    }

    #[test]
    fn test_fall_keeps_columns_independent() {
        let mut f = Fixture::new(2, 3);
        f.board.spawn(Coordinate::new(0, 2), color(0), TileKind::Normal);
        f.board.spawn(Coordinate::new(1, 0), color(1), TileKind::Normal);
        let mut resolver = CascadeResolver::new(7);
        resolver.fall(&mut f.board, &f.timings, &mut f.events);
        assert!(f.board.id_at(Coordinate::new(0, 0)).is_some());
        assert!(f.board.id_at(Coordinate::new(1, 0)).is_some());
        assert_eq!(f.board.len(), 2);
    }

    #[test]
    fn test_refill_fills_every_vacancy() {
        let mut f = Fixture::new(4, 4);
        let mut resolver = CascadeResolver::new(7);
        let spawned = resolver.refill(&mut f.ctx()).unwrap();
        assert_eq!(spawned.len(), 16);
        assert!(f.board.is_full());
        assert!(f.board.bombs().next().is_none());
    }

    #[test]
    fn test_refill_on_full_board_is_noop() {
        let mut f = Fixture::new(3, 3);
        let mut resolver = CascadeResolver::new(7);
        resolver.refill(&mut f.ctx()).unwrap();
        f.events.clear();
        let spawned = resolver.refill(&mut f.ctx()).unwrap();
        assert!(spawned.is_empty());
        assert!(f.events.is_empty());
    }

    #[test]
    fn test_armed_flag_spawns_exactly_one_bomb() {
        let mut f = Fixture::new(4, 4);
        f.scores.add_score(10);
        assert!(f.scores.bomb_pending());
        let mut resolver = CascadeResolver::new(7);
        resolver.refill(&mut f.ctx()).unwrap();
        let bombs: Vec<_> = f.board.bombs().collect();
        assert_eq!(bombs.len(), 1);
        assert_eq!(bombs[0].coordinate, Coordinate::new(0, 0));
        assert_eq!(bombs[0].kind, TileKind::Bomb { moves_left: 7 });
        assert!(!f.scores.bomb_pending());
    }

    #[test]
    fn test_spawn_enters_from_above() {
        let mut f = Fixture::new(2, 2);
        let mut resolver = CascadeResolver::new(7);
        resolver.refill(&mut f.ctx()).unwrap();
        match &f.events[0] {
            GameEvent::TileSpawned { world_from, world_to, .. } => {
                assert_eq!(world_from.x, world_to.x);
                assert_eq!(world_from.y, world_to.y + SPAWN_HEIGHT);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bomb_blast_clears_its_whole_color() {
        let mut f = Fixture::new(6, 6);
        let red = color(0);
        // Matched triangle containing a red bomb.
        let bomb = f
            .board
            .spawn(Coordinate::new(0, 0), red, TileKind::Bomb { moves_left: 4 })
            .unwrap();
        f.board.spawn(Coordinate::new(0, 1), red, TileKind::Normal);
        f.board.spawn(Coordinate::new(1, 1), red, TileKind::Normal);
        // Scattered reds far away.
        f.board.spawn(Coordinate::new(5, 5), red, TileKind::Normal);
        f.board.spawn(Coordinate::new(3, 0), red, TileKind::Normal);
        let other = f.board.spawn(Coordinate::new(4, 4), color(1), TileKind::Normal).unwrap();

        let mut resolver = CascadeResolver::new(7);
        let matched = resolver.settle(&f.board, [bomb]);
        assert_eq!(matched.len(), 3);
        let removed = resolver.clear(&mut f.ctx(), &matched);
        assert_eq!(removed, 5);
        assert_eq!(f.board.tiles().filter(|t| t.color.matches(&red)).count(), 0);
        assert!(f.board.tile(other).is_some());
        assert_eq!(f.scores.score(), 25);
    }

    #[test]
    fn test_settle_on_quiet_board_is_idempotent() {
        let mut f = Fixture::new(5, 5);
        let mut resolver = CascadeResolver::new(7);
        resolver.refill(&mut f.ctx()).unwrap();
        f.events.clear();
        let ids: Vec<TileId> = f.board.tiles().map(|t| t.id).collect();
        let report = resolver.resolve(&mut f.ctx(), &ids).unwrap();
        assert_eq!(report, CascadeReport::default());
        assert_eq!(f.scores.score(), 0);
        assert!(f.events.is_empty());
        assert_eq!(resolver.phase(), CascadePhase::Idle);
    }

    #[test]
    fn test_resolve_refills_after_match() {
        let mut f = Fixture::new(4, 4);
        let mut resolver = CascadeResolver::new(7);
        resolver.refill(&mut f.ctx()).unwrap();
        // Force a triangle by repainting three cells blue-ish.
        let paint = Color::rgb(0.0, 0.0, 0.0);
        let cells = [Coordinate::new(0, 0), Coordinate::new(0, 1), Coordinate::new(1, 1)];
        let mut ids = Vec::new();
        for c in cells {
            let old = f.board.id_at(c).unwrap();
            f.board.remove(old);
            ids.push(f.board.spawn(c, paint, TileKind::Normal).unwrap());
        }
        f.events.clear();
        let report = resolver.resolve(&mut f.ctx(), &ids).unwrap();
        assert!(report.rounds >= 1);
        assert!(report.destroyed >= 3);
        assert!(f.board.is_full());
        for id in ids {
            assert!(f.board.tile(id).is_none());
        }
        assert!(f.scores.score() >= 15);
    }

    #[test]
    fn test_reentrant_resolve_is_rejected() {
        let mut f = Fixture::new(3, 3);
        let mut resolver = CascadeResolver::new(7);
        resolver.active = true;
        resolver.phase = CascadePhase::Falling;
        let err = resolver.resolve(&mut f.ctx(), &[]).unwrap_err();
        assert_eq!(err, EngineError::ReentrancyViolation);
        assert_eq!(resolver.phase(), CascadePhase::Falling);
        assert!(f.board.is_empty());
    }

    #[test]
    fn test_standalone_steps_leave_resolver_idle() {
        let mut f = Fixture::new(3, 3);
        let mut resolver = CascadeResolver::new(7);
        resolver.fall(&mut f.board, &f.timings, &mut f.events);
        assert_eq!(resolver.phase(), CascadePhase::Idle);
        assert!(!resolver.is_active());
        resolver.settle(&f.board, Vec::<TileId>::new());
        resolver.refill(&mut f.ctx()).unwrap();
        assert!(!resolver.is_active());

        let report = resolver.resolve(&mut f.ctx(), &[]).unwrap();
        assert_eq!(report, CascadeReport::default());
        assert!(!resolver.is_active());
    }

    #[test]
    fn test_destroy_set_without_bombs_is_match() {
        let mut board = Board::new(3, 3);
        let a = board.spawn(Coordinate::new(0, 0), color(0), TileKind::Normal).unwrap();
        board.spawn(Coordinate::new(2, 2), color(0), TileKind::Normal).unwrap();
        let matched = BTreeSet::from([a]);
        assert_eq!(destroy_set(&board, &matched), matched);
    }
}
