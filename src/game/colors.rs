//! Color policy: pick a spawn color that cannot complete a triangle.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::error::EngineError;

use super::board::Board;
use super::coords::{Coordinate, Direction};
use super::types::Color;

/// Palette plus the exclusion rule applied to every spawned tile.
#[derive(Debug, Clone)]
pub struct ColorPolicy {
    palette: Vec<Color>,
}

impl ColorPolicy {
    pub fn new(palette: Vec<Color>) -> Self {
        Self { palette }
    }

    /// Colors a tile at `target` must not take.
    ///
    /// Occupied neighbors are collected clockwise from `Above`; every
    /// consecutive pair (wrapping) that already shares a color excludes it.
    pub fn excluded_colors(&self, target: Coordinate, board: &Board) -> Vec<Color> {
        let neighbors: Vec<Color> = Direction::CLOCKWISE
            .iter()
            .filter_map(|&d| board.neighbor(target, d))
            .map(|t| t.color)
            .collect();

        let mut excluded: Vec<Color> = Vec::new();
        if neighbors.len() < 2 {
            return excluded;
        }
        for i in 0..neighbors.len() {
            let first = neighbors[i];
            let second = neighbors[(i + 1) % neighbors.len()];
            if first.matches(&second) && !excluded.iter().any(|c| c.matches(&first)) {
                excluded.push(first);
            }
        }
        excluded
    }

    /// Uniform choice among palette colors that survive exclusion.
    pub fn choose_color<R: Rng + ?Sized>(
        &self,
        target: Coordinate,
        board: &Board,
        rng: &mut R,
    ) -> Result<Color, EngineError> {
        let excluded = self.excluded_colors(target, board);
        let allowed: Vec<Color> = self
            .palette
            .iter()
            .filter(|c| !excluded.iter().any(|e| e.matches(c)))
            .copied()
            .collect();
        allowed
            .choose(rng)
            .copied()
            .ok_or(EngineError::PolicyExhausted { coordinate: target })
    }
}
