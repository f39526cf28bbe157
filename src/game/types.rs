//! Domain types for the hexagon board.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::coords::Coordinate;

/// Componentwise tolerance for color equality, on the 0..1 channel scale.
pub const COLOR_TOLERANCE: f32 = 0.01;

/// Stable tile identity. Survives moves and rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u64);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// RGBA color on a 0..1 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "default_alpha")]
    pub a: f32,
}

fn default_alpha() -> f32 {
    1.0
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Tolerant equality: every channel within `COLOR_TOLERANCE`.
    pub fn matches(&self, other: &Color) -> bool {
        (self.r - other.r).abs() < COLOR_TOLERANCE
            && (self.g - other.g).abs() < COLOR_TOLERANCE
            && (self.b - other.b).abs() < COLOR_TOLERANCE
            && (self.a - other.a).abs() < COLOR_TOLERANCE
    }

    pub fn matches_both(&self, first: &Color, second: &Color) -> bool {
        self.matches(first) && self.matches(second) && first.matches(second)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TileKind {
    Normal,
    Bomb { moves_left: u32 },
}

impl TileKind {
    pub fn is_bomb(&self) -> bool {
        matches!(self, TileKind::Bomb { .. })
    }
}

/// A live tile. Color is fixed at spawn; coordinate changes as it moves.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: TileId,
    pub coordinate: Coordinate,
    pub color: Color,
    pub kind: TileKind,
}

impl Tile {
    pub fn is_bomb(&self) -> bool {
        self.kind.is_bomb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_matches_within_tolerance() {
        let a = Color::rgb(0.2, 0.4, 0.6);
        let b = Color::rgb(0.205, 0.395, 0.6);
        assert!(a.matches(&b));
    }

    #[test]
    fn test_color_differs_beyond_tolerance() {
        let a = Color::rgb(0.2, 0.4, 0.6);
        let b = Color::rgb(0.2, 0.42, 0.6);
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_alpha_participates_in_comparison() {
        let a = Color::rgb(1.0, 0.0, 0.0);
        let b = Color { a: 0.5, ..a };
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_color_deserializes_with_default_alpha() {
        let c: Color = serde_json::from_str(r#"{"r":0.1,"g":0.2,"b":0.3}"#).unwrap();
        assert_eq!(c.a, 1.0);
    }
}
