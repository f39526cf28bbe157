//! Offset-hex coordinates and the clockwise neighbor table.
//!
//! Columns are packed vertically: odd columns sit half a cell lower than
//! even columns, so the diagonal neighbors of a cell depend on the parity
//! of its column.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A lattice cell: (column, row). Neighbors of edge cells may fall outside
/// the board, so both components are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub column: i32,
    pub row: i32,
}

impl Coordinate {
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    pub fn is_odd_column(&self) -> bool {
        self.column % 2 != 0
    }

    /// The cell in `direction` from this one.
    pub fn neighbor(&self, direction: Direction) -> Coordinate {
        let (dc, dr) = direction.delta(self.column);
        Coordinate::new(self.column + dc, self.row + dr)
    }

    /// All six neighbors in clockwise order starting at `Above`.
    pub fn neighbors(&self) -> [Coordinate; 6] {
        Direction::CLOCKWISE.map(|d| self.neighbor(d))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.column, self.row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Above,
    AboveRight,
    BelowRight,
    Below,
    BelowLeft,
    AboveLeft,
}

impl Direction {
    /// Clockwise from `Above`. Match detection and color exclusion pair
    /// entry i with entry (i + 1) % 6, so this order is load-bearing.
    pub const CLOCKWISE: [Direction; 6] = [
        Direction::Above,
        Direction::AboveRight,
        Direction::BelowRight,
        Direction::Below,
        Direction::BelowLeft,
        Direction::AboveLeft,
    ];

    /// (column, row) delta for a cell in `column`.
    pub fn delta(self, column: i32) -> (i32, i32) {
        let odd = column % 2 != 0;
        match self {
            Direction::Above => (0, 1),
            Direction::Below => (0, -1),
            Direction::AboveRight if odd => (1, 0),
            Direction::AboveRight => (1, 1),
            Direction::BelowRight if odd => (1, -1),
            Direction::BelowRight => (1, 0),
            Direction::BelowLeft if odd => (-1, -1),
            Direction::BelowLeft => (-1, 0),
            Direction::AboveLeft if odd => (-1, 0),
            Direction::AboveLeft => (-1, 1),
        }
    }
}

/// Adjacent clockwise direction pairs: (Above, AboveRight), ..., (AboveLeft, Above).
pub fn clockwise_pairs() -> impl Iterator<Item = (Direction, Direction)> {
    (0..6).map(|i| (Direction::CLOCKWISE[i], Direction::CLOCKWISE[(i + 1) % 6]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_neighbors_ignore_parity() {
        for c in [Coordinate::new(2, 3), Coordinate::new(3, 3)] {
            assert_eq!(c.neighbor(Direction::Above), Coordinate::new(c.column, 4));
            assert_eq!(c.neighbor(Direction::Below), Coordinate::new(c.column, 2));
        }
    }

    #[test]
    fn test_odd_column_upper_diagonals_share_row() {
        let c = Coordinate::new(3, 2);
        assert_eq!(c.neighbor(Direction::AboveLeft), Coordinate::new(2, 2));
        assert_eq!(c.neighbor(Direction::AboveRight), Coordinate::new(4, 2));
        assert_eq!(c.neighbor(Direction::BelowLeft), Coordinate::new(2, 1));
        assert_eq!(c.neighbor(Direction::BelowRight), Coordinate::new(4, 1));
    }

    #[test]
    fn test_even_column_lower_diagonals_share_row() {
        let c = Coordinate::new(2, 2);
        assert_eq!(c.neighbor(Direction::AboveLeft), Coordinate::new(1, 3));
        assert_eq!(c.neighbor(Direction::AboveRight), Coordinate::new(3, 3));
        assert_eq!(c.neighbor(Direction::BelowLeft), Coordinate::new(1, 2));
        assert_eq!(c.neighbor(Direction::BelowRight), Coordinate::new(3, 2));
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        for column in 0..4 {
            let c = Coordinate::new(column, 5);
            for d in Direction::CLOCKWISE {
                let n = c.neighbor(d);
                assert!(n.neighbors().contains(&c), "{d:?} from {c}");
            }
        }
    }

    #[test]
    fn test_clockwise_pairs_wrap() {
        let pairs: Vec<_> = clockwise_pairs().collect();
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0], (Direction::Above, Direction::AboveRight));
        assert_eq!(pairs[5], (Direction::AboveLeft, Direction::Above));
    }
}
