//! Board geometry: world positions of cells and the selection-point lattice.
//!
//! World units are tile diameters. Every selection point sits at the
//! centroid of three mutually adjacent cells; the player picks a point and
//! the three tiles around it are rotated.

use serde::{Deserialize, Serialize};

use super::board::Board;
use super::coords::Coordinate;
use super::types::TileId;

pub const COLUMN_SPACING: f32 = 0.75;
pub const ROW_SPACING: f32 = 0.866;
/// Odd columns sit this much lower than even columns.
pub const ODD_COLUMN_DROP: f32 = 0.433;
/// Cell centers are 0.5 from the centroid of their triangle and at least
/// 1.0 from any other selection point's centroid.
pub const CAPTURE_RADIUS: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
}

impl WorldPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &WorldPoint) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

/// A rotation pivot between three board cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionPoint {
    /// Position in generation order.
    pub index: usize,
    pub position: WorldPoint,
    pub cells: [Coordinate; 3],
}

/// Fixed-size rectangular hex lattice.
#[derive(Debug, Clone)]
pub struct Topology {
    width: i32,
    height: i32,
    selection_points: Vec<SelectionPoint>,
}

impl Topology {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width as i32;
        let height = height as i32;
        let selection_points = generate_selection_points(width, height);
        Self {
            width,
            height,
            selection_points,
        }
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        c.column >= 0 && c.column < self.width && c.row >= 0 && c.row < self.height
    }

    /// Every cell, column by column, bottom row first.
    pub fn all_coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.width)
            .flat_map(move |column| (0..self.height).map(move |row| Coordinate::new(column, row)))
    }

    pub fn selection_points(&self) -> &[SelectionPoint] {
        &self.selection_points
    }

    pub fn selection_point(&self, index: usize) -> Option<&SelectionPoint> {
        self.selection_points.get(index)
    }

    /// Nearest point by Euclidean distance; on exact ties the earliest in
    /// generation order wins.
    pub fn nearest_selection_point(&self, target: WorldPoint) -> Option<&SelectionPoint> {
        nearest(&self.selection_points, target)
    }

    /// The three live tiles captured by `point`, topmost first (ties broken
    /// by ascending x). `None` when fewer than three are present.
    pub fn tiles_near_selection_point(
        &self,
        point: &SelectionPoint,
        board: &Board,
    ) -> Option<[TileId; 3]> {
        let mut captured: Vec<(TileId, WorldPoint)> = point
            .cells
            .iter()
            .filter_map(|&c| board.tile_at(c))
            .map(|t| (t.id, cell_world_position(t.coordinate)))
            .filter(|(_, pos)| pos.distance(&point.position) <= CAPTURE_RADIUS)
            .collect();
        if captured.len() != 3 {
            return None;
        }
        captured.sort_by(|(_, a), (_, b)| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));
        Some([captured[0].0, captured[1].0, captured[2].0])
    }
}

/// Center of a cell in world units.
pub fn cell_world_position(c: Coordinate) -> WorldPoint {
    let x = c.column as f32 * COLUMN_SPACING;
    let mut y = c.row as f32 * ROW_SPACING;
    if c.is_odd_column() {
        y -= ODD_COLUMN_DROP;
    }
    WorldPoint::new(x, y)
}

fn nearest(points: &[SelectionPoint], target: WorldPoint) -> Option<&SelectionPoint> {
    let mut best: Option<(&SelectionPoint, f32)> = None;
    for point in points {
        let d = point.position.distance_squared(&target);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((point, d)),
        }
    }
    best.map(|(p, _)| p)
}

fn centroid(cells: &[Coordinate; 3]) -> WorldPoint {
    let (sx, sy) = cells
        .iter()
        .map(|&c| cell_world_position(c))
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    WorldPoint::new(sx / 3.0, sy / 3.0)
}

/// For a vertical pair of cells at rows (r, r+1) in `column`, the row of
/// the cell in a neighboring column that touches both.
fn apex_row(column: i32, row: i32) -> i32 {
    if column % 2 == 0 {
        row + 1
    } else {
        row
    }
}

/// Columns left to right, rows bottom to top. Between columns c and c+1
/// each row yields two triangles: the pair in c with its apex in c+1, then
/// the pair in c+1 with its apex in c.
fn generate_selection_points(width: i32, height: i32) -> Vec<SelectionPoint> {
    let mut points = Vec::new();
    for column in 0..width - 1 {
        for row in 0..height - 1 {
            let left_pair = [
                Coordinate::new(column, row),
                Coordinate::new(column, row + 1),
                Coordinate::new(column + 1, apex_row(column, row)),
            ];
            let right_pair = [
                Coordinate::new(column + 1, row),
                Coordinate::new(column + 1, row + 1),
                Coordinate::new(column, apex_row(column + 1, row)),
            ];
            for cells in [left_pair, right_pair] {
                points.push(SelectionPoint {
                    index: points.len(),
                    position: centroid(&cells),
                    cells,
                });
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::{Color, TileKind};

    fn full_board(width: u32, height: u32) -> Board {
        let mut board = Board::new(width, height);
        let topo = Topology::new(width, height);
        for c in topo.all_coordinates() {
            board.spawn(c, Color::rgb(0.5, 0.5, 0.5), TileKind::Normal);
        }
        board
    }

    #[test]
    fn test_cell_world_position_drops_odd_columns() {
        assert_eq!(cell_world_position(Coordinate::new(0, 1)), WorldPoint::new(0.0, 0.866));
        let p = cell_world_position(Coordinate::new(1, 1));
        assert!((p.x - 0.75).abs() < 1e-6);
        assert!((p.y - 0.433).abs() < 1e-6);
    }

    #[test]
    fn test_all_coordinates_column_major() {
        let topo = Topology::new(2, 3);
        let coords: Vec<_> = topo.all_coordinates().collect();
        assert_eq!(coords.len(), 6);
        assert_eq!(coords[0], Coordinate::new(0, 0));
        assert_eq!(coords[2], Coordinate::new(0, 2));
        assert_eq!(coords[3], Coordinate::new(1, 0));
    }

    #[test]
    fn test_selection_point_count() {
        // Two triangles per (column pair, row pair).
        let topo = Topology::new(8, 9);
        assert_eq!(topo.selection_points().len(), 2 * 7 * 8);
    }

    #[test]
    fn test_selection_points_are_triangles_of_neighbors() {
        let topo = Topology::new(5, 4);
        for p in topo.selection_points() {
            for (i, a) in p.cells.iter().enumerate() {
                assert!(topo.contains(*a), "{a} outside board");
                for b in &p.cells[i + 1..] {
                    assert!(a.neighbors().contains(b), "{a} and {b} not adjacent in point {}", p.index);
                }
            }
        }
    }

    #[test]
    fn test_capture_radius_isolates_three_cells() {
        let topo = Topology::new(6, 6);
        for p in topo.selection_points() {
            let inside: Vec<_> = topo
                .all_coordinates()
                .filter(|&c| cell_world_position(c).distance(&p.position) <= CAPTURE_RADIUS)
                .collect();
            assert_eq!(inside.len(), 3, "point {} captures {:?}", p.index, inside);
            for c in inside {
                assert!(p.cells.contains(&c));
            }
        }
    }

    #[test]
    fn test_nearest_selection_point_exact_hit() {
        let topo = Topology::new(4, 4);
        for p in topo.selection_points() {
            let nearest = topo.nearest_selection_point(p.position).unwrap();
            assert_eq!(nearest.index, p.index);
        }
    }

    #[test]
    fn test_nearest_tie_prefers_generation_order() {
        let cells = [Coordinate::new(0, 0); 3];
        let points = [
            SelectionPoint { index: 0, position: WorldPoint::new(-1.0, 0.0), cells },
            SelectionPoint { index: 1, position: WorldPoint::new(1.0, 0.0), cells },
        ];
        assert_eq!(nearest(&points, WorldPoint::new(0.0, 0.0)).unwrap().index, 0);
        assert_eq!(nearest(&points, WorldPoint::new(0.1, 0.0)).unwrap().index, 1);
    }

    #[test]
    fn test_nearest_selection_point_empty_topology() {
        let topo = Topology::new(1, 5);
        assert!(topo.selection_points().is_empty());
        assert!(topo.nearest_selection_point(WorldPoint::default()).is_none());
    }

    #[test]
    fn test_tiles_near_ordered_top_first() {
        let board = full_board(3, 3);
        let topo = Topology::new(3, 3);
        for p in topo.selection_points() {
            let ids = topo.tiles_near_selection_point(p, &board).unwrap();
            let ys: Vec<f32> = ids
                .iter()
                .map(|id| cell_world_position(board.tile(*id).unwrap().coordinate).y)
                .collect();
            assert!(ys[0] >= ys[1] && ys[1] >= ys[2], "point {} ys {:?}", p.index, ys);
        }
    }

    #[test]
    fn test_tiles_near_requires_three_tiles() {
        let mut board = full_board(3, 3);
        let topo = Topology::new(3, 3);
        let point = topo.selection_points()[0];
        let victim = board.id_at(point.cells[1]).unwrap();
        board.remove(victim);
        assert!(topo.tiles_near_selection_point(&point, &board).is_none());
    }
}
