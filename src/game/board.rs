//! Board storage: owns every live tile and indexes them by coordinate.

use std::collections::HashMap;

use super::coords::{Coordinate, Direction};
use super::types::{Color, Tile, TileId, TileKind};

/// Live tiles keyed by id, plus a dense coordinate index.
///
/// At quiescence each coordinate holds at most one tile. `permute` is the
/// only operation that lifts several tiles at once, and it places them all
/// back before returning.
#[derive(Debug, Clone)]
pub struct Board {
    width: i32,
    height: i32,
    tiles: HashMap<TileId, Tile>,
    cells: Vec<Option<TileId>>,
    next_id: u64,
}

impl Board {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            tiles: HashMap::new(),
            cells: vec![None; width as usize * height as usize],
            next_id: 1,
        }
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tiles.len() == self.cells.len()
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        c.column >= 0 && c.column < self.width && c.row >= 0 && c.row < self.height
    }

    fn index(&self, c: Coordinate) -> Option<usize> {
        self.contains(c)
            .then(|| (c.column * self.height + c.row) as usize)
    }

    pub fn id_at(&self, c: Coordinate) -> Option<TileId> {
        self.index(c).and_then(|i| self.cells[i])
    }

    pub fn tile_at(&self, c: Coordinate) -> Option<&Tile> {
        self.id_at(c).and_then(|id| self.tiles.get(&id))
    }

    pub fn is_vacant(&self, c: Coordinate) -> bool {
        self.contains(c) && self.id_at(c).is_none()
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub(crate) fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(&id)
    }

    pub fn neighbor(&self, c: Coordinate, direction: Direction) -> Option<&Tile> {
        self.tile_at(c.neighbor(direction))
    }

    /// Live tiles in coordinate generation order (column by column, bottom up).
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.cells
            .iter()
            .filter_map(move |slot| slot.and_then(|id| self.tiles.get(&id)))
    }

    pub fn bombs(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles().filter(|t| t.is_bomb())
    }

    /// Unoccupied cells in generation order.
    pub fn vacant_coordinates(&self) -> Vec<Coordinate> {
        let mut out = Vec::new();
        for column in 0..self.width {
            for row in 0..self.height {
                let c = Coordinate::new(column, row);
                if self.id_at(c).is_none() {
                    out.push(c);
                }
            }
        }
        out
    }

    /// Create a tile at `c`. Returns `None` if `c` is outside the board or occupied.
    pub fn spawn(&mut self, c: Coordinate, color: Color, kind: TileKind) -> Option<TileId> {
        let idx = self.index(c)?;
        if self.cells[idx].is_some() {
            return None;
        }
        let id = TileId(self.next_id);
        self.next_id += 1;
        self.cells[idx] = Some(id);
        self.tiles.insert(
            id,
            Tile {
                id,
                coordinate: c,
                color,
                kind,
            },
        );
        Some(id)
    }

    pub fn remove(&mut self, id: TileId) -> Option<Tile> {
        let tile = self.tiles.remove(&id)?;
        if let Some(idx) = self.index(tile.coordinate) {
            if self.cells[idx] == Some(id) {
                self.cells[idx] = None;
            }
        }
        Some(tile)
    }

    /// Move one tile into a vacant cell. Returns the previous coordinate.
    pub fn move_tile(&mut self, id: TileId, to: Coordinate) -> Option<Coordinate> {
        let to_idx = self.index(to)?;
        if self.cells[to_idx].is_some() {
            return None;
        }
        let from = self.tiles.get(&id)?.coordinate;
        if let Some(from_idx) = self.index(from) {
            self.cells[from_idx] = None;
        }
        self.cells[to_idx] = Some(id);
        if let Some(tile) = self.tiles.get_mut(&id) {
            tile.coordinate = to;
        }
        Some(from)
    }

    /// Reassign several tiles at once. Every destination must be inside the
    /// board and either vacant or vacated by another tile in `moves`.
    /// Returns false, leaving the board untouched, if that does not hold.
    pub fn permute(&mut self, moves: &[(TileId, Coordinate)]) -> bool {
        let mut lifted = Vec::with_capacity(moves.len());
        for &(id, to) in moves {
            let Some(tile) = self.tiles.get(&id) else {
                return false;
            };
            if !self.contains(to) {
                return false;
            }
            lifted.push(tile.coordinate);
        }
        for &(_, to) in moves {
            if let Some(occupant) = self.id_at(to) {
                if !moves.iter().any(|&(id, _)| id == occupant) {
                    return false;
                }
            }
        }
        for from in lifted {
            if let Some(idx) = self.index(from) {
                self.cells[idx] = None;
            }
        }
        for &(id, to) in moves {
            if let Some(idx) = self.index(to) {
                self.cells[idx] = Some(id);
            }
            if let Some(tile) = self.tiles.get_mut(&id) {
                tile.coordinate = to;
            }
        }
        true
    }
}
