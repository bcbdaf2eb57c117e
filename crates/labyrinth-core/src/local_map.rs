//! An explorer's private, partially observed map.

use crate::grid::TileGrid;
use labyrinth_proto::{Position, Tile, TileKind};

/// Default side length of an explorer's local map.
pub const DEFAULT_MAP_SIZE: usize = 100;

/// Smallest local map that leaves room around the start cell.
pub const MIN_MAP_SIZE: usize = 3;

/// A square grid that starts all `Unknown` except the centre cell.
///
/// Coordinates are relative to wherever the crawler started, which is the
/// centre. Observations only ever fill `Unknown` cells.
#[derive(Debug, Clone)]
pub struct LocalMap {
    grid: TileGrid,
}

impl LocalMap {
    /// Creates a `size x size` map (clamped to [`MIN_MAP_SIZE`]).
    pub fn new(size: usize) -> Self {
        let size = size.max(MIN_MAP_SIZE);
        let mut map = Self {
            grid: TileGrid::new(size, size),
        };
        let center = map.center();
        map.grid.set(center, Tile::Room);
        map
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.grid.width()
    }

    /// The start cell.
    pub fn center(&self) -> Position {
        let c = (self.grid.width() / 2) as i32;
        Position::new(c, c)
    }

    /// The underlying grid, for pathfinding.
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Tile at `pos`, or `None` off the map.
    pub fn tile(&self, pos: Position) -> Option<Tile> {
        self.grid.get(pos)
    }

    /// Records an observation if the cell is still `Unknown`.
    ///
    /// Returns true if the map changed.
    pub fn record_observation(&mut self, pos: Position, kind: TileKind) -> bool {
        if self.grid.get(pos) != Some(Tile::Unknown) {
            return false;
        }
        self.grid.set(pos, Tile::from(kind))
    }

    /// Marks an `Unknown` cell as a wall after a blocked move.
    pub fn mark_blocked(&mut self, pos: Position) -> bool {
        if self.grid.get(pos) != Some(Tile::Unknown) {
            return false;
        }
        self.grid.set(pos, Tile::Wall)
    }

    /// Records that a walker has stepped onto `pos`.
    ///
    /// A closed door that was walked through is open.
    pub fn mark_passed(&mut self, pos: Position) {
        match self.grid.get(pos) {
            Some(Tile::Door { open: false }) => {
                self.grid.set(pos, Tile::Door { open: true });
            }
            Some(Tile::Unknown) => {
                self.grid.set(pos, Tile::Room);
            }
            _ => {}
        }
    }

    /// Number of cells not yet observed.
    pub fn unknown_count(&self) -> usize {
        self.grid.unknown_count()
    }
}

impl Default for LocalMap {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_SIZE)
    }
}
