//! Dense rectangular tile grid addressed by [`Position`].

use labyrinth_proto::{Position, Tile};

/// A `width x height` grid of tiles stored row-major.
///
/// Positions outside `[0, width) x [0, height)` are not part of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

impl TileGrid {
    /// Creates a grid where every cell is `Unknown`.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Tile::Unknown)
    }

    /// Creates a grid where every cell is `tile`.
    pub fn filled(width: usize, height: usize, tile: Tile) -> Self {
        Self {
            width,
            height,
            cells: vec![tile; width * height],
        }
    }

    /// Builds a grid from rows (`rows[y][x]`).
    ///
    /// Ragged rows are padded with `Unknown` up to the longest row.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Self {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut cells = Vec::with_capacity(width * height);
        for mut row in rows {
            row.resize(width, Tile::Unknown);
            cells.extend(row);
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns true if `pos` lies on the grid.
    pub fn contains(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    fn index(&self, pos: Position) -> Option<usize> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Tile at `pos`, or `None` off the grid.
    pub fn get(&self, pos: Position) -> Option<Tile> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Overwrites the tile at `pos`. Returns false off the grid.
    pub fn set(&mut self, pos: Position, tile: Tile) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Number of cells not yet observed.
    pub fn unknown_count(&self) -> usize {
        self.cells.iter().filter(|t| t.is_unknown()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let grid = TileGrid::new(3, 2);
        assert!(grid.contains(Position::new(0, 0)));
        assert!(grid.contains(Position::new(2, 1)));
        assert!(!grid.contains(Position::new(3, 0)));
        assert!(!grid.contains(Position::new(0, 2)));
        assert!(!grid.contains(Position::new(-1, 0)));
        assert_eq!(grid.get(Position::new(5, 5)), None);
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = TileGrid::new(2, 2);
        assert!(grid.set(Position::new(1, 0), Tile::Wall));
        assert!(!grid.set(Position::new(2, 0), Tile::Wall));
        assert_eq!(grid.get(Position::new(1, 0)), Some(Tile::Wall));
        assert_eq!(grid.unknown_count(), 3);
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let grid = TileGrid::from_rows(vec![vec![Tile::Room], vec![Tile::Room, Tile::Wall]]);
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(Position::new(1, 0)), Some(Tile::Unknown));
        assert_eq!(grid.get(Position::new(1, 1)), Some(Tile::Wall));
    }
}
