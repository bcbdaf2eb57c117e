//! Tile variants for maps and crawler observations.

use serde::{Deserialize, Serialize};

/// What a crawler reports about the tile it faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Room,
    Wall,
    Door,
    /// Beyond the maze boundary. Stepping there wins.
    Outside,
}

/// A cell of a (possibly partially known) grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "tile", rename_all = "snake_case")]
pub enum Tile {
    Room,
    Wall,
    Door {
        open: bool,
    },
    Outside,
    /// Not yet observed.
    #[default]
    Unknown,
}

impl Tile {
    /// Returns true if a walker may pass through this cell.
    ///
    /// Only rooms and open doors qualify; everything else is a barrier.
    pub fn is_traversable(self) -> bool {
        matches!(self, Tile::Room | Tile::Door { open: true })
    }

    /// Returns true for cells that have not been observed.
    pub fn is_unknown(self) -> bool {
        matches!(self, Tile::Unknown)
    }
}

impl From<TileKind> for Tile {
    /// Observed doors are recorded as locked until passed through.
    fn from(kind: TileKind) -> Self {
        match kind {
            TileKind::Room => Tile::Room,
            TileKind::Wall => Tile::Wall,
            TileKind::Door => Tile::Door { open: false },
            TileKind::Outside => Tile::Outside,
        }
    }
}
