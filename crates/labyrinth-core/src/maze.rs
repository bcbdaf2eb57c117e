//! An in-memory maze and the crawler that walks it.
//!
//! Mazes are described as text rows:
//!
//! | glyph           | cell                      |
//! |-----------------|---------------------------|
//! | `#` `+` `-` `\|` | wall                      |
//! | space           | room                      |
//! | `/`             | closed door               |
//! | `k`             | room holding a key        |
//! | `x`             | start (room)              |
//!
//! Everything beyond the rows is `Outside`. Short rows are padded with wall.

use crate::inventory::SharedInventory;
use crate::orchestrator::CrawlerKit;
use async_trait::async_trait;
use labyrinth_proto::{Crawler, Direction, Inventory, ItemKind, Position, TileKind};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Errors from parsing a maze description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    #[error("maze has no rows")]
    Empty,

    #[error("unknown glyph {ch:?} at ({x}, {y})")]
    UnknownGlyph { ch: char, x: usize, y: usize },

    #[error("maze has no start cell ('x')")]
    MissingStart,

    #[error("second start cell at ({x}, {y})")]
    DuplicateStart { x: usize, y: usize },
}

#[derive(Debug)]
struct Cell {
    kind: TileKind,
    items: Arc<SharedInventory>,
}

/// The true layout, shared by every crawler in a race.
#[derive(Debug)]
pub struct Maze {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    start: Position,
    open_doors: Mutex<HashSet<Position>>,
}

impl Maze {
    /// Parses a maze from text rows.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, MazeError> {
        let height = rows.len();
        let width = rows
            .iter()
            .map(|row| row.as_ref().chars().count())
            .max()
            .unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MazeError::Empty);
        }

        let mut cells = Vec::with_capacity(width * height);
        let mut start = None;
        for (y, row) in rows.iter().enumerate() {
            let mut glyphs = row.as_ref().chars();
            for x in 0..width {
                let ch = glyphs.next().unwrap_or('#');
                let (kind, items) = match ch {
                    '#' | '+' | '-' | '|' => (TileKind::Wall, Vec::new()),
                    ' ' => (TileKind::Room, Vec::new()),
                    '/' => (TileKind::Door, Vec::new()),
                    'k' => (TileKind::Room, vec![ItemKind::Key]),
                    'x' => {
                        if start.is_some() {
                            return Err(MazeError::DuplicateStart { x, y });
                        }
                        start = Some(Position::new(x as i32, y as i32));
                        (TileKind::Room, Vec::new())
                    }
                    other => return Err(MazeError::UnknownGlyph { ch: other, x, y }),
                };
                cells.push(Cell {
                    kind,
                    items: Arc::new(SharedInventory::with_items(items)),
                });
            }
        }

        let start = start.ok_or(MazeError::MissingStart)?;
        debug!(width, height, %start, "maze parsed");
        Ok(Self {
            width,
            height,
            cells,
            start,
            open_doors: Mutex::new(HashSet::new()),
        })
    }

    /// Rows of the built-in 21x19 training maze.
    ///
    /// A walled border with a pillar at every even coordinate inside it, a
    /// locked door in the middle of the west wall and a key just west of the
    /// start.
    pub fn training_rows() -> Vec<String> {
        const WIDTH: usize = 21;
        const HEIGHT: usize = 19;
        let start = (10, 9);
        let door = (0, HEIGHT / 2);
        let key = (start.0 - 1, start.1);

        (0..HEIGHT)
            .map(|y| {
                (0..WIDTH)
                    .map(|x| {
                        if (x, y) == door {
                            '/'
                        } else if (x, y) == start {
                            'x'
                        } else if (x, y) == key {
                            'k'
                        } else if x == 0 || y == 0 || x == WIDTH - 1 || y == HEIGHT - 1 {
                            '#'
                        } else if (2..WIDTH - 2).contains(&x)
                            && (2..HEIGHT - 2).contains(&y)
                            && x % 2 == 0
                            && y % 2 == 0
                        {
                            '+'
                        } else {
                            ' '
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// The built-in training maze.
    pub fn training_default() -> Result<Self, MazeError> {
        Self::from_rows(&Self::training_rows())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Where every crawler starts.
    pub fn start(&self) -> Position {
        self.start
    }

    fn cell(&self, pos: Position) -> Option<&Cell> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x)
    }

    /// Kind of the tile at `pos`; anything off the grid is `Outside`.
    pub fn tile_at(&self, pos: Position) -> TileKind {
        self.cell(pos).map_or(TileKind::Outside, |cell| cell.kind)
    }

    /// Items lying at `pos`. Off-grid cells hold nothing.
    pub fn items_at(&self, pos: Position) -> Arc<dyn Inventory> {
        match self.cell(pos) {
            Some(cell) => Arc::clone(&cell.items) as Arc<dyn Inventory>,
            None => Arc::new(SharedInventory::new()),
        }
    }

    /// Returns true once the door at `pos` has been unlocked.
    pub async fn is_door_open(&self, pos: Position) -> bool {
        self.open_doors.lock().await.contains(&pos)
    }

    /// Opens the door at `pos`, spending one key from `bag` if it is still
    /// locked. Returns false when the bag has no key to spend.
    async fn unlock(&self, pos: Position, bag: &dyn Inventory) -> bool {
        let mut open = self.open_doors.lock().await;
        if open.contains(&pos) {
            return true;
        }

        let carried = bag.item_types().await;
        let Some(index) = carried.iter().position(|item| *item == ItemKind::Key) else {
            return false;
        };
        let mut selection = vec![false; carried.len()];
        selection[index] = true;
        if bag.take_items(&selection).await.is_none() {
            return false;
        }

        debug!(door = %pos, "door unlocked");
        open.insert(pos);
        true
    }
}

/// A crawler walking a shared [`Maze`], with optional per-call latency.
#[derive(Debug, Clone)]
pub struct SimulatedCrawler {
    maze: Arc<Maze>,
    position: Position,
    direction: Direction,
    latency: Duration,
}

impl SimulatedCrawler {
    /// Places a crawler on the maze start, facing north.
    pub fn new(maze: Arc<Maze>) -> Self {
        let position = maze.start();
        Self {
            maze,
            position,
            direction: Direction::North,
            latency: Duration::ZERO,
        }
    }

    /// Sets the initial direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Delays every observation and move by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// A fresh crawler with an empty bag, ready for a race slot.
    pub fn kit(maze: &Arc<Maze>, latency: Duration) -> CrawlerKit {
        CrawlerKit::new(
            Self::new(Arc::clone(maze)).with_latency(latency),
            SharedInventory::new(),
        )
    }

    async fn round_trip(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl Crawler for SimulatedCrawler {
    fn position(&self) -> Position {
        self.position
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn turn_left(&mut self) {
        self.direction = self.direction.turn_left();
    }

    fn turn_right(&mut self) {
        self.direction = self.direction.turn_right();
    }

    async fn facing_tile(&self) -> labyrinth_proto::Result<TileKind> {
        self.round_trip().await;
        Ok(self.maze.tile_at(self.position.moved(self.direction)))
    }

    async fn try_walk(
        &mut self,
        bag: &dyn Inventory,
    ) -> labyrinth_proto::Result<Option<Arc<dyn Inventory>>> {
        self.round_trip().await;
        let target = self.position.moved(self.direction);
        let passable = match self.maze.tile_at(target) {
            TileKind::Wall => false,
            TileKind::Door => self.maze.unlock(target, bag).await,
            TileKind::Room | TileKind::Outside => true,
        };
        if !passable {
            return Ok(None);
        }

        self.position = target;
        Ok(Some(self.maze.items_at(target)))
    }
}
