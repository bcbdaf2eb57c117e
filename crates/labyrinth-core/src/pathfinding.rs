//! Breadth-first pathfinding over a partially known grid.
//!
//! Rooms and open doors are traversable. Walls, closed doors, `Outside` and
//! `Unknown` cells are barriers for [`Pathfinder::find_path`]; for
//! [`Pathfinder::find_nearest_unknown`] an `Unknown` cell is the target.
//! Neighbours are expanded in North, East, South, West order, which decides
//! which of several equally short paths is returned.

use crate::grid::TileGrid;
use labyrinth_proto::Position;
use std::collections::{HashMap, HashSet, VecDeque};

/// Outcome category of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    /// A path to the goal exists.
    Found,
    /// No path exists, or nothing is left to explore.
    NotFound,
    /// The search stopped at the nearest unknown cell.
    UnknownReached,
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    pub status: PathStatus,
    /// Steps from start (excluded) to destination (included). For
    /// `UnknownReached` the unknown cell itself is excluded.
    pub path: Vec<Position>,
    /// Set only for `UnknownReached`.
    pub nearest_unknown: Option<Position>,
}

impl PathResult {
    /// A path to the goal.
    pub fn found(path: Vec<Position>) -> Self {
        Self {
            status: PathStatus::Found,
            path,
            nearest_unknown: None,
        }
    }

    /// No path.
    pub fn not_found() -> Self {
        Self {
            status: PathStatus::NotFound,
            path: Vec::new(),
            nearest_unknown: None,
        }
    }

    /// The path to the frontier cell in front of `unknown`.
    pub fn unknown_reached(path: Vec<Position>, unknown: Position) -> Self {
        Self {
            status: PathStatus::UnknownReached,
            path,
            nearest_unknown: Some(unknown),
        }
    }

    /// Returns true if a path to the goal was found.
    pub fn is_success(&self) -> bool {
        self.status == PathStatus::Found
    }

    /// Number of steps in the path.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Returns true if the path has no steps.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// Shortest-path queries over a tile grid.
///
/// The grid is a plain parameter; implementations keep no state between calls.
pub trait Pathfinder: Send + Sync {
    /// Shortest path from `start` to `goal`.
    fn find_path(&self, start: Position, goal: Position, grid: &TileGrid) -> PathResult;

    /// Path to the traversable cell just before the closest unknown cell.
    fn find_nearest_unknown(&self, start: Position, grid: &TileGrid) -> PathResult;
}

/// Breadth-first search; shortest in number of steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsPathfinder;

impl BfsPathfinder {
    /// Creates a pathfinder.
    pub fn new() -> Self {
        Self
    }
}

impl Pathfinder for BfsPathfinder {
    fn find_path(&self, start: Position, goal: Position, grid: &TileGrid) -> PathResult {
        if start == goal {
            return PathResult::found(Vec::new());
        }
        if !grid.contains(goal) {
            return PathResult::not_found();
        }

        let mut search = Search::new(start);
        while let Some(current) = search.queue.pop_front() {
            for neighbor in current.neighbors() {
                if search.visited.contains(&neighbor) {
                    continue;
                }
                let Some(tile) = grid.get(neighbor) else {
                    continue;
                };
                if !tile.is_traversable() {
                    continue;
                }

                search.visit(neighbor, current);
                if neighbor == goal {
                    return PathResult::found(search.path_to(goal));
                }
                search.queue.push_back(neighbor);
            }
        }

        PathResult::not_found()
    }

    fn find_nearest_unknown(&self, start: Position, grid: &TileGrid) -> PathResult {
        let mut search = Search::new(start);
        while let Some(current) = search.queue.pop_front() {
            for neighbor in current.neighbors() {
                if search.visited.contains(&neighbor) {
                    continue;
                }
                let Some(tile) = grid.get(neighbor) else {
                    continue;
                };

                if tile.is_unknown() {
                    // Stop on the frontier cell in front of the unknown one.
                    return PathResult::unknown_reached(search.path_to(current), neighbor);
                }
                if !tile.is_traversable() {
                    continue;
                }

                search.visit(neighbor, current);
                search.queue.push_back(neighbor);
            }
        }

        PathResult::not_found()
    }
}

/// Per-call BFS bookkeeping.
struct Search {
    start: Position,
    queue: VecDeque<Position>,
    visited: HashSet<Position>,
    came_from: HashMap<Position, Position>,
}

impl Search {
    fn new(start: Position) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back(start);
        Self {
            start,
            queue,
            visited: HashSet::from([start]),
            came_from: HashMap::new(),
        }
    }

    fn visit(&mut self, cell: Position, from: Position) {
        self.visited.insert(cell);
        self.came_from.insert(cell, from);
    }

    /// Walks predecessors back from `end` to the start, then reverses.
    fn path_to(&self, end: Position) -> Vec<Position> {
        let mut path = Vec::new();
        let mut current = end;
        while current != self.start {
            path.push(current);
            match self.came_from.get(&current) {
                Some(&previous) => current = previous,
                None => break,
            }
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labyrinth_proto::Tile;

    const R: Tile = Tile::Room;
    const W: Tile = Tile::Wall;
    const U: Tile = Tile::Unknown;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn open_room(width: usize, height: usize) -> TileGrid {
        TileGrid::filled(width, height, Tile::Room)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // find_path
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_same_start_and_goal_is_found_with_empty_path() {
        let grid = TileGrid::from_rows(vec![vec![W, W], vec![W, W]]);
        for start in [p(0, 0), p(1, 1), p(-4, 9)] {
            let result = BfsPathfinder.find_path(start, start, &grid);
            assert!(result.is_success());
            assert!(result.is_empty());
        }
    }

    #[test]
    fn test_corridor_path_length() {
        let grid = open_room(6, 1);
        let result = BfsPathfinder.find_path(p(0, 0), p(5, 0), &grid);

        assert_eq!(result.status, PathStatus::Found);
        assert_eq!(result.len(), 5);
        assert_eq!(result.path.first(), Some(&p(1, 0)));
        assert_eq!(result.path.last(), Some(&p(5, 0)));
    }

    #[test]
    fn test_path_excludes_start_and_steps_are_adjacent() {
        let grid = open_room(5, 5);
        let start = p(0, 0);
        let result = BfsPathfinder.find_path(start, p(4, 3), &grid);

        assert_eq!(result.len(), 7);
        assert!(!result.path.contains(&start));
        let mut previous = start;
        for &step in &result.path {
            assert!(previous.direction_to(step).is_some());
            previous = step;
        }
    }

    #[test]
    fn test_ties_broken_by_neighbor_order() {
        // Both (1,0) and (0,1) lead to (1,1); East is expanded before South.
        let grid = open_room(2, 2);
        let result = BfsPathfinder.find_path(p(0, 0), p(1, 1), &grid);
        assert_eq!(result.path, vec![p(1, 0), p(1, 1)]);
    }

    #[test]
    fn test_walled_in_goal_not_found() {
        let grid = TileGrid::from_rows(vec![
            vec![R, R, R, R, R],
            vec![R, W, W, W, R],
            vec![R, W, R, W, R],
            vec![R, W, W, W, R],
            vec![R, R, R, R, R],
        ]);
        let result = BfsPathfinder.find_path(p(0, 0), p(2, 2), &grid);
        assert_eq!(result.status, PathStatus::NotFound);
        assert!(result.is_empty());
    }

    #[test]
    fn test_goal_out_of_bounds_not_found() {
        let grid = open_room(3, 3);
        assert_eq!(
            BfsPathfinder.find_path(p(0, 0), p(3, 0), &grid).status,
            PathStatus::NotFound
        );
        assert_eq!(
            BfsPathfinder.find_path(p(0, 0), p(0, -1), &grid).status,
            PathStatus::NotFound
        );
    }

    #[test]
    fn test_unknown_is_barrier_for_find_path() {
        let grid = TileGrid::from_rows(vec![vec![R, U, R], vec![W, W, W]]);
        let result = BfsPathfinder.find_path(p(0, 0), p(2, 0), &grid);
        assert_eq!(result.status, PathStatus::NotFound);
    }

    #[test]
    fn test_doors_block_unless_open() {
        let closed = TileGrid::from_rows(vec![vec![R, Tile::Door { open: false }, R]]);
        let open = TileGrid::from_rows(vec![vec![R, Tile::Door { open: true }, R]]);

        assert_eq!(
            BfsPathfinder.find_path(p(0, 0), p(2, 0), &closed).status,
            PathStatus::NotFound
        );
        assert_eq!(
            BfsPathfinder.find_path(p(0, 0), p(2, 0), &open).path,
            vec![p(1, 0), p(2, 0)]
        );
    }

    #[test]
    fn test_path_around_obstacle() {
        let grid = TileGrid::from_rows(vec![
            vec![R, W, R],
            vec![R, W, R],
            vec![R, R, R],
        ]);
        let result = BfsPathfinder.find_path(p(0, 0), p(2, 0), &grid);
        assert_eq!(
            result.path,
            vec![p(0, 1), p(0, 2), p(1, 2), p(2, 2), p(2, 1), p(2, 0)]
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // find_nearest_unknown
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_adjacent_unknown_gives_empty_path() {
        let grid = TileGrid::from_rows(vec![vec![R, U, R]]);
        let result = BfsPathfinder.find_nearest_unknown(p(0, 0), &grid);

        assert_eq!(result.status, PathStatus::UnknownReached);
        assert_eq!(result.nearest_unknown, Some(p(1, 0)));
        assert!(result.path.is_empty());
    }

    #[test]
    fn test_nearest_of_two_unknowns_along_corridor() {
        let grid = TileGrid::from_rows(vec![vec![R, R, U, R, U]]);
        let result = BfsPathfinder.find_nearest_unknown(p(0, 0), &grid);

        assert_eq!(result.status, PathStatus::UnknownReached);
        assert_eq!(result.nearest_unknown, Some(p(2, 0)));
        assert_eq!(result.path, vec![p(1, 0)]);
    }

    #[test]
    fn test_unknown_excluded_from_path() {
        let grid = TileGrid::from_rows(vec![
            vec![R, R, R, R],
            vec![W, W, W, U],
        ]);
        let result = BfsPathfinder.find_nearest_unknown(p(0, 0), &grid);

        assert_eq!(result.nearest_unknown, Some(p(3, 1)));
        assert_eq!(result.path, vec![p(1, 0), p(2, 0), p(3, 0)]);
        assert!(!result.path.contains(&p(3, 1)));
    }

    #[test]
    fn test_fully_known_map_not_found() {
        let grid = TileGrid::from_rows(vec![
            vec![W, W, W],
            vec![W, R, W],
            vec![W, W, W],
        ]);
        let result = BfsPathfinder.find_nearest_unknown(p(1, 1), &grid);
        assert_eq!(result.status, PathStatus::NotFound);
        assert_eq!(result.nearest_unknown, None);
    }

    #[test]
    fn test_unknown_behind_walls_unreachable() {
        let grid = TileGrid::from_rows(vec![
            vec![R, W, U],
            vec![R, W, U],
        ]);
        let result = BfsPathfinder.find_nearest_unknown(p(0, 0), &grid);
        assert_eq!(result.status, PathStatus::NotFound);
    }

    #[test]
    fn test_unknown_search_is_repeatable() {
        let grid = TileGrid::from_rows(vec![vec![R, R, U], vec![U, R, R]]);
        let first = BfsPathfinder.find_nearest_unknown(p(1, 0), &grid);
        let second = BfsPathfinder.find_nearest_unknown(p(1, 0), &grid);
        assert_eq!(first, second);
        // East is checked before South and West.
        assert_eq!(first.nearest_unknown, Some(p(2, 0)));
    }
}
