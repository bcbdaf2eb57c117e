//! # labyrinth-core
//!
//! Exploration and racing for labyrinth crawlers.
//!
//! This crate provides:
//! - Breadth-first pathfinding over a partially known grid
//! - The frontier-following explorer and its private local map
//! - The first-to-the-exit race orchestrator with cooperative cancellation
//! - Race configuration loading
//! - An in-memory maze with a simulated crawler, used by tests and the CLI

mod cancel;
mod config;
mod explorer;
mod grid;
mod inventory;
mod local_map;
pub mod maze;
mod orchestrator;
mod pathfinding;
pub mod testing;

pub use cancel::{CancelSignal, CancelSource};
pub use config::{ConfigError, RaceConfig};
pub use explorer::{BfsExplorer, ExploreError, Explorer, StopReason};
pub use grid::TileGrid;
pub use inventory::SharedInventory;
pub use local_map::{DEFAULT_MAP_SIZE, LocalMap, MIN_MAP_SIZE};
pub use maze::{Maze, MazeError, SimulatedCrawler};
pub use orchestrator::{
    CrawlerKit, MAX_PARTICIPANTS_LIMIT, RaceError, RaceOrchestrator, RaceSummary, bfs_explorers,
};
pub use pathfinding::{BfsPathfinder, PathResult, PathStatus, Pathfinder};
