//! # labyrinth-proto
//!
//! Shared types, error definitions, and capability traits for labyrinth crawlers.
//!
//! This crate provides the foundational abstractions used across all labyrinth crates,
//! including:
//! - Grid primitives (positions, directions, tiles)
//! - The `Crawler` and `Inventory` capabilities an explorer drives
//! - Race notifications and the `EventSink` that fans them out to observers
//! - Common error types

mod crawler;
mod error;
mod event_sink;
mod grid;
mod inventory;
mod race_event;
mod tile;

pub use crawler::{Crawler, CrawlerSnapshot};
pub use error::{Error, Result};
pub use event_sink::EventSink;
pub use grid::{Direction, Position};
pub use inventory::{Inventory, ItemKind};
pub use race_event::{CrawlerUpdate, ParticipantFault, ParticipantId, ParticipantResult, RaceEvent};
pub use tile::{Tile, TileKind};
