//! The crawler capability an explorer drives.

use crate::{Direction, Inventory, Position, Result, TileKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Point-in-time view of a crawler, carried by race notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlerSnapshot {
    pub position: Position,
    pub direction: Direction,
}

/// An agent that can face a tile, turn, and try to walk forward.
///
/// Observing and walking may suspend (e.g. a round trip to a remote agent);
/// turning is local and immediate.
#[async_trait]
pub trait Crawler: Send + Sync {
    /// Current position in maze coordinates.
    fn position(&self) -> Position;

    /// Direction the crawler currently faces.
    fn direction(&self) -> Direction;

    /// Quarter turn counter-clockwise.
    fn turn_left(&mut self);

    /// Quarter turn clockwise.
    fn turn_right(&mut self);

    /// Kind of the tile directly ahead.
    async fn facing_tile(&self) -> Result<TileKind>;

    /// Attempts to step onto the tile ahead, using `bag` to unlock doors.
    ///
    /// Returns `Ok(None)` when blocked, or the inventory found at the
    /// destination cell when the move succeeded.
    async fn try_walk(&mut self, bag: &dyn Inventory) -> Result<Option<Arc<dyn Inventory>>>;

    /// Captures position and direction.
    fn snapshot(&self) -> CrawlerSnapshot {
        CrawlerSnapshot {
            position: self.position(),
            direction: self.direction(),
        }
    }
}

#[async_trait]
impl<C: Crawler + ?Sized> Crawler for Box<C> {
    fn position(&self) -> Position {
        (**self).position()
    }

    fn direction(&self) -> Direction {
        (**self).direction()
    }

    fn turn_left(&mut self) {
        (**self).turn_left();
    }

    fn turn_right(&mut self) {
        (**self).turn_right();
    }

    async fn facing_tile(&self) -> Result<TileKind> {
        (**self).facing_tile().await
    }

    async fn try_walk(&mut self, bag: &dyn Inventory) -> Result<Option<Arc<dyn Inventory>>> {
        (**self).try_walk(bag).await
    }
}
