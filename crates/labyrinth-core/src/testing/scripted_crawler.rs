//! A crawler that replays canned observations and walk outcomes.

use crate::inventory::SharedInventory;
use async_trait::async_trait;
use labyrinth_proto::{Crawler, Direction, Error, Inventory, Position, Result, TileKind};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Replays scripted results in order.
///
/// When a script runs dry the crawler reports a fault, unless
/// [`ScriptedCrawler::always_facing`] supplies a fallback observation.
#[derive(Debug)]
pub struct ScriptedCrawler {
    position: Position,
    direction: Direction,
    facing: Mutex<VecDeque<Result<TileKind>>>,
    fallback: Option<TileKind>,
    walks: VecDeque<Result<bool>>,
    delay: Duration,
    panic_on_observe: bool,
}

impl Default for ScriptedCrawler {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedCrawler {
    /// At `(0, 0)` facing north, with empty scripts.
    pub fn new() -> Self {
        Self {
            position: Position::new(0, 0),
            direction: Direction::North,
            facing: Mutex::new(VecDeque::new()),
            fallback: None,
            walks: VecDeque::new(),
            delay: Duration::ZERO,
            panic_on_observe: false,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Queues observations.
    pub fn with_facing(self, tiles: impl IntoIterator<Item = TileKind>) -> Self {
        self.script_facing(tiles.into_iter().map(Ok));
        self
    }

    /// Queues an observation that fails with `error`.
    pub fn with_facing_fault(self, error: Error) -> Self {
        self.script_facing([Err(error)]);
        self
    }

    /// Observation reported once the queue is empty.
    pub fn always_facing(mut self, tile: TileKind) -> Self {
        self.fallback = Some(tile);
        self
    }

    /// Queues walk outcomes; `true` moves one cell ahead.
    pub fn with_walks(mut self, outcomes: impl IntoIterator<Item = bool>) -> Self {
        self.walks.extend(outcomes.into_iter().map(Ok));
        self
    }

    /// Queues a walk that fails with `error`.
    pub fn with_walk_fault(mut self, error: Error) -> Self {
        self.walks.push_back(Err(error));
        self
    }

    /// Delays every observation and walk.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Panics on the first observation.
    pub fn panicking(mut self) -> Self {
        self.panic_on_observe = true;
        self
    }

    fn script_facing(&self, results: impl IntoIterator<Item = Result<TileKind>>) {
        self.facing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(results);
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl Crawler for ScriptedCrawler {
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

    async fn facing_tile(&self) -> Result<TileKind> {
        self.pause().await;
        assert!(!self.panic_on_observe, "scripted crawler panic");

        let next = self
            .facing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match (next, self.fallback) {
            (Some(result), _) => result,
            (None, Some(tile)) => Ok(tile),
            (None, None) => Err(Error::crawler("facing_tile", "script exhausted")),
        }
    }

    async fn try_walk(&mut self, _bag: &dyn Inventory) -> Result<Option<Arc<dyn Inventory>>> {
        self.pause().await;
        match self.walks.pop_front() {
            Some(Ok(true)) => {
                self.position = self.position.moved(self.direction);
                Ok(Some(Arc::new(SharedInventory::new())))
            }
            Some(Ok(false)) => Ok(None),
            Some(Err(error)) => Err(error),
            None => Err(Error::crawler("try_walk", "script exhausted")),
        }
    }
}
