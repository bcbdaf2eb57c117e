//! Crawler wrapper that counts the actions performed through it.

use async_trait::async_trait;
use labyrinth_proto::{Crawler, Direction, Inventory, Position, Result, TileKind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Action counters shared with the test.
#[derive(Debug, Default)]
pub struct CrawlerStats {
    turns: AtomicU32,
    walks: AtomicU32,
    moves: AtomicU32,
    observations: AtomicU32,
}

impl CrawlerStats {
    pub fn turns(&self) -> u32 {
        self.turns.load(Ordering::SeqCst)
    }

    /// Walk attempts, blocked or not.
    pub fn walks(&self) -> u32 {
        self.walks.load(Ordering::SeqCst)
    }

    /// Walk attempts that actually moved the crawler.
    pub fn moves(&self) -> u32 {
        self.moves.load(Ordering::SeqCst)
    }

    pub fn observations(&self) -> u32 {
        self.observations.load(Ordering::SeqCst)
    }
}

/// Forwards to `C`, counting what it is asked to do.
#[derive(Debug)]
pub struct CountingCrawler<C> {
    inner: C,
    stats: Arc<CrawlerStats>,
}

impl<C: Crawler> CountingCrawler<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            stats: Arc::default(),
        }
    }

    /// Handle to the counters, valid after the crawler is moved away.
    pub fn stats(&self) -> Arc<CrawlerStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl<C: Crawler> Crawler for CountingCrawler<C> {
    fn position(&self) -> Position {
        self.inner.position()
    }

    fn direction(&self) -> Direction {
        self.inner.direction()
    }

    fn turn_left(&mut self) {
        self.stats.turns.fetch_add(1, Ordering::SeqCst);
        self.inner.turn_left();
    }

    fn turn_right(&mut self) {
        self.stats.turns.fetch_add(1, Ordering::SeqCst);
        self.inner.turn_right();
    }

    async fn facing_tile(&self) -> Result<TileKind> {
        self.stats.observations.fetch_add(1, Ordering::SeqCst);
        self.inner.facing_tile().await
    }

    async fn try_walk(&mut self, bag: &dyn Inventory) -> Result<Option<Arc<dyn Inventory>>> {
        self.stats.walks.fetch_add(1, Ordering::SeqCst);
        let outcome = self.inner.try_walk(bag).await;
        if matches!(outcome, Ok(Some(_))) {
            self.stats.moves.fetch_add(1, Ordering::SeqCst);
        }
        outcome
    }
}
