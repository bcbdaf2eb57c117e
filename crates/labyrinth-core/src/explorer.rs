//! Incremental frontier-based exploration.
//!
//! Each iteration observes the faced tile, asks the pathfinder for the
//! closest unexplored cell, and commits to only the first step of that route
//! before re-planning. Turns and move attempts each cost one step.

use crate::cancel::CancelSignal;
use crate::local_map::{DEFAULT_MAP_SIZE, LocalMap};
use crate::pathfinding::{BfsPathfinder, PathStatus, Pathfinder};
use async_trait::async_trait;
use labyrinth_proto::{
    Crawler, CrawlerUpdate, Direction, EventSink, Inventory, ParticipantId, Position, RaceEvent,
    TileKind,
};
use tracing::debug;

/// Faults that end an exploration run early.
#[derive(Debug, thiserror::Error)]
pub enum ExploreError {
    /// The crawler capability failed.
    #[error(transparent)]
    Crawler(#[from] labyrinth_proto::Error),

    /// The planner produced a step the explorer cannot take in one move.
    #[error("planned step from {from} to {to} is not adjacent")]
    NonAdjacentStep { from: Position, to: Position },
}

/// Why an exploration run returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The faced tile is the exit.
    ExitInSight,
    /// Nothing reachable is left unexplored.
    NothingLeft,
    /// The step budget ran out.
    BudgetSpent,
    /// The cancellation signal fired before the next decision.
    Cancelled,
}

/// Something that drives a crawler around an unknown maze.
#[async_trait]
pub trait Explorer: Send + Sync {
    /// Explores until the exit is in sight, nothing reachable is left
    /// unexplored, the budget runs out, or `cancel` fires.
    ///
    /// Returns the unused part of `step_budget`.
    async fn explore(
        &mut self,
        step_budget: u32,
        bag: &dyn Inventory,
        cancel: &CancelSignal,
    ) -> Result<u32, ExploreError>;

    /// The crawler being driven.
    fn crawler(&self) -> &dyn Crawler;

    /// Why the last successful [`Explorer::explore`] call returned, or
    /// `None` if there was none.
    fn last_stop(&self) -> Option<StopReason>;
}

/// Explorer that always heads for the nearest unknown cell of its own map.
#[derive(Debug)]
pub struct BfsExplorer<C> {
    crawler: C,
    pathfinder: BfsPathfinder,
    map: LocalMap,
    position: Position,
    direction: Direction,
    participant: ParticipantId,
    sink: EventSink,
    last_stop: Option<StopReason>,
}

impl<C: Crawler> BfsExplorer<C> {
    /// Wraps `crawler` with a fresh `map_size x map_size` local map.
    pub fn new(crawler: C, map_size: usize) -> Self {
        let map = LocalMap::new(map_size);
        let position = map.center();
        let direction = crawler.direction();
        Self {
            crawler,
            pathfinder: BfsPathfinder::new(),
            map,
            position,
            direction,
            participant: ParticipantId::default(),
            sink: EventSink::new(),
            last_stop: None,
        }
    }

    /// Wraps `crawler` with a local map of the default size.
    pub fn with_default_map(crawler: C) -> Self {
        Self::new(crawler, DEFAULT_MAP_SIZE)
    }

    /// Publishes position and direction changes to `sink` as `participant`.
    pub fn observed_by(mut self, participant: ParticipantId, sink: EventSink) -> Self {
        self.participant = participant;
        self.sink = sink;
        self
    }

    /// The explorer's private map.
    pub fn map(&self) -> &LocalMap {
        &self.map
    }

    /// Position in local map coordinates.
    pub fn local_position(&self) -> Position {
        self.position
    }

    fn facing_cell(&self) -> Position {
        self.position.moved(self.direction)
    }

    async fn observe(&mut self) -> Result<TileKind, ExploreError> {
        let kind = self.crawler.facing_tile().await?;
        let cell = self.facing_cell();
        if self.map.record_observation(cell, kind) {
            debug!(participant = %self.participant, %cell, ?kind, "mapped cell");
        }
        Ok(kind)
    }

    fn notify(&self, event: fn(CrawlerUpdate) -> RaceEvent) {
        self.sink.publish(&event(CrawlerUpdate {
            participant: self.participant,
            crawler: self.crawler.snapshot(),
        }));
    }

    /// Turns one quarter at a time until facing `heading`.
    ///
    /// Prefers a single right turn; anything else is approached by left
    /// turns, so a half turn is two lefts.
    fn turn_towards(&mut self, heading: Direction, mut steps: u32, cancel: &CancelSignal) -> u32 {
        while self.direction != heading && steps > 0 && !cancel.is_cancelled() {
            if self.direction.turn_right() == heading {
                self.crawler.turn_right();
                self.direction = self.direction.turn_right();
            } else {
                self.crawler.turn_left();
                self.direction = self.direction.turn_left();
            }
            steps -= 1;
            self.notify(RaceEvent::DirectionChanged);
        }
        steps
    }

    async fn walk_forward(&mut self, steps: u32, bag: &dyn Inventory) -> Result<u32, ExploreError> {
        if steps == 0 {
            return Ok(0);
        }

        self.observe().await?;
        let target = self.facing_cell();
        let outcome = self.crawler.try_walk(bag).await?;
        let steps = steps - 1;

        match outcome {
            Some(contents) => {
                self.position = target;
                self.map.mark_passed(target);

                let found = contents.item_types().await;
                if !found.is_empty() {
                    let selection = vec![true; found.len()];
                    let collected = bag.try_move_items_from(contents.as_ref(), &selection).await;
                    debug!(participant = %self.participant, ?found, collected, "picked up items");
                }
                self.notify(RaceEvent::PositionChanged);
            }
            None => {
                if self.map.mark_blocked(target) {
                    debug!(participant = %self.participant, cell = %target, "blocked, marked wall");
                }
            }
        }

        Ok(steps)
    }
}

#[async_trait]
impl<C: Crawler> Explorer for BfsExplorer<C> {
    async fn explore(
        &mut self,
        step_budget: u32,
        bag: &dyn Inventory,
        cancel: &CancelSignal,
    ) -> Result<u32, ExploreError> {
        self.last_stop = None;
        let mut steps = step_budget;

        let stop = loop {
            if steps == 0 {
                break StopReason::BudgetSpent;
            }
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if self.observe().await? == TileKind::Outside {
                break StopReason::ExitInSight;
            }

            let plan = self
                .pathfinder
                .find_nearest_unknown(self.position, self.map.grid());
            if plan.status == PathStatus::NotFound {
                break StopReason::NothingLeft;
            }

            let Some(next) = plan.path.first().copied().or(plan.nearest_unknown) else {
                break StopReason::NothingLeft;
            };
            let Some(heading) = self.position.direction_to(next) else {
                return Err(ExploreError::NonAdjacentStep {
                    from: self.position,
                    to: next,
                });
            };

            steps = self.turn_towards(heading, steps, cancel);
            if steps > 0 && !cancel.is_cancelled() {
                steps = self.walk_forward(steps, bag).await?;
            }
        };

        debug!(participant = %self.participant, steps_remaining = steps, ?stop, "exploration stopped");
        self.last_stop = Some(stop);
        Ok(steps)
    }

    fn crawler(&self) -> &dyn Crawler {
        &self.crawler
    }

    fn last_stop(&self) -> Option<StopReason> {
        self.last_stop
    }
}
