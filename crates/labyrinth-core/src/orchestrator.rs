//! First-to-the-exit race between concurrent explorers.
//!
//! Every participant runs as its own task on a [`JoinSet`], bound to one
//! shared cancellation scope derived from the caller's signal. Results are
//! consumed in completion order by a single loop, which is the only writer
//! of the winner slot.

use crate::cancel::{CancelSignal, CancelSource};
use crate::explorer::{BfsExplorer, ExploreError, Explorer, StopReason};
use labyrinth_proto::{
    Crawler, CrawlerUpdate, EventSink, Inventory, ParticipantFault, ParticipantId,
    ParticipantResult, RaceEvent, TileKind,
};
use std::collections::HashMap;
use std::future::Future;
use tokio::task::{self, JoinError, JoinSet};
use tracing::{error, info, warn};

/// Upper bound for [`RaceOrchestrator::new`].
pub const MAX_PARTICIPANTS_LIMIT: usize = 3;

/// Rejected race configuration or a slot that could not be prepared.
#[derive(Debug, thiserror::Error)]
pub enum RaceError {
    #[error("max participants must be between 1 and {limit}, got {requested}")]
    InvalidMaxParticipants { requested: usize, limit: usize },

    #[error("participant count must be between 1 and {max}, got {requested}")]
    InvalidParticipantCount { requested: usize, max: usize },

    #[error("step budget must be positive")]
    InvalidStepBudget,

    #[error("failed to prepare participant {participant}: {source}")]
    Factory {
        participant: ParticipantId,
        #[source]
        source: labyrinth_proto::Error,
    },
}

/// A crawler and the bag it carries, as handed out for one race slot.
pub struct CrawlerKit {
    pub crawler: Box<dyn Crawler>,
    pub bag: Box<dyn Inventory>,
}

impl CrawlerKit {
    pub fn new(crawler: impl Crawler + 'static, bag: impl Inventory + 'static) -> Self {
        Self {
            crawler: Box::new(crawler),
            bag: Box::new(bag),
        }
    }
}

impl std::fmt::Debug for CrawlerKit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlerKit")
            .field("crawler", &self.crawler.snapshot())
            .finish_non_exhaustive()
    }
}

/// Explorer factory building a [`BfsExplorer`] per slot.
pub fn bfs_explorers(
    map_size: usize,
) -> impl FnMut(ParticipantId, Box<dyn Crawler>, EventSink) -> Box<dyn Explorer> {
    move |participant: ParticipantId, crawler: Box<dyn Crawler>, sink: EventSink| {
        let explorer: Box<dyn Explorer> =
            Box::new(BfsExplorer::new(crawler, map_size).observed_by(participant, sink));
        explorer
    }
}

/// Everything a race produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaceSummary {
    /// The first participant observed with the exit in sight.
    pub winner: Option<ParticipantResult>,
    /// Every participant that finished, in completion order.
    pub finished: Vec<ParticipantResult>,
    /// Participants excluded after an unexpected fault.
    pub faulted: Vec<ParticipantId>,
}

/// Runs races of up to `max_participants` explorers.
#[derive(Debug, Clone)]
pub struct RaceOrchestrator {
    max_participants: usize,
    sink: EventSink,
}

impl RaceOrchestrator {
    /// Creates an orchestrator; `max_participants` must be in `1..=3`.
    pub fn new(max_participants: usize) -> Result<Self, RaceError> {
        if !(1..=MAX_PARTICIPANTS_LIMIT).contains(&max_participants) {
            return Err(RaceError::InvalidMaxParticipants {
                requested: max_participants,
                limit: MAX_PARTICIPANTS_LIMIT,
            });
        }
        Ok(Self {
            max_participants,
            sink: EventSink::new(),
        })
    }

    /// Publishes race notifications to `sink`.
    pub fn with_sink(mut self, sink: EventSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn max_participants(&self) -> usize {
        self.max_participants
    }

    /// Runs a race and returns the winner, if any.
    pub async fn run<F, Fut, E>(
        &self,
        crawlers: F,
        explorers: E,
        participant_count: usize,
        step_budget: u32,
        external: &CancelSignal,
    ) -> Result<Option<ParticipantResult>, RaceError>
    where
        F: FnMut(ParticipantId) -> Fut,
        Fut: Future<Output = labyrinth_proto::Result<CrawlerKit>>,
        E: FnMut(ParticipantId, Box<dyn Crawler>, EventSink) -> Box<dyn Explorer>,
    {
        let summary = self
            .run_with_summary(crawlers, explorers, participant_count, step_budget, external)
            .await?;
        Ok(summary.winner)
    }

    /// Runs a race and returns every outcome.
    ///
    /// Arguments are validated before any participant is prepared. A
    /// participant whose exploration fails or panics is logged, reported as
    /// `ParticipantFaulted` and left out of the results; the race goes on
    /// without it.
    pub async fn run_with_summary<F, Fut, E>(
        &self,
        mut crawlers: F,
        mut explorers: E,
        participant_count: usize,
        step_budget: u32,
        external: &CancelSignal,
    ) -> Result<RaceSummary, RaceError>
    where
        F: FnMut(ParticipantId) -> Fut,
        Fut: Future<Output = labyrinth_proto::Result<CrawlerKit>>,
        E: FnMut(ParticipantId, Box<dyn Crawler>, EventSink) -> Box<dyn Explorer>,
    {
        if !(1..=self.max_participants).contains(&participant_count) {
            return Err(RaceError::InvalidParticipantCount {
                requested: participant_count,
                max: self.max_participants,
            });
        }
        if step_budget == 0 {
            return Err(RaceError::InvalidStepBudget);
        }

        let scope = CancelSource::linked(external);
        let mut tasks = JoinSet::new();
        let mut roster = HashMap::new();
        let mut summary = RaceSummary::default();

        for slot in 1..=participant_count {
            let participant = ParticipantId::new(slot as u32);
            let kit = match crawlers(participant).await {
                Ok(kit) => kit,
                Err(source) => {
                    error!(participant = %participant, error = %source, "failed to prepare participant");
                    scope.cancel();
                    // Launched participants still report how they ended.
                    while let Some(joined) = tasks.join_next_with_id().await {
                        self.settle(joined, &mut roster, &scope, &mut summary);
                    }
                    return Err(RaceError::Factory {
                        participant,
                        source,
                    });
                }
            };

            let explorer = explorers(participant, kit.crawler, self.sink.clone());
            let crawler = explorer.crawler().snapshot();
            self.sink
                .publish(&RaceEvent::ParticipantStarted(CrawlerUpdate {
                    participant,
                    crawler,
                }));
            info!(participant = %participant, position = %crawler.position, "participant started");

            let handle = tasks.spawn(run_participant(
                participant,
                explorer,
                kit.bag,
                step_budget,
                scope.signal(),
            ));
            roster.insert(handle.id(), participant);
        }

        let mut cancel_noted = false;
        loop {
            let joined = tokio::select! {
                joined = tasks.join_next_with_id() => joined,
                () = external.cancelled(), if !cancel_noted => {
                    cancel_noted = true;
                    warn!("race cancelled by caller");
                    continue;
                }
            };
            let Some(joined) = joined else {
                break;
            };
            self.settle(joined, &mut roster, &scope, &mut summary);
        }

        match &summary.winner {
            Some(winner) => info!(
                participant = %winner.participant,
                steps_remaining = winner.steps_remaining,
                "race won"
            ),
            None => info!("race ended without a winner"),
        }
        Ok(summary)
    }

    /// Routes one completed participant task to the finish or fault path.
    fn settle(
        &self,
        joined: Result<(task::Id, Result<ParticipantResult, ExploreError>), JoinError>,
        roster: &mut HashMap<task::Id, ParticipantId>,
        scope: &CancelSource,
        summary: &mut RaceSummary,
    ) {
        match joined {
            Ok((id, Ok(result))) => {
                roster.remove(&id);
                self.record_finish(result, scope, summary);
            }
            Ok((id, Err(fault))) => {
                let participant = roster.remove(&id).unwrap_or_default();
                self.record_fault(participant, fault.to_string(), summary);
            }
            Err(join_error) => {
                let participant = roster.remove(&join_error.id()).unwrap_or_default();
                let reason = if join_error.is_panic() {
                    "exploration panicked".to_string()
                } else {
                    "exploration task aborted".to_string()
                };
                self.record_fault(participant, reason, summary);
            }
        }
    }

    fn record_finish(
        &self,
        result: ParticipantResult,
        scope: &CancelSource,
        summary: &mut RaceSummary,
    ) {
        info!(
            participant = %result.participant,
            status = result.status(),
            steps_remaining = result.steps_remaining,
            "participant finished"
        );
        self.sink
            .publish(&RaceEvent::ParticipantFinished(result.clone()));

        if result.found_exit && summary.winner.is_none() {
            scope.cancel();
            summary.winner = Some(result.clone());
        }
        summary.finished.push(result);
    }

    fn record_fault(&self, participant: ParticipantId, reason: String, summary: &mut RaceSummary) {
        error!(participant = %participant, fault = %reason, "participant faulted, excluded from race");
        self.sink
            .publish(&RaceEvent::ParticipantFaulted(ParticipantFault {
                participant,
                reason,
            }));
        summary.faulted.push(participant);
    }
}

/// One participant's unit of work.
///
/// A participant counts as cancelled only if exploration stopped because the
/// scope fired. Otherwise the exit counts as found if it is still in sight.
async fn run_participant(
    participant: ParticipantId,
    mut explorer: Box<dyn Explorer>,
    bag: Box<dyn Inventory>,
    step_budget: u32,
    cancel: CancelSignal,
) -> Result<ParticipantResult, ExploreError> {
    let steps_remaining = explorer.explore(step_budget, bag.as_ref(), &cancel).await?;

    let was_cancelled = explorer.last_stop() == Some(StopReason::Cancelled);
    let found_exit =
        !was_cancelled && explorer.crawler().facing_tile().await? == TileKind::Outside;

    Ok(ParticipantResult {
        participant,
        crawler: explorer.crawler().snapshot(),
        found_exit,
        steps_remaining,
        was_cancelled,
    })
}
