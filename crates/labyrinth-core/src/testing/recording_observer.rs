//! Observer that keeps every race event for later assertions.

use labyrinth_proto::{EventSink, ParticipantId, ParticipantResult, RaceEvent};
use std::sync::{Arc, Mutex, PoisonError};

/// Collects published events in delivery order.
///
/// Clones share the same log, so one handle can be given to a sink while the
/// test keeps another.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<RaceEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback suitable for [`EventSink::add_observer`].
    pub fn observer(&self) -> impl Fn(&RaceEvent) + Send + Sync + 'static {
        let events = Arc::clone(&self.events);
        move |event| {
            events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event.clone());
        }
    }

    /// A sink with this recorder as its only observer.
    pub fn sink(&self) -> EventSink {
        EventSink::new().with_observer(self.observer())
    }

    /// Everything recorded so far.
    pub fn events(&self) -> Vec<RaceEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of events with the given topic (e.g. `"crawler.position"`).
    pub fn count(&self, topic: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| event.topic() == topic)
            .count()
    }

    /// Events concerning one participant.
    pub fn for_participant(&self, participant: ParticipantId) -> Vec<RaceEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.participant() == participant)
            .collect()
    }

    /// Payloads of every `participant.finished` event.
    pub fn finished(&self) -> Vec<ParticipantResult> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RaceEvent::ParticipantFinished(result) => Some(result),
                _ => None,
            })
            .collect()
    }
}
