//! Race notifications published to monitoring and rendering observers.
//!
//! Notifications from one participant are delivered in causal order; there is
//! no ordering across participants, so observers key off [`ParticipantId`].

use crate::CrawlerSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a race participant, numbered from 1 in start order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(u32);

impl ParticipantId {
    /// Creates an identifier.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of one participant's exploration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantResult {
    pub participant: ParticipantId,
    pub crawler: CrawlerSnapshot,
    pub found_exit: bool,
    pub steps_remaining: u32,
    pub was_cancelled: bool,
}

impl ParticipantResult {
    /// Short status label: `found exit`, `cancelled` or `exhausted`.
    pub fn status(&self) -> &'static str {
        if self.found_exit {
            "found exit"
        } else if self.was_cancelled {
            "cancelled"
        } else {
            "exhausted"
        }
    }
}

/// A participant paired with its crawler's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlerUpdate {
    pub participant: ParticipantId,
    pub crawler: CrawlerSnapshot,
}

/// A participant removed from the race by an unexpected fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantFault {
    pub participant: ParticipantId,
    pub reason: String,
}

/// A notification emitted while a race runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum RaceEvent {
    /// A participant was launched.
    #[serde(rename = "participant.started")]
    ParticipantStarted(CrawlerUpdate),

    /// A participant stopped (exit found, cancelled or exhausted).
    #[serde(rename = "participant.finished")]
    ParticipantFinished(ParticipantResult),

    /// A participant failed unexpectedly and was excluded.
    #[serde(rename = "participant.faulted")]
    ParticipantFaulted(ParticipantFault),

    /// A crawler moved to a new cell.
    #[serde(rename = "crawler.position")]
    PositionChanged(CrawlerUpdate),

    /// A crawler turned.
    #[serde(rename = "crawler.direction")]
    DirectionChanged(CrawlerUpdate),
}

impl RaceEvent {
    /// The participant this event concerns.
    pub fn participant(&self) -> ParticipantId {
        match self {
            RaceEvent::ParticipantStarted(update)
            | RaceEvent::PositionChanged(update)
            | RaceEvent::DirectionChanged(update) => update.participant,
            RaceEvent::ParticipantFinished(result) => result.participant,
            RaceEvent::ParticipantFaulted(fault) => fault.participant,
        }
    }

    /// Dotted topic name, matching the serialized `event` tag.
    pub fn topic(&self) -> &'static str {
        match self {
            RaceEvent::ParticipantStarted(_) => "participant.started",
            RaceEvent::ParticipantFinished(_) => "participant.finished",
            RaceEvent::ParticipantFaulted(_) => "participant.faulted",
            RaceEvent::PositionChanged(_) => "crawler.position",
            RaceEvent::DirectionChanged(_) => "crawler.direction",
        }
    }
}
