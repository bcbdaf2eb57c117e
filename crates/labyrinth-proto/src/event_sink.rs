//! Observer hub for race notifications.
//!
//! Observers are injected before a race starts and called synchronously on
//! the task that emits the event. A sink handed to an explorer is a clone;
//! observers added to the original afterwards are not seen by the clone.

use crate::RaceEvent;
use std::fmt;
use std::sync::Arc;

/// Type alias for the observer callback function.
type Observer = Arc<dyn Fn(&RaceEvent) + Send + Sync + 'static>;

/// Fans race events out to every registered observer.
#[derive(Clone, Default)]
pub struct EventSink {
    observers: Vec<Observer>,
}

impl EventSink {
    /// Creates a sink with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer that receives all published events.
    pub fn add_observer<F>(&mut self, observer: F)
    where
        F: Fn(&RaceEvent) + Send + Sync + 'static,
    {
        self.observers.push(Arc::new(observer));
    }

    /// Builder form of [`EventSink::add_observer`].
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&RaceEvent) + Send + Sync + 'static,
    {
        self.add_observer(observer);
        self
    }

    /// Delivers an event to every observer in registration order.
    pub fn publish(&self, event: &RaceEvent) {
        for observer in &self.observers {
            observer(event);
        }
    }

    /// Returns the number of observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns true if nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("observers", &self.observers.len())
            .finish()
    }
}
