//! Cooperative cancellation scopes built on `tokio::sync::watch`.
//!
//! A [`CancelSource`] flips a flag once; every [`CancelSignal`] derived from
//! it observes the flip. Linked sources also observe their parent's signal,
//! which is how a race derives its internal scope from the caller's.

use futures::future::select_all;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::watch;

/// Owner side of a cancellation scope.
#[derive(Debug)]
pub struct CancelSource {
    tx: watch::Sender<bool>,
    parents: Vec<watch::Receiver<bool>>,
}

impl CancelSource {
    /// Creates an independent, not yet cancelled scope.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx,
            parents: Vec::new(),
        }
    }

    /// Creates a scope that is also cancelled whenever `parent` is.
    pub fn linked(parent: &CancelSignal) -> Self {
        let mut source = Self::new();
        source.parents = parent.receivers.clone();
        source
    }

    /// Requests cancellation.
    ///
    /// Returns true only for the call that actually flipped the flag; later
    /// calls are no-ops.
    pub fn cancel(&self) -> bool {
        self.tx.send_if_modified(|cancelled| {
            if *cancelled {
                false
            } else {
                *cancelled = true;
                true
            }
        })
    }

    /// Returns true once this scope or any parent is cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow() || self.parents.iter().any(|rx| *rx.borrow())
    }

    /// A signal observing this scope and its parents.
    pub fn signal(&self) -> CancelSignal {
        let mut receivers = self.parents.clone();
        receivers.push(self.tx.subscribe());
        CancelSignal { receivers }
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a cancellation scope; cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    receivers: Vec<watch::Receiver<bool>>,
}

impl CancelSignal {
    /// A signal that is never cancelled.
    pub fn never() -> Self {
        Self::default()
    }

    /// Synchronous check, used at loop-iteration boundaries.
    pub fn is_cancelled(&self) -> bool {
        self.receivers.iter().any(|rx| *rx.borrow())
    }

    /// Resolves once any observed scope is cancelled.
    ///
    /// Never resolves for [`CancelSignal::never`] or when every source was
    /// dropped without cancelling.
    pub async fn cancelled(&self) {
        if self.receivers.is_empty() {
            return std::future::pending().await;
        }

        let waits = self.receivers.iter().cloned().map(|mut rx| {
            Box::pin(async move {
                if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                    std::future::pending::<()>().await;
                }
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        select_all(waits).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancel_is_one_shot() {
        let source = CancelSource::new();
        let signal = source.signal();

        assert!(!signal.is_cancelled());
        assert!(source.cancel());
        assert!(!source.cancel());
        assert!(signal.is_cancelled());
    }

    #[test]
    fn test_signal_taken_after_cancel_sees_it() {
        let source = CancelSource::new();
        source.cancel();
        assert!(source.signal().is_cancelled());
    }

    #[test]
    fn test_linked_scope_follows_parent_not_vice_versa() {
        let parent = CancelSource::new();
        let child = CancelSource::linked(&parent.signal());
        let child_signal = child.signal();

        assert!(child.cancel());
        assert!(child_signal.is_cancelled());
        assert!(!parent.is_cancelled());

        let other_child = CancelSource::linked(&parent.signal());
        let other_signal = other_child.signal();
        parent.cancel();
        assert!(other_signal.is_cancelled());
        assert!(other_child.is_cancelled());
    }

    #[test]
    fn test_never_is_never_cancelled() {
        assert!(!CancelSignal::never().is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves_on_parent_cancel() {
        let parent = CancelSource::new();
        let child = CancelSource::linked(&parent.signal());
        let signal = child.signal();

        let waiter = tokio::spawn(async move { signal.cancelled().await });
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(!waiter.is_finished());

        parent.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should resolve")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_future_pends_when_source_dropped() {
        let source = CancelSource::new();
        let signal = source.signal();
        drop(source);

        let outcome = tokio::time::timeout(Duration::from_millis(20), signal.cancelled()).await;
        assert!(outcome.is_err());
    }
}
