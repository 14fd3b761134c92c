//! Lifecycle metrics collected by a listener

use crate::{ListenerError, RelationshipEvent, RelationshipListener};
use rapport_domain::Relationship;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts lifecycle events per kind
///
/// Register it like any other listener; it never fails.
#[derive(Debug, Default)]
pub struct RelationshipMetrics {
    requested: AtomicUsize,
    confirmed: AtomicUsize,
    denied: AtomicUsize,
    removed: AtomicUsize,
    ignored: AtomicUsize,
}

impl RelationshipMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, event: RelationshipEvent) -> &AtomicUsize {
        match event {
            RelationshipEvent::Requested => &self.requested,
            RelationshipEvent::Confirmed => &self.confirmed,
            RelationshipEvent::Denied => &self.denied,
            RelationshipEvent::Removed => &self.removed,
            RelationshipEvent::Ignored => &self.ignored,
        }
    }

    /// Record one event
    pub fn record(&self, event: RelationshipEvent) {
        self.counter(event).fetch_add(1, Ordering::Relaxed);
    }

    /// Number of events of one kind
    pub fn count(&self, event: RelationshipEvent) -> usize {
        self.counter(event).load(Ordering::Relaxed)
    }

    /// Total events across all kinds
    pub fn total(&self) -> usize {
        RelationshipEvent::ALL.iter().map(|e| self.count(*e)).sum()
    }

    /// Reset all counters
    pub fn reset(&self) {
        for event in RelationshipEvent::ALL {
            self.counter(event).store(0, Ordering::Relaxed);
        }
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Relationship Metrics Summary".to_string(),
            "============================".to_string(),
        ];

        for event in RelationshipEvent::ALL {
            lines.push(format!("{:<10} {}", event.as_str(), self.count(event)));
        }
        lines.push(format!("{:<10} {}", "total", self.total()));

        lines.join("\n")
    }
}

impl<M> RelationshipListener<M> for RelationshipMetrics {
    fn name(&self) -> &str {
        "metrics"
    }

    fn on_requested(&self, _: &M, _: &Relationship) -> Result<(), ListenerError> {
        self.record(RelationshipEvent::Requested);
        Ok(())
    }

    fn on_confirmed(&self, _: &M, _: &Relationship) -> Result<(), ListenerError> {
        self.record(RelationshipEvent::Confirmed);
        Ok(())
    }

    fn on_denied(&self, _: &M, _: &Relationship) -> Result<(), ListenerError> {
        self.record(RelationshipEvent::Denied);
        Ok(())
    }

    fn on_removed(&self, _: &M, _: &Relationship) -> Result<(), ListenerError> {
        self.record(RelationshipEvent::Removed);
        Ok(())
    }

    fn on_ignored(&self, _: &M, _: &Relationship) -> Result<(), ListenerError> {
        self.record(RelationshipEvent::Ignored);
        Ok(())
    }
}
