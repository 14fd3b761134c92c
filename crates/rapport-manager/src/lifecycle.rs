//! Lifecycle notification for relationship transitions.
//!
//! Listeners are kept in registration order and notified synchronously after
//! each successful transition. The first failing listener stops the fan-out
//! and its error is returned to the caller of the transition.

use crate::ListenerError;
use rapport_domain::Relationship;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Kind of lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipEvent {
    /// An invitation was sent
    Requested,
    /// An invitation was accepted
    Confirmed,
    /// An invitation was declined and deleted
    Denied,
    /// An existing relationship was deleted
    Removed,
    /// An invitation was ignored
    Ignored,
}

impl RelationshipEvent {
    /// Every event kind, in lifecycle order
    pub const ALL: [RelationshipEvent; 5] = [
        RelationshipEvent::Requested,
        RelationshipEvent::Confirmed,
        RelationshipEvent::Denied,
        RelationshipEvent::Removed,
        RelationshipEvent::Ignored,
    ];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipEvent::Requested => "requested",
            RelationshipEvent::Confirmed => "confirmed",
            RelationshipEvent::Denied => "denied",
            RelationshipEvent::Removed => "removed",
            RelationshipEvent::Ignored => "ignored",
        }
    }
}

impl fmt::Display for RelationshipEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives relationship lifecycle events
///
/// `M` is the component driving the notifications (the relationship manager),
/// handed to every callback so listeners can run follow-up queries. All
/// callbacks default to doing nothing.
pub trait RelationshipListener<M>: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// An invitation was sent
    fn on_requested(&self, _source: &M, _relationship: &Relationship) -> Result<(), ListenerError> {
        Ok(())
    }

    /// An invitation was accepted
    fn on_confirmed(&self, _source: &M, _relationship: &Relationship) -> Result<(), ListenerError> {
        Ok(())
    }

    /// An invitation was declined
    fn on_denied(&self, _source: &M, _relationship: &Relationship) -> Result<(), ListenerError> {
        Ok(())
    }

    /// A relationship was removed
    fn on_removed(&self, _source: &M, _relationship: &Relationship) -> Result<(), ListenerError> {
        Ok(())
    }

    /// An invitation was ignored
    fn on_ignored(&self, _source: &M, _relationship: &Relationship) -> Result<(), ListenerError> {
        Ok(())
    }
}

/// Ordered, de-duplicated set of lifecycle listeners
pub struct LifecycleNotifier<M> {
    listeners: Vec<Arc<dyn RelationshipListener<M>>>,
}

impl<M> LifecycleNotifier<M> {
    /// Create a notifier with no listeners
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Add a listener at the end of the notification order
    ///
    /// Returns `false` if this exact listener instance is already registered.
    pub fn add_listener(&mut self, listener: Arc<dyn RelationshipListener<M>>) -> bool {
        if self.listeners.iter().any(|l| same_listener(l, &listener)) {
            debug!("Listener already registered: {}", listener.name());
            return false;
        }

        debug!("Listener registered: {}", listener.name());
        self.listeners.push(listener);
        true
    }

    /// Remove a listener instance
    ///
    /// Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, listener: &Arc<dyn RelationshipListener<M>>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !same_listener(l, listener));

        let removed = self.listeners.len() < before;
        if removed {
            debug!("Listener unregistered: {}", listener.name());
        }
        removed
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Names of the registered listeners, in notification order
    pub fn listener_names(&self) -> Vec<String> {
        self.listeners.iter().map(|l| l.name().to_string()).collect()
    }

    /// Deliver `event` to every listener in registration order
    pub fn notify(
        &self,
        event: RelationshipEvent,
        source: &M,
        relationship: &Relationship,
    ) -> Result<(), ListenerError> {
        for listener in &self.listeners {
            match event {
                RelationshipEvent::Requested => listener.on_requested(source, relationship)?,
                RelationshipEvent::Confirmed => listener.on_confirmed(source, relationship)?,
                RelationshipEvent::Denied => listener.on_denied(source, relationship)?,
                RelationshipEvent::Removed => listener.on_removed(source, relationship)?,
                RelationshipEvent::Ignored => listener.on_ignored(source, relationship)?,
            }
            debug!(
                "Listener '{}' handled {} for {}",
                listener.name(),
                event,
                relationship.id
            );
        }
        Ok(())
    }
}

impl<M> Default for LifecycleNotifier<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity comparison on the allocation, ignoring vtable pointers
fn same_listener<M>(
    a: &Arc<dyn RelationshipListener<M>>,
    b: &Arc<dyn RelationshipListener<M>>,
) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapport_domain::Identity;
    use std::sync::Mutex;

    /// The notifier does not care what drives it
    struct Source;

    struct Recorder {
        name: String,
        log: Arc<Mutex<Vec<String>>>,
        fail_on: Option<RelationshipEvent>,
    }

    impl Recorder {
        fn record(&self, event: RelationshipEvent) -> Result<(), ListenerError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.name, event));
            if self.fail_on == Some(event) {
                return Err(ListenerError::new(&self.name, "boom"));
            }
            Ok(())
        }
    }

    impl RelationshipListener<Source> for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn on_requested(&self, _: &Source, _: &Relationship) -> Result<(), ListenerError> {
            self.record(RelationshipEvent::Requested)
        }

        fn on_confirmed(&self, _: &Source, _: &Relationship) -> Result<(), ListenerError> {
            self.record(RelationshipEvent::Confirmed)
        }

        fn on_denied(&self, _: &Source, _: &Relationship) -> Result<(), ListenerError> {
            self.record(RelationshipEvent::Denied)
        }

        fn on_removed(&self, _: &Source, _: &Relationship) -> Result<(), ListenerError> {
            self.record(RelationshipEvent::Removed)
        }

        fn on_ignored(&self, _: &Source, _: &Relationship) -> Result<(), ListenerError> {
            self.record(RelationshipEvent::Ignored)
        }
    }

    /// Only overrides one callback
    struct Quiet;

    impl RelationshipListener<Source> for Quiet {
        fn name(&self) -> &str {
            "quiet"
        }
    }

    fn recorder(
        name: &str,
        log: &Arc<Mutex<Vec<String>>>,
        fail_on: Option<RelationshipEvent>,
    ) -> Arc<dyn RelationshipListener<Source>> {
        Arc::new(Recorder {
            name: name.to_string(),
            log: Arc::clone(log),
            fail_on,
        })
    }

    fn relationship() -> Relationship {
        Relationship::new(
            Identity::new("organization", "john"),
            Identity::new("organization", "mary"),
        )
    }

    #[test]
    fn test_new_notifier() {
        let notifier: LifecycleNotifier<Source> = LifecycleNotifier::new();
        assert!(notifier.is_empty());
        assert!(notifier.notify(RelationshipEvent::Requested, &Source, &relationship()).is_ok());
    }

    #[test]
    fn test_notify_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = LifecycleNotifier::new();
        notifier.add_listener(recorder("first", &log, None));
        notifier.add_listener(recorder("second", &log, None));

        notifier
            .notify(RelationshipEvent::Confirmed, &Source, &relationship())
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:confirmed".to_string(), "second:confirmed".to_string()]
        );
    }

    #[test]
    fn test_each_event_reaches_its_callback() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = LifecycleNotifier::new();
        notifier.add_listener(recorder("r", &log, None));

        for event in RelationshipEvent::ALL {
            notifier.notify(event, &Source, &relationship()).unwrap();
        }

        assert_eq!(
            *log.lock().unwrap(),
            vec!["r:requested", "r:confirmed", "r:denied", "r:removed", "r:ignored"]
        );
    }

    #[test]
    fn test_duplicate_registration_ignored() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = LifecycleNotifier::new();
        let listener = recorder("once", &log, None);

        assert!(notifier.add_listener(Arc::clone(&listener)));
        assert!(!notifier.add_listener(Arc::clone(&listener)));
        assert_eq!(notifier.len(), 1);

        notifier
            .notify(RelationshipEvent::Requested, &Source, &relationship())
            .unwrap();
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_equal_but_distinct_listeners_both_kept() {
        let mut notifier: LifecycleNotifier<Source> = LifecycleNotifier::new();
        notifier.add_listener(Arc::new(Quiet));
        notifier.add_listener(Arc::new(Quiet));
        assert_eq!(notifier.listener_names(), vec!["quiet", "quiet"]);
    }

    #[test]
    fn test_remove_listener() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = LifecycleNotifier::new();
        let first = recorder("first", &log, None);
        let second = recorder("second", &log, None);
        notifier.add_listener(Arc::clone(&first));
        notifier.add_listener(Arc::clone(&second));

        assert!(notifier.remove_listener(&first));
        assert!(!notifier.remove_listener(&first));
        assert_eq!(notifier.listener_names(), vec!["second"]);
    }

    #[test]
    fn test_failure_stops_fan_out() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = LifecycleNotifier::new();
        notifier.add_listener(recorder("first", &log, Some(RelationshipEvent::Denied)));
        notifier.add_listener(recorder("second", &log, None));

        let err = notifier
            .notify(RelationshipEvent::Denied, &Source, &relationship())
            .unwrap_err();

        assert_eq!(err.listener, "first");
        assert_eq!(*log.lock().unwrap(), vec!["first:denied"]);
    }

    #[test]
    fn test_default_callbacks_do_nothing() {
        let mut notifier: LifecycleNotifier<Source> = LifecycleNotifier::new();
        notifier.add_listener(Arc::new(Quiet));

        for event in RelationshipEvent::ALL {
            assert!(notifier.notify(event, &Source, &relationship()).is_ok());
        }
    }
}
