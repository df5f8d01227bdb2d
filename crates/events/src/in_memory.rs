//! In-memory event dispatcher for tests/dev.

use std::sync::RwLock;

use crate::dispatcher::EventDispatcher;
use crate::record::EventRecord;

/// One delivery observed by the in-memory dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredEvent {
    pub record: EventRecord,
    /// True when delivery was held back behind a unit-of-work scope.
    pub deferred: bool,
}

/// In-memory dispatcher with an optional unit-of-work scope.
///
/// - No IO / no async
/// - Deliveries are recorded in order for inspection
/// - Completion events queue while a scope is open and flush in registration
///   order on completion; an abandoned scope drops them
#[derive(Debug, Default)]
pub struct InMemoryEventDispatcher {
    delivered: RwLock<Vec<DeliveredEvent>>,
    pending: RwLock<Option<Vec<EventRecord>>>,
}

impl InMemoryEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a unit-of-work scope: completion events queue until
    /// [`complete_unit_of_work`](Self::complete_unit_of_work). Nested scopes
    /// are not modeled; a second call joins the open scope.
    pub fn begin_unit_of_work(&self) {
        if let Ok(mut pending) = self.pending.write() {
            pending.get_or_insert_with(Vec::new);
        }
    }

    /// Deliver events queued during the scope, in registration order.
    pub fn complete_unit_of_work(&self) {
        let queued = match self.pending.write() {
            Ok(mut pending) => pending.take().unwrap_or_default(),
            Err(_) => return,
        };
        if let Ok(mut delivered) = self.delivered.write() {
            delivered.extend(queued.into_iter().map(|record| DeliveredEvent {
                record,
                deferred: true,
            }));
        }
    }

    /// Drop queued events without delivering (failed unit of work).
    pub fn abandon_unit_of_work(&self) {
        if let Ok(mut pending) = self.pending.write() {
            pending.take();
        }
    }

    /// Everything delivered so far, in delivery order.
    pub fn delivered(&self) -> Vec<DeliveredEvent> {
        self.delivered
            .read()
            .map(|delivered| delivered.clone())
            .unwrap_or_default()
    }

    /// Kinds of everything delivered so far, in delivery order.
    pub fn delivered_kinds(&self) -> Vec<String> {
        self.delivered
            .read()
            .map(|delivered| {
                delivered
                    .iter()
                    .map(|event| event.record.kind().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut delivered) = self.delivered.write() {
            delivered.clear();
        }
    }
}

impl EventDispatcher for InMemoryEventDispatcher {
    fn dispatch(&self, event: EventRecord) {
        if let Ok(mut delivered) = self.delivered.write() {
            delivered.push(DeliveredEvent {
                record: event,
                deferred: false,
            });
        }
    }

    fn register_after_completion(&self, event: EventRecord) {
        if let Ok(mut pending) = self.pending.write() {
            if let Some(queue) = pending.as_mut() {
                queue.push(event);
                return;
            }
        }
        // No active unit of work: deliver immediately.
        self.dispatch(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(kind: &str) -> EventRecord {
        EventRecord::new(kind, json!({}))
    }

    #[test]
    fn dispatch_records_in_order() {
        let dispatcher = InMemoryEventDispatcher::new();
        dispatcher.dispatch(record("first"));
        dispatcher.dispatch(record("second"));

        assert_eq!(dispatcher.delivered_kinds(), vec!["first", "second"]);
        assert!(dispatcher.delivered().iter().all(|event| !event.deferred));
    }

    #[test]
    fn registration_without_scope_delivers_immediately() {
        let dispatcher = InMemoryEventDispatcher::new();
        dispatcher.register_after_completion(record("completed"));

        assert_eq!(dispatcher.delivered_kinds(), vec!["completed"]);
        assert!(!dispatcher.delivered()[0].deferred);
    }

    #[test]
    fn scope_defers_completion_events_until_complete() {
        let dispatcher = InMemoryEventDispatcher::new();
        dispatcher.begin_unit_of_work();
        dispatcher.register_after_completion(record("completed"));
        dispatcher.dispatch(record("immediate"));

        assert_eq!(dispatcher.delivered_kinds(), vec!["immediate"]);

        dispatcher.complete_unit_of_work();
        assert_eq!(dispatcher.delivered_kinds(), vec!["immediate", "completed"]);
        assert!(dispatcher.delivered()[1].deferred);
    }

    #[test]
    fn scope_preserves_registration_order() {
        let dispatcher = InMemoryEventDispatcher::new();
        dispatcher.begin_unit_of_work();
        dispatcher.register_after_completion(record("a"));
        dispatcher.register_after_completion(record("b"));
        dispatcher.complete_unit_of_work();

        assert_eq!(dispatcher.delivered_kinds(), vec!["a", "b"]);
    }

    #[test]
    fn abandoned_scope_drops_queued_events() {
        let dispatcher = InMemoryEventDispatcher::new();
        dispatcher.begin_unit_of_work();
        dispatcher.register_after_completion(record("never"));
        dispatcher.abandon_unit_of_work();

        assert!(dispatcher.delivered_kinds().is_empty());

        // The scope is gone: registration is immediate again.
        dispatcher.register_after_completion(record("now"));
        assert_eq!(dispatcher.delivered_kinds(), vec!["now"]);
    }
}
