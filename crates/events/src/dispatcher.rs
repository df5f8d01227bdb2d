//! Local event delivery contract (consumed interface).

use std::sync::Arc;

use crate::record::EventRecord;

/// Delivers event records to subscribers.
///
/// Delivery is fire-and-continue: callers do not consume a return value and
/// perform no retry. Implementations decide where events go (in-process
/// handlers, an outbox, a bus).
pub trait EventDispatcher: Send + Sync {
    /// Deliver immediately and synchronously, on the caller's thread.
    fn dispatch(&self, event: EventRecord);

    /// Queue for delivery once the ambient unit of work completes.
    ///
    /// When no unit of work is active, delivery is immediate.
    fn register_after_completion(&self, event: EventRecord);
}

impl<D> EventDispatcher for Arc<D>
where
    D: EventDispatcher + ?Sized,
{
    fn dispatch(&self, event: EventRecord) {
        (**self).dispatch(event)
    }

    fn register_after_completion(&self, event: EventRecord) {
        (**self).register_after_completion(event)
    }
}
