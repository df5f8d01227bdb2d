use serde::Serialize;

use keel_core::DomainResult;

use crate::record::{DomainEvent, EventRecord};

/// Capability for entities that stage domain events until a mutating
/// repository operation drains them.
///
/// The defaults describe a type with no staged events. Event-generating
/// entities override both methods, typically by embedding [`StagedEvents`].
pub trait GeneratesDomainEvents {
    /// Staged events awaiting dispatch.
    fn staged_events(&self) -> &[EventRecord] {
        &[]
    }

    /// Remove and return all staged events.
    ///
    /// Drained exactly once per mutating operation; the staging buffer is
    /// empty afterwards, so no staging is dispatched twice.
    fn drain_events(&mut self) -> Vec<EventRecord> {
        Vec::new()
    }
}

/// Reusable staging buffer for event-generating entities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedEvents {
    events: Vec<EventRecord>,
}

impl StagedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&mut self, record: EventRecord) {
        self.events.push(record);
    }

    /// Stage a typed event, serializing its payload.
    pub fn stage_typed<E>(&mut self, event: &E) -> DomainResult<()>
    where
        E: DomainEvent + Serialize,
    {
        self.events.push(EventRecord::from_typed(event)?);
        Ok(())
    }

    pub fn as_slice(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drain_empties_the_buffer() {
        let mut staged = StagedEvents::new();
        staged.stage(EventRecord::new("a", json!({})));
        staged.stage(EventRecord::new("b", json!({})));

        let drained = staged.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].kind(), "a");
        assert!(staged.is_empty());
        assert!(staged.drain().is_empty());
    }
}
