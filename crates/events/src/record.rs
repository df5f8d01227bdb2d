use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use keel_core::{DomainError, DomainResult};

/// A typed domain event produced by an entity.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - tagged with a **stable kind** (e.g. "ticket.opened")
pub trait DomainEvent: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event kind identifier.
    fn kind(&self) -> &'static str;
}

/// An event staged for dispatch: a runtime-discoverable kind tag plus an
/// opaque payload.
///
/// This is the unit the dispatcher consumes; the repository never looks
/// inside the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    kind: String,
    payload: JsonValue,
    occurred_at: DateTime<Utc>,
}

impl EventRecord {
    pub fn new(kind: impl Into<String>, payload: JsonValue) -> Self {
        Self {
            kind: kind.into(),
            payload,
            occurred_at: Utc::now(),
        }
    }

    /// Convenience constructor from a typed event.
    ///
    /// Keeps dispatch decoupled from business types while preserving the
    /// kind tag needed for routing.
    pub fn from_typed<E>(event: &E) -> DomainResult<Self>
    where
        E: DomainEvent + Serialize,
    {
        let payload = serde_json::to_value(event).map_err(|e| {
            DomainError::validation(format!("event payload serialization failed: {e}"))
        })?;
        Ok(Self::new(event.kind(), payload))
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize)]
    struct Opened {
        id: u32,
    }

    impl DomainEvent for Opened {
        fn kind(&self) -> &'static str {
            "ticket.opened"
        }
    }

    #[test]
    fn from_typed_captures_kind_and_payload() {
        let record = EventRecord::from_typed(&Opened { id: 9 }).unwrap();
        assert_eq!(record.kind(), "ticket.opened");
        assert_eq!(record.payload()["id"], 9);
    }
}
