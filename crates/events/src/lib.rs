//! Local (in-process) event plumbing.
//!
//! Event records with runtime-discoverable kinds, the staging capability for
//! event-generating entities, repository lifecycle events, and the dispatch
//! contract with an in-memory implementation for tests/dev.

pub mod dispatcher;
pub mod in_memory;
pub mod lifecycle;
pub mod record;
pub mod staged;

pub use dispatcher::EventDispatcher;
pub use in_memory::{DeliveredEvent, InMemoryEventDispatcher};
pub use lifecycle::{LifecycleStage, lifecycle_record};
pub use record::{DomainEvent, EventRecord};
pub use staged::{GeneratesDomainEvents, StagedEvents};
