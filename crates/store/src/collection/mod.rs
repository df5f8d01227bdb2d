//! Typed document-collection boundary.
//!
//! This module defines the store-facing contracts the repositories consume
//! (single-document writes, filter-based reads, sync and cancellation-aware
//! async variants) without making any storage assumptions, plus an
//! in-memory reference driver for tests/dev.

pub mod cursor;
pub mod in_memory;
pub mod r#trait;

pub use cursor::Cursor;
pub use in_memory::{InMemoryCollection, InMemorySource};
pub use r#trait::{AsyncCollection, Collection, CollectionSource, StoreError};
