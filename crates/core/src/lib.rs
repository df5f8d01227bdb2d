//! `keel-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! entity identity, storage capability traits, the composable filter model,
//! and strongly-typed identifiers.

pub mod capability;
pub mod entity;
pub mod error;
pub mod filter;
pub mod id;

pub use capability::{MultiTenant, SoftDeletable};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use filter::{Filter, GlobalFilters, SOFT_DELETE_FILTER};
pub use id::TenantId;
