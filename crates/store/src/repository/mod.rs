//! Generic repositories: CRUD with deterministic event semantics and
//! composable global filters wrapped around thin store I/O.

mod entity;
mod keyed;

pub use entity::EntityRepository;
pub use keyed::KeyedEntityRepository;

use thiserror::Error;

use crate::collection::StoreError;

/// Result type used across the repository layer.
pub type RepoResult<T> = Result<T, RepoError>;

/// Repository operation error.
///
/// Failures propagate to the immediate caller; nothing is logged, retried,
/// or swallowed here.
#[derive(Debug, Error)]
pub enum RepoError {
    /// No document matched the key under the active filters.
    #[error("{entity} with key {key} was not found")]
    NotFound { entity: &'static str, key: String },

    /// The repository has no identity-filter hook for this entity type.
    ///
    /// A configuration defect, not a runtime condition to recover from:
    /// supply the hook or use the keyed repository.
    #[error("no identity filter for {entity}: supply an identity-filter hook or use a keyed repository")]
    NotImplemented { entity: &'static str },

    /// Store failure, propagated unchanged.
    #[error(transparent)]
    Store(StoreError),

    /// The operation observed its cancellation signal before completing.
    #[error("operation cancelled")]
    Cancelled,
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Cancelled => RepoError::Cancelled,
            other => RepoError::Store(other),
        }
    }
}
