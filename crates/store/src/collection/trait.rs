use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use keel_core::Filter;

use super::cursor::Cursor;

/// Store operation error (driver-level).
///
/// Repositories propagate these unchanged; no retry, no suppression.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failure surfaced by the storage backend.
    #[error("store backend failure: {0}")]
    Backend(String),

    /// Collection lock poisoned (in-memory driver).
    #[error("collection lock poisoned")]
    LockPoisoned,

    /// The driver observed the operation's cancellation signal.
    #[error("store operation cancelled")]
    Cancelled,
}

/// Typed handle to one collection of documents (sync operations).
///
/// Single-document writes are atomic at the store level; this boundary adds
/// no compare-and-swap or versioning on top.
pub trait Collection<E>: Send + Sync {
    fn insert_one(&self, entity: &E) -> Result<(), StoreError>;

    /// Replace the first document matching `filter`. Returns the number of
    /// documents replaced (0 or 1).
    fn replace_one(&self, filter: &Filter<E>, entity: &E) -> Result<u64, StoreError>;

    /// Delete the first document matching `filter`. Returns the number of
    /// documents removed (0 or 1).
    fn delete_one(&self, filter: &Filter<E>) -> Result<u64, StoreError>;

    /// Delete every document matching `filter`. Returns the number removed.
    fn delete_many(&self, filter: &Filter<E>) -> Result<u64, StoreError>;

    fn find_one(&self, filter: &Filter<E>) -> Result<Option<E>, StoreError>;

    fn find(&self, filter: &Filter<E>) -> Result<Cursor<E>, StoreError>;
}

/// Cancellation-aware async variants of [`Collection`].
///
/// Contracts are identical to the sync operations; a fired token surfaces
/// [`StoreError::Cancelled`] instead of a partial write.
#[async_trait]
pub trait AsyncCollection<E>: Send + Sync {
    async fn insert_one(&self, entity: &E, cancel: &CancellationToken) -> Result<(), StoreError>;

    async fn replace_one(
        &self,
        filter: &Filter<E>,
        entity: &E,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError>;

    async fn delete_one(
        &self,
        filter: &Filter<E>,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError>;

    async fn delete_many(
        &self,
        filter: &Filter<E>,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError>;

    async fn find_one(
        &self,
        filter: &Filter<E>,
        cancel: &CancellationToken,
    ) -> Result<Option<E>, StoreError>;

    async fn find(
        &self,
        filter: &Filter<E>,
        cancel: &CancellationToken,
    ) -> Result<Cursor<E>, StoreError>;
}

impl<E, C> Collection<E> for Arc<C>
where
    C: Collection<E> + ?Sized,
{
    fn insert_one(&self, entity: &E) -> Result<(), StoreError> {
        (**self).insert_one(entity)
    }

    fn replace_one(&self, filter: &Filter<E>, entity: &E) -> Result<u64, StoreError> {
        (**self).replace_one(filter, entity)
    }

    fn delete_one(&self, filter: &Filter<E>) -> Result<u64, StoreError> {
        (**self).delete_one(filter)
    }

    fn delete_many(&self, filter: &Filter<E>) -> Result<u64, StoreError> {
        (**self).delete_many(filter)
    }

    fn find_one(&self, filter: &Filter<E>) -> Result<Option<E>, StoreError> {
        (**self).find_one(filter)
    }

    fn find(&self, filter: &Filter<E>) -> Result<Cursor<E>, StoreError> {
        (**self).find(filter)
    }
}

#[async_trait]
impl<E, C> AsyncCollection<E> for Arc<C>
where
    C: AsyncCollection<E> + ?Sized,
    E: Send + Sync,
{
    async fn insert_one(&self, entity: &E, cancel: &CancellationToken) -> Result<(), StoreError> {
        (**self).insert_one(entity, cancel).await
    }

    async fn replace_one(
        &self,
        filter: &Filter<E>,
        entity: &E,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError> {
        (**self).replace_one(filter, entity, cancel).await
    }

    async fn delete_one(
        &self,
        filter: &Filter<E>,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError> {
        (**self).delete_one(filter, cancel).await
    }

    async fn delete_many(
        &self,
        filter: &Filter<E>,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError> {
        (**self).delete_many(filter, cancel).await
    }

    async fn find_one(
        &self,
        filter: &Filter<E>,
        cancel: &CancellationToken,
    ) -> Result<Option<E>, StoreError> {
        (**self).find_one(filter, cancel).await
    }

    async fn find(
        &self,
        filter: &Filter<E>,
        cancel: &CancellationToken,
    ) -> Result<Cursor<E>, StoreError> {
        (**self).find(filter, cancel).await
    }
}

/// Resolves the typed collection handle for an entity type.
///
/// Repositories hold a source and resolve the handle per operation; they
/// never own a handle long-term.
pub trait CollectionSource<E>: Send + Sync {
    type Collection: Collection<E> + AsyncCollection<E>;

    fn collection(&self) -> Self::Collection;
}
