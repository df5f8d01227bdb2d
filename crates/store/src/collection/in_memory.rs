use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use keel_core::Filter;

use super::cursor::Cursor;
use super::r#trait::{AsyncCollection, Collection, CollectionSource, StoreError};

/// In-memory document collection.
///
/// Intended for tests/dev. Not optimized for performance; every read clones
/// the matched documents.
#[derive(Debug)]
pub struct InMemoryCollection<E> {
    docs: RwLock<Vec<E>>,
}

impl<E> InMemoryCollection<E> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
        }
    }

    /// Raw document count, soft-deleted documents included.
    pub fn len(&self) -> usize {
        self.docs.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<E>>, StoreError> {
        self.docs.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<E>>, StoreError> {
        self.docs.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl<E> Default for InMemoryCollection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Collection<E> for InMemoryCollection<E>
where
    E: Clone + Send + Sync + 'static,
{
    fn insert_one(&self, entity: &E) -> Result<(), StoreError> {
        self.write()?.push(entity.clone());
        Ok(())
    }

    fn replace_one(&self, filter: &Filter<E>, entity: &E) -> Result<u64, StoreError> {
        let mut docs = self.write()?;
        match docs.iter().position(|doc| filter.matches(doc)) {
            Some(idx) => {
                docs[idx] = entity.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_one(&self, filter: &Filter<E>) -> Result<u64, StoreError> {
        let mut docs = self.write()?;
        match docs.iter().position(|doc| filter.matches(doc)) {
            Some(idx) => {
                docs.remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_many(&self, filter: &Filter<E>) -> Result<u64, StoreError> {
        let mut docs = self.write()?;
        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        Ok((before - docs.len()) as u64)
    }

    fn find_one(&self, filter: &Filter<E>) -> Result<Option<E>, StoreError> {
        Ok(self.read()?.iter().find(|doc| filter.matches(doc)).cloned())
    }

    fn find(&self, filter: &Filter<E>) -> Result<Cursor<E>, StoreError> {
        let matched: Vec<E> = self
            .read()?
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect();
        Ok(Cursor::new(matched))
    }
}

// The in-memory driver completes synchronously; the async variants only
// observe the token before touching the collection.
#[async_trait]
impl<E> AsyncCollection<E> for InMemoryCollection<E>
where
    E: Clone + Send + Sync + 'static,
{
    async fn insert_one(&self, entity: &E, cancel: &CancellationToken) -> Result<(), StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Collection::insert_one(self, entity)
    }

    async fn replace_one(
        &self,
        filter: &Filter<E>,
        entity: &E,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Collection::replace_one(self, filter, entity)
    }

    async fn delete_one(
        &self,
        filter: &Filter<E>,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Collection::delete_one(self, filter)
    }

    async fn delete_many(
        &self,
        filter: &Filter<E>,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Collection::delete_many(self, filter)
    }

    async fn find_one(
        &self,
        filter: &Filter<E>,
        cancel: &CancellationToken,
    ) -> Result<Option<E>, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Collection::find_one(self, filter)
    }

    async fn find(
        &self,
        filter: &Filter<E>,
        cancel: &CancellationToken,
    ) -> Result<Cursor<E>, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Collection::find(self, filter)
    }
}

/// Collection source handing out a shared in-memory collection.
#[derive(Debug)]
pub struct InMemorySource<E> {
    collection: Arc<InMemoryCollection<E>>,
}

impl<E> InMemorySource<E> {
    pub fn new() -> Self {
        Self {
            collection: Arc::new(InMemoryCollection::new()),
        }
    }

    /// Shared handle to the underlying collection (test inspection).
    pub fn handle(&self) -> Arc<InMemoryCollection<E>> {
        Arc::clone(&self.collection)
    }
}

impl<E> Default for InMemorySource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for InMemorySource<E> {
    fn clone(&self) -> Self {
        Self {
            collection: Arc::clone(&self.collection),
        }
    }
}

impl<E> CollectionSource<E> for InMemorySource<E>
where
    E: Clone + Send + Sync + 'static,
{
    type Collection = Arc<InMemoryCollection<E>>;

    fn collection(&self) -> Self::Collection {
        Arc::clone(&self.collection)
    }
}
