use std::ops::Deref;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use keel_core::{Entity, Filter, GlobalFilters};
use keel_events::{EventDispatcher, GeneratesDomainEvents};

use crate::collection::{AsyncCollection, Collection, CollectionSource};
use crate::context::{CancellationScope, CurrentTenant, FilterState};

use super::entity::EntityRepository;
use super::{RepoError, RepoResult};

/// Repository with key-typed identity operations layered on
/// [`EntityRepository`].
///
/// Supplies the identity filter as key equality on the entity's own key and
/// composes the global filters (soft-delete, tenant scope) into key lookups.
/// `Deref` exposes the capability-independent operations of the base
/// repository.
pub struct KeyedEntityRepository<E: Entity, S> {
    base: EntityRepository<E, S>,
}

impl<E, S> KeyedEntityRepository<E, S>
where
    E: Entity + GeneratesDomainEvents + GlobalFilters + Clone + Send + Sync + 'static,
    S: CollectionSource<E>,
{
    pub fn new(
        source: S,
        events: Arc<dyn EventDispatcher>,
        tenant: Arc<dyn CurrentTenant>,
        filters: Arc<dyn FilterState>,
    ) -> Self {
        let base = EntityRepository::new(source, events, tenant, filters)
            .with_identity_filter(|entity: &E| Filter::id_equals(entity.id().clone()));
        Self { base }
    }

    /// Attach an ambient unit-of-work cancellation scope.
    pub fn with_cancellation_scope(mut self, scope: Arc<dyn CancellationScope>) -> Self {
        self.base = self.base.with_cancellation_scope(scope);
        self
    }

    /// Fetch by key under the globally enabled filters.
    ///
    /// Fails with [`RepoError::NotFound`] when no document matches.
    /// `_include_details` is accepted for interface uniformity; eager
    /// loading is store-specific and has no effect at this layer.
    pub fn get(&self, key: &E::Id, _include_details: bool) -> RepoResult<E> {
        self.find(key, _include_details)?
            .ok_or_else(|| Self::not_found(key))
    }

    /// Like [`get`](Self::get), but returns `None` instead of failing.
    pub fn find(&self, key: &E::Id, _include_details: bool) -> RepoResult<Option<E>> {
        let filter = self.key_filter(key, true);
        Ok(Collection::find_one(&self.base.collection(), &filter)?)
    }

    /// Delete the document with this key.
    ///
    /// No global filters apply: deletion targets the exact document
    /// regardless of the current filter-enablement state.
    pub fn delete_by_key(&self, key: &E::Id, _auto_save: bool) -> RepoResult<()> {
        let filter = self.key_filter(key, false);
        Collection::delete_one(&self.base.collection(), &filter)?;
        Ok(())
    }

    pub async fn get_async(
        &self,
        key: &E::Id,
        include_details: bool,
        cancel: CancellationToken,
    ) -> RepoResult<E> {
        self.find_async(key, include_details, cancel)
            .await?
            .ok_or_else(|| Self::not_found(key))
    }

    pub async fn find_async(
        &self,
        key: &E::Id,
        _include_details: bool,
        cancel: CancellationToken,
    ) -> RepoResult<Option<E>> {
        let filter = self.key_filter(key, true);
        let collection = self.base.collection();
        self.base
            .guard(
                &cancel,
                AsyncCollection::find_one(&collection, &filter, &cancel),
            )
            .await
    }

    pub async fn delete_by_key_async(
        &self,
        key: &E::Id,
        _auto_save: bool,
        cancel: CancellationToken,
    ) -> RepoResult<()> {
        let filter = self.key_filter(key, false);
        let collection = self.base.collection();
        self.base
            .guard(
                &cancel,
                AsyncCollection::delete_one(&collection, &filter, &cancel),
            )
            .await?;
        Ok(())
    }

    /// Key-equality filter, with the global filter chain appended when
    /// `apply_filters`. Composition order: identity, soft-delete, tenant.
    fn key_filter(&self, key: &E::Id, apply_filters: bool) -> Filter<E> {
        let identity = Filter::id_equals(key.clone());
        if apply_filters {
            identity.and(self.base.global_filter())
        } else {
            identity
        }
    }

    fn not_found(key: &E::Id) -> RepoError {
        RepoError::NotFound {
            entity: E::entity_name(),
            key: format!("{key:?}"),
        }
    }
}

impl<E: Entity, S> Deref for KeyedEntityRepository<E, S> {
    type Target = EntityRepository<E, S>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
