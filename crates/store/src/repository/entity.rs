use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use keel_core::{Entity, Filter, GlobalFilters, SOFT_DELETE_FILTER};
use keel_events::{EventDispatcher, GeneratesDomainEvents, LifecycleStage, lifecycle_record};

use crate::collection::{AsyncCollection, Collection, CollectionSource, Cursor, StoreError};
use crate::context::{CancellationScope, CurrentTenant, FilterState, NoCancellationScope};

use super::{RepoError, RepoResult};

type IdentityFilterFn<E> = Arc<dyn Fn(&E) -> Filter<E> + Send + Sync>;

/// Generic, capability-independent repository over one collection.
///
/// Stateless across calls: ambient tenant and filter state are re-read on
/// every operation, and the collection handle is resolved per operation from
/// the source. Safe for concurrent use; configuration is immutable after
/// construction.
///
/// Mutating operations fire lifecycle events in a fixed order and drain any
/// domain events staged on the entity; see the individual operations.
pub struct EntityRepository<E, S> {
    source: S,
    events: Arc<dyn EventDispatcher>,
    tenant: Arc<dyn CurrentTenant>,
    filters: Arc<dyn FilterState>,
    cancellation: Arc<dyn CancellationScope>,
    identity_filter: Option<IdentityFilterFn<E>>,
}

impl<E, S> EntityRepository<E, S>
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
        Self {
            source,
            events,
            tenant,
            filters,
            cancellation: Arc::new(NoCancellationScope),
            identity_filter: None,
        }
    }

    /// Attach an ambient unit-of-work cancellation scope.
    pub fn with_cancellation_scope(mut self, scope: Arc<dyn CancellationScope>) -> Self {
        self.cancellation = scope;
        self
    }

    /// Install the identity-filter hook: how to target exactly the document
    /// backing one entity instance.
    ///
    /// This is the extension point deriving repositories supply. Without it,
    /// `update` and `delete` fail with [`RepoError::NotImplemented`]: the
    /// entity-only repository cannot know the identity shape.
    pub fn with_identity_filter(
        mut self,
        hook: impl Fn(&E) -> Filter<E> + Send + Sync + 'static,
    ) -> Self {
        self.identity_filter = Some(Arc::new(hook));
        self
    }

    /// Insert one entity and return it.
    ///
    /// Side effects, in this exact order: register `entity.created` for
    /// post-completion delivery, dispatch `entity.creating`, drain and
    /// dispatch the entity's staged domain events, then issue the insert.
    /// The completion event is registered before the `entity.creating`
    /// dispatch so that side effects raised synchronously inside a pre-write
    /// handler sequence after it.
    ///
    /// `_auto_save` is accepted for interface uniformity; unit-of-work
    /// batching lives outside this layer.
    pub fn insert(&self, mut entity: E, _auto_save: bool) -> RepoResult<E> {
        self.raise_lifecycle(&entity, LifecycleStage::Created, LifecycleStage::Creating);
        self.dispatch_staged(&mut entity);
        Collection::insert_one(&self.collection(), &entity)?;
        Ok(entity)
    }

    pub async fn insert_async(
        &self,
        mut entity: E,
        _auto_save: bool,
        cancel: CancellationToken,
    ) -> RepoResult<E> {
        self.raise_lifecycle(&entity, LifecycleStage::Created, LifecycleStage::Creating);
        self.dispatch_staged(&mut entity);
        let collection = self.collection();
        self.guard(
            &cancel,
            AsyncCollection::insert_one(&collection, &entity, &cancel),
        )
        .await?;
        Ok(entity)
    }

    /// Update one entity, targeted by its identity filter, and return it.
    ///
    /// Fails with [`RepoError::NotImplemented`] before any event or store
    /// call when no identity-filter hook is installed. Otherwise fires
    /// `entity.updated` / `entity.updating` in the same order as
    /// [`insert`](Self::insert), drains staged domain events, then issues a
    /// replace-one.
    pub fn update(&self, mut entity: E, _auto_save: bool) -> RepoResult<E> {
        let filter = self.identity_filter(&entity)?;
        self.raise_lifecycle(&entity, LifecycleStage::Updated, LifecycleStage::Updating);
        self.dispatch_staged(&mut entity);
        Collection::replace_one(&self.collection(), &filter, &entity)?;
        Ok(entity)
    }

    pub async fn update_async(
        &self,
        mut entity: E,
        _auto_save: bool,
        cancel: CancellationToken,
    ) -> RepoResult<E> {
        let filter = self.identity_filter(&entity)?;
        self.raise_lifecycle(&entity, LifecycleStage::Updated, LifecycleStage::Updating);
        self.dispatch_staged(&mut entity);
        let collection = self.collection();
        self.guard(
            &cancel,
            AsyncCollection::replace_one(&collection, &filter, &entity, &cancel),
        )
        .await?;
        Ok(entity)
    }

    /// Delete one entity, targeted by its identity filter.
    ///
    /// Fires `entity.deleted` / `entity.deleting`; staged domain events are
    /// **not** drained (the entity is being removed).
    pub fn delete(&self, entity: &E, _auto_save: bool) -> RepoResult<()> {
        let filter = self.identity_filter(entity)?;
        self.raise_lifecycle(entity, LifecycleStage::Deleted, LifecycleStage::Deleting);
        Collection::delete_one(&self.collection(), &filter)?;
        Ok(())
    }

    pub async fn delete_async(
        &self,
        entity: &E,
        _auto_save: bool,
        cancel: CancellationToken,
    ) -> RepoResult<()> {
        let filter = self.identity_filter(entity)?;
        self.raise_lifecycle(entity, LifecycleStage::Deleted, LifecycleStage::Deleting);
        let collection = self.collection();
        self.guard(
            &cancel,
            AsyncCollection::delete_one(&collection, &filter, &cancel),
        )
        .await?;
        Ok(())
    }

    /// Bulk delete by predicate. Returns the number of documents removed.
    ///
    /// Bypasses entity lifecycle events and soft-delete semantics: a
    /// predicate cannot target specific loaded instances, so no per-entity
    /// event can fire and flagged documents are removed like any other.
    /// Known limitation of the bulk path, kept deliberately.
    pub fn delete_where(&self, filter: &Filter<E>, _auto_save: bool) -> RepoResult<u64> {
        let removed = Collection::delete_many(&self.collection(), filter)?;
        tracing::debug!(entity = E::entity_name(), removed, "bulk delete by predicate");
        Ok(removed)
    }

    pub async fn delete_where_async(
        &self,
        filter: &Filter<E>,
        _auto_save: bool,
        cancel: CancellationToken,
    ) -> RepoResult<u64> {
        let collection = self.collection();
        let removed = self
            .guard(
                &cancel,
                AsyncCollection::delete_many(&collection, filter, &cancel),
            )
            .await?;
        tracing::debug!(entity = E::entity_name(), removed, "bulk delete by predicate");
        Ok(removed)
    }

    /// Read-only view of the collection with the globally enabled filters
    /// already applied.
    pub fn query(&self) -> RepoResult<Cursor<E>> {
        Ok(Collection::find(&self.collection(), &self.global_filter())?)
    }

    pub async fn query_async(&self, cancel: CancellationToken) -> RepoResult<Cursor<E>> {
        let collection = self.collection();
        let filter = self.global_filter();
        self.guard(&cancel, AsyncCollection::find(&collection, &filter, &cancel))
            .await
    }

    /// Globally enabled filters for this entity type, composed in order:
    /// soft-delete (capability present and filter enabled), then tenant
    /// scope (capability present; no switch). Ambient state is read now,
    /// never cached.
    pub(crate) fn global_filter(&self) -> Filter<E> {
        let mut filter = Filter::unrestricted();
        if let Some(clause) = E::soft_delete() {
            if self.filters.is_filter_enabled(SOFT_DELETE_FILTER) {
                filter = filter.and(clause);
            }
        }
        if let Some(clause) = E::tenant_scope(self.tenant.current_tenant_id()) {
            filter = filter.and(clause);
        }
        filter
    }

    /// Resolve the collection handle for this operation.
    pub(crate) fn collection(&self) -> S::Collection {
        self.source.collection()
    }

    fn identity_filter(&self, entity: &E) -> RepoResult<Filter<E>> {
        match &self.identity_filter {
            Some(hook) => Ok(hook(entity)),
            None => Err(RepoError::NotImplemented {
                entity: E::entity_name(),
            }),
        }
    }

    fn raise_lifecycle(&self, entity: &E, completion: LifecycleStage, immediate: LifecycleStage) {
        let name = E::entity_name();
        // Completion first: side effects raised inside the immediate handler
        // must sequence after the already-registered completion event.
        self.events
            .register_after_completion(lifecycle_record(completion, name, entity.id()));
        self.events
            .dispatch(lifecycle_record(immediate, name, entity.id()));
    }

    fn dispatch_staged(&self, entity: &mut E) {
        for record in entity.drain_events() {
            self.events.dispatch(record);
        }
    }

    /// Race a store operation against the caller token and the ambient
    /// unit-of-work token; either firing aborts the in-flight call.
    pub(crate) async fn guard<T>(
        &self,
        cancel: &CancellationToken,
        op: impl Future<Output = Result<T, StoreError>>,
    ) -> RepoResult<T> {
        let ambient = self.cancellation.ambient_token();
        let ambient_cancelled = async move {
            match ambient {
                Some(token) => token.cancelled_owned().await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RepoError::Cancelled),
            _ = ambient_cancelled => Err(RepoError::Cancelled),
            result = op => Ok(result?),
        }
    }
}
