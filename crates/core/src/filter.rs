//! Composable, immutable predicates over entities.
//!
//! A [`Filter`] is a pure function of its construction inputs: built fresh
//! per operation, composed with logical AND, never mutated after it is
//! returned. Clauses keep a short label so generated filters stay
//! debuggable.

use std::fmt;
use std::sync::Arc;

use crate::capability::{MultiTenant, SoftDeletable};
use crate::entity::Entity;
use crate::id::TenantId;

/// Name under which the soft-delete read filter is toggled in the ambient
/// filter switch.
pub const SOFT_DELETE_FILTER: &str = "soft_delete";

type Predicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

struct Clause<E> {
    label: &'static str,
    predicate: Predicate<E>,
}

impl<E> Clone for Clause<E> {
    fn clone(&self) -> Self {
        Self {
            label: self.label,
            predicate: Arc::clone(&self.predicate),
        }
    }
}

/// Immutable conjunction of named predicate clauses.
///
/// `and` consumes both sides and returns a new filter with the right-hand
/// clauses appended in order, so composition order is reproducible in the
/// generated query even though AND itself is commutative.
pub struct Filter<E> {
    clauses: Vec<Clause<E>>,
}

impl<E> Clone for Filter<E> {
    fn clone(&self) -> Self {
        Self {
            clauses: self.clauses.clone(),
        }
    }
}

impl<E> Filter<E> {
    /// A filter with no clauses; matches every entity.
    pub fn unrestricted() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }

    /// Single-clause filter from a labelled predicate.
    pub fn new(
        label: &'static str,
        predicate: impl Fn(&E) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            clauses: vec![Clause {
                label,
                predicate: Arc::new(predicate),
            }],
        }
    }

    /// Logical AND: appends `other`'s clauses after this filter's.
    pub fn and(mut self, other: Filter<E>) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    /// True when every clause matches (vacuously true when unrestricted).
    pub fn matches(&self, entity: &E) -> bool {
        self.clauses.iter().all(|clause| (clause.predicate)(entity))
    }

    pub fn is_unrestricted(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Clause labels in composition order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.clauses.iter().map(|clause| clause.label).collect()
    }
}

impl<E> fmt::Debug for Filter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Filter").field(&self.labels()).finish()
    }
}

impl<E: Entity> Filter<E> {
    /// Identity filter: matches exactly the document with `key`.
    pub fn id_equals(key: E::Id) -> Self {
        Self::new("id", move |entity: &E| entity.id() == &key)
    }
}

impl<E: SoftDeletable> Filter<E> {
    /// Hide soft-deleted documents.
    pub fn not_deleted() -> Self {
        Self::new("not-deleted", |entity: &E| !entity.is_deleted())
    }
}

impl<E: MultiTenant> Filter<E> {
    /// Scope to the given tenant; `None` scopes to host-owned documents.
    pub fn owned_by(current: Option<TenantId>) -> Self {
        Self::new("tenant", move |entity: &E| entity.tenant_id() == current)
    }
}

/// Static capability tagging for global read filters.
///
/// Every stored entity type declares which global clauses apply to it; the
/// repository composes the declared clauses without inspecting instances.
/// Types without a capability keep the `None` defaults:
///
/// ```ignore
/// impl GlobalFilters for Order {
///     fn soft_delete() -> Option<Filter<Self>> {
///         Some(Filter::not_deleted())
///     }
///
///     fn tenant_scope(current: Option<TenantId>) -> Option<Filter<Self>> {
///         Some(Filter::owned_by(current))
///     }
/// }
/// ```
pub trait GlobalFilters: Sized {
    /// Clause hiding soft-deleted documents, when the type carries the flag.
    fn soft_delete() -> Option<Filter<Self>> {
        None
    }

    /// Clause scoping reads to the ambient tenant, when the type is
    /// tenant-owned.
    fn tenant_scope(current: Option<TenantId>) -> Option<Filter<Self>> {
        let _ = current;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Doc {
        id: u32,
        deleted: bool,
        tenant: Option<TenantId>,
    }

    impl Entity for Doc {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    impl SoftDeletable for Doc {
        fn is_deleted(&self) -> bool {
            self.deleted
        }

        fn set_deleted(&mut self, deleted: bool) {
            self.deleted = deleted;
        }
    }

    impl MultiTenant for Doc {
        fn tenant_id(&self) -> Option<TenantId> {
            self.tenant
        }
    }

    fn doc(id: u32) -> Doc {
        Doc {
            id,
            deleted: false,
            tenant: None,
        }
    }

    #[test]
    fn unrestricted_matches_everything() {
        let filter = Filter::<Doc>::unrestricted();
        assert!(filter.is_unrestricted());
        assert!(filter.matches(&doc(1)));
        assert!(filter.matches(&doc(2)));
    }

    #[test]
    fn id_equals_matches_only_that_key() {
        let filter = Filter::<Doc>::id_equals(7);
        assert!(filter.matches(&doc(7)));
        assert!(!filter.matches(&doc(8)));
    }

    #[test]
    fn not_deleted_hides_flagged_documents() {
        let filter = Filter::<Doc>::not_deleted();
        let mut flagged = doc(1);
        flagged.set_deleted(true);
        assert!(filter.matches(&doc(1)));
        assert!(!filter.matches(&flagged));
    }

    #[test]
    fn owned_by_none_matches_host_documents() {
        let tenant = TenantId::new();
        let mut owned = doc(1);
        owned.tenant = Some(tenant);

        assert!(Filter::<Doc>::owned_by(None).matches(&doc(1)));
        assert!(!Filter::<Doc>::owned_by(None).matches(&owned));
        assert!(Filter::<Doc>::owned_by(Some(tenant)).matches(&owned));
        assert!(!Filter::<Doc>::owned_by(Some(TenantId::new())).matches(&owned));
    }

    #[test]
    fn and_keeps_composition_order() {
        let filter = Filter::<Doc>::id_equals(1)
            .and(Filter::not_deleted())
            .and(Filter::owned_by(None));
        assert_eq!(filter.labels(), vec!["id", "not-deleted", "tenant"]);
    }

    #[test]
    fn default_global_filters_declare_nothing() {
        struct Bare;
        impl GlobalFilters for Bare {}

        assert!(Bare::soft_delete().is_none());
        assert!(Bare::tenant_scope(None).is_none());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a composed filter matches iff every part matches.
            #[test]
            fn and_is_conjunction(id in 0u32..50, probe in 0u32..50, deleted: bool) {
                let entity = Doc { id, deleted, tenant: None };
                let by_id = Filter::<Doc>::id_equals(probe);
                let live = Filter::<Doc>::not_deleted();
                let composed = by_id.clone().and(live.clone());

                prop_assert_eq!(
                    composed.matches(&entity),
                    by_id.matches(&entity) && live.matches(&entity)
                );
            }
        }
    }
}
