//! `keel-store` — the repository layer over a document store.
//!
//! Collection contracts (sync + cancellation-aware async) with an in-memory
//! reference driver, ambient context providers (tenant, filter switches,
//! cancellation scope), and the generic repositories that wrap policy
//! around thin store I/O: lifecycle/domain event ordering, soft-delete
//! visibility, tenant isolation.

pub mod collection;
pub mod context;
pub mod repository;


pub use collection::{
    AsyncCollection, Collection, CollectionSource, Cursor, InMemoryCollection, InMemorySource,
    StoreError,
};
pub use context::{
    AmbientContext, CancellationScope, CurrentTenant, FilterState, NoCancellationScope,
};
pub use repository::{EntityRepository, KeyedEntityRepository, RepoError, RepoResult};
