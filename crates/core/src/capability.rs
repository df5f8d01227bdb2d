//! Orthogonal storage capabilities an entity type may opt into.
//!
//! Capability presence is a property of the entity **type**, checked through
//! trait bounds; nothing here inspects instances at runtime to decide policy.

use crate::id::TenantId;

/// Soft-deletable: the document carries a deletion flag instead of being
/// removed from the store. Visibility of flagged documents is controlled by
/// a toggleable read filter, not by this trait.
pub trait SoftDeletable {
    /// Whether the deletion flag is set.
    fn is_deleted(&self) -> bool;

    /// Set or clear the deletion flag.
    fn set_deleted(&mut self, deleted: bool);
}

/// Multi-tenant: the document is owned by a tenant.
///
/// `None` means the document belongs to the host (no owning tenant).
pub trait MultiTenant {
    /// Owning tenant of this document.
    fn tenant_id(&self) -> Option<TenantId>;
}
