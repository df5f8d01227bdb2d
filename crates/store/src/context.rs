//! Ambient request-scoped state the repository reads per operation.
//!
//! The providers are read-only from the repository's perspective; the
//! surrounding request infrastructure may mutate them between operations, so
//! nothing here is ever cached by a caller.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use tokio_util::sync::CancellationToken;

use keel_core::TenantId;

/// Ambient current-tenant provider.
pub trait CurrentTenant: Send + Sync {
    /// Tenant of the current request; `None` when running as the host.
    fn current_tenant_id(&self) -> Option<TenantId>;
}

/// Ambient switch for named global read filters.
pub trait FilterState: Send + Sync {
    fn is_filter_enabled(&self, name: &str) -> bool;
}

/// Ambient unit-of-work cancellation scope.
pub trait CancellationScope: Send + Sync {
    /// Token merged with caller-supplied tokens; `None` when no scope is
    /// active.
    fn ambient_token(&self) -> Option<CancellationToken>;
}

impl<P> CurrentTenant for Arc<P>
where
    P: CurrentTenant + ?Sized,
{
    fn current_tenant_id(&self) -> Option<TenantId> {
        (**self).current_tenant_id()
    }
}

impl<P> FilterState for Arc<P>
where
    P: FilterState + ?Sized,
{
    fn is_filter_enabled(&self, name: &str) -> bool {
        (**self).is_filter_enabled(name)
    }
}

impl<P> CancellationScope for Arc<P>
where
    P: CancellationScope + ?Sized,
{
    fn ambient_token(&self) -> Option<CancellationToken> {
        (**self).ambient_token()
    }
}

/// Null scope: no ambient cancellation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCancellationScope;

impl CancellationScope for NoCancellationScope {
    fn ambient_token(&self) -> Option<CancellationToken> {
        None
    }
}

/// In-memory ambient state for tests/dev.
///
/// Filters are enabled unless explicitly disabled. Interior mutability lets
/// request infrastructure swap the tenant, toggle filters, or install a
/// cancellation token between operations on a shared instance.
#[derive(Debug, Default)]
pub struct AmbientContext {
    tenant: RwLock<Option<TenantId>>,
    disabled_filters: RwLock<HashSet<String>>,
    cancellation: RwLock<Option<CancellationToken>>,
}

impl AmbientContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tenant(&self, tenant: Option<TenantId>) {
        if let Ok(mut current) = self.tenant.write() {
            *current = tenant;
        }
    }

    pub fn disable_filter(&self, name: &str) {
        if let Ok(mut disabled) = self.disabled_filters.write() {
            disabled.insert(name.to_string());
        }
    }

    pub fn enable_filter(&self, name: &str) {
        if let Ok(mut disabled) = self.disabled_filters.write() {
            disabled.remove(name);
        }
    }

    /// Install (or clear) the unit-of-work cancellation token.
    pub fn set_cancellation(&self, token: Option<CancellationToken>) {
        if let Ok(mut current) = self.cancellation.write() {
            *current = token;
        }
    }
}

impl CurrentTenant for AmbientContext {
    fn current_tenant_id(&self) -> Option<TenantId> {
        self.tenant.read().ok().and_then(|tenant| *tenant)
    }
}

impl FilterState for AmbientContext {
    fn is_filter_enabled(&self, name: &str) -> bool {
        self.disabled_filters
            .read()
            .map(|disabled| !disabled.contains(name))
            .unwrap_or(true)
    }
}

impl CancellationScope for AmbientContext {
    fn ambient_token(&self) -> Option<CancellationToken> {
        self.cancellation.read().ok().and_then(|token| token.clone())
    }
}
