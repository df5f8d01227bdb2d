//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// The associated `Id` is what identity filters compare on, so it must be
/// cheap to clone and usable inside `Send + Sync` predicates.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + Send + Sync + 'static;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Short type name used in lifecycle events and error messages.
    fn entity_name() -> &'static str
    where
        Self: Sized,
    {
        let full = core::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}
