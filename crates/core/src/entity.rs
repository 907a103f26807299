//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// A principal stays the same entity across role switches even though every
/// switch produces a fresh value.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Returns true if both values describe the same entity.
    fn same_entity<O: Entity<Id = Self::Id>>(&self, other: &O) -> bool {
        self.id() == other.id()
    }
}
