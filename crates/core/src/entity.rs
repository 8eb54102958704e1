//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// This is intentionally small so workflow modules can decide how they model
/// state transitions without bringing in any infrastructure concerns.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the entity's state.
    ///
    /// Starts at 1 when the entity is created and increments by 1 per
    /// recorded transition; stores use it for optimistic concurrency.
    fn version(&self) -> u64;
}
