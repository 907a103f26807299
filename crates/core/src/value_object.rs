//! Value object trait: equality by value, not identity.
//!
//! Permission sets, role sets and resource grants are value objects: two of
//! them holding the same members are interchangeable.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new value. Authorization snapshots rely on this: a value handed to a
/// concurrent reader never changes underneath it.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Grants { properties: Vec<String> }
///
/// impl ValueObject for Grants {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
