//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two `Money`
/// amounts of 12.50 are the same amount no matter where they came from.
///
/// ```ignore
/// let a = Money::from_minor(1250);
/// let b = Money::from_minor(1250);
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
