//! Common ID Types
//!
//! Numeric, type-safe identifiers. Values are assigned by the store
//! (`BIGSERIAL` in PostgreSQL, a counter in the in-process stores).

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type ServiceId = Id<markers::Service>;
/// let id = ServiceId::from_i64(7);
/// assert_eq!(id.value(), 7);
/// ```
pub struct Id<T> {
    value: i64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Wrap a raw store-assigned value
    #[inline]
    pub const fn from_i64(value: i64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// Get the underlying value
    #[inline]
    pub const fn value(&self) -> i64 {
        self.value
    }
}

// Manual impls: derives would put bounds on the marker type.

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<i64> for Id<T> {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl<T> From<Id<T>> for i64 {
    fn from(id: Id<T>) -> Self {
        id.value
    }
}

impl<T> FromStr for Id<T> {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self::from_i64)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::from_i64)
    }
}

/// Marker types for different entity IDs
pub mod markers {
    /// Marker for Identity (user account) IDs
    pub struct Identity;

    /// Marker for Role IDs
    pub struct Role;

    /// Marker for ServiceOffering IDs
    pub struct Service;

    /// Marker for Order IDs
    pub struct Order;
}

/// Type aliases for common IDs
pub type IdentityId = Id<markers::Identity>;
pub type RoleId = Id<markers::Role>;
pub type ServiceId = Id<markers::Service>;
pub type OrderId = Id<markers::Order>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_id_value_roundtrip() {
        let id = OrderId::from_i64(42);
        assert_eq!(id.value(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_id_ordering_in_sets() {
        let ids: BTreeSet<ServiceId> = [3, 1, 2, 1].into_iter().map(ServiceId::from_i64).collect();
        let values: Vec<i64> = ids.iter().map(|id| id.value()).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_id_serializes_as_number() {
        let id = IdentityId::from_i64(9);
        assert_eq!(serde_json::to_string(&id).unwrap(), "9");
        let parsed: IdentityId = serde_json::from_str("9").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_id_from_str() {
        assert_eq!("15".parse::<RoleId>().unwrap(), RoleId::from_i64(15));
        assert!("abc".parse::<RoleId>().is_err());
    }
}
