//! Error types for arrays and tables.

use std::collections::TryReserveError;
use std::error::Error;
use std::fmt;

/// Errors returned when creating a [`BoundedArray`](crate::BoundedArray).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayError {
    /// `low > high`, or the range is too wide to address.
    InvalidBounds { low: isize, high: isize },
    /// The slot storage could not be allocated.
    Alloc(TryReserveError),
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBounds { low, high } => {
                write!(f, "invalid array bounds: [{low}, {high}]")
            }
            Self::Alloc(e) => write!(f, "array allocation failed: {e}"),
        }
    }
}

impl Error for ArrayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alloc(e) => Some(e),
            Self::InvalidBounds { .. } => None,
        }
    }
}

/// Errors returned when creating a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableError {
    /// A table needs at least one slot, and the slot range must be addressable
    /// from the configured first index.
    InvalidCapacity { capacity: usize },
    /// The entry array could not be allocated.
    Alloc(TryReserveError),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCapacity { capacity } => {
                write!(f, "invalid table capacity: {capacity}")
            }
            Self::Alloc(e) => write!(f, "table allocation failed: {e}"),
        }
    }
}

impl Error for TableError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alloc(e) => Some(e),
            Self::InvalidCapacity { .. } => None,
        }
    }
}

/// A rejected insert. The key and value are handed back untouched; the
/// table is unchanged.
#[derive(Debug)]
pub enum InsertError<K, V> {
    /// Fixed-capacity table is full (or doubling would overflow the index range).
    CapacityExceeded { key: K, value: V, capacity: usize },
    /// Growing the entry array failed.
    Alloc {
        key: K,
        value: V,
        source: TryReserveError,
    },
}

impl<K, V> InsertError<K, V> {
    /// Take back ownership of the rejected pair.
    pub fn into_inner(self) -> (K, V) {
        match self {
            Self::CapacityExceeded { key, value, .. } | Self::Alloc { key, value, .. } => {
                (key, value)
            }
        }
    }
}

impl<K, V> fmt::Display for InsertError<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { capacity, .. } => {
                write!(f, "table capacity exhausted: {capacity} entries")
            }
            Self::Alloc { source, .. } => {
                write!(f, "allocation failed while growing table: {source}")
            }
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> Error for InsertError<K, V> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alloc { source, .. } => Some(source),
            Self::CapacityExceeded { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_inner_returns_rejected_pair() {
        let e: InsertError<&str, i32> = InsertError::CapacityExceeded {
            key: "k",
            value: 7,
            capacity: 4,
        };
        assert_eq!(e.to_string(), "table capacity exhausted: 4 entries");
        assert_eq!(e.into_inner(), ("k", 7));
    }

    #[test]
    fn alloc_errors_expose_source() {
        let source = Vec::<u64>::new().try_reserve_exact(usize::MAX).unwrap_err();
        let e = TableError::Alloc(source);
        assert!(e.source().is_some());
        assert!(TableError::InvalidCapacity { capacity: 0 }.source().is_none());
    }
}
