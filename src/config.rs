//! Table configuration.

/// What a table does when a new key arrives and every slot is occupied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Growth {
    /// Capacity is fixed at creation; the insert is rejected.
    Fixed,
    /// Allocate an array of twice the capacity and move live entries over.
    #[default]
    Doubling,
}

/// Sizing parameters for a table's entry array.
///
/// Validated when the table is created; immutable afterwards except that a
/// doubling table's capacity grows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableConfig {
    /// Number of entry slots allocated up front. Must be at least 1.
    pub capacity: usize,
    /// Full-table policy.
    pub growth: Growth,
    /// Index of the first slot of the underlying array (its `low` bound).
    /// The occupied prefix is `[first_index, first_index + len)`.
    pub first_index: isize,
}

impl TableConfig {
    pub const DEFAULT_CAPACITY: usize = 16;
    pub const DEFAULT_FIRST_INDEX: isize = 0;

    /// A table that never grows past `capacity` entries.
    pub fn fixed(capacity: usize) -> Self {
        Self {
            capacity,
            growth: Growth::Fixed,
            first_index: Self::DEFAULT_FIRST_INDEX,
        }
    }

    /// A table starting at `capacity` slots and doubling when full.
    pub fn growable(capacity: usize) -> Self {
        Self {
            capacity,
            growth: Growth::Doubling,
            first_index: Self::DEFAULT_FIRST_INDEX,
        }
    }

    /// Set the index of the first slot.
    pub fn with_first_index(mut self, first_index: isize) -> Self {
        self.first_index = first_index;
        self
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::growable(Self::DEFAULT_CAPACITY)
    }
}
