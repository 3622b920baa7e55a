//! EntryStore: the densely packed prefix of a `BoundedArray` that both table
//! flavours keep their entries in.
//!
//! Positions are 0-based offsets into the occupied prefix; slot indices are
//! `low + position`. Invariant: slots for positions `< len` are occupied and
//! every other slot is empty. All relocation goes through
//! `BoundedArray::{take, replace}`, so nothing is released here; releasing is
//! the owning table's job.
//!
//! The underlying array is created without a release callback. Entries are
//! released by the tables (on overwrite, removal, `clear` and drop), which
//! hold separate key and value callbacks and must release only after the
//! store is consistent again.

use crate::bounded_array::{BoundedArray, Release};
use crate::config::{Growth, TableConfig};
use crate::error::{ArrayError, InsertError, TableError};
use std::collections::TryReserveError;

/// A live key/value pair.
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

/// The table-level release callbacks. An absent callback means the item is
/// simply dropped.
pub(crate) struct Releasers<K, V> {
    pub(crate) key: Option<Release<K>>,
    pub(crate) value: Option<Release<V>>,
}

impl<K, V> Releasers<K, V> {
    pub(crate) fn release(&mut self, entry: Entry<K, V>) {
        let Entry { key, value } = entry;
        if let Some(f) = self.key.as_mut() {
            f(key);
        }
        if let Some(f) = self.value.as_mut() {
            f(value);
        }
    }
}

/// Why a push could not find a slot.
pub(crate) enum Full {
    Capacity(usize),
    Alloc(TryReserveError),
}

impl Full {
    pub(crate) fn into_insert_error<K, V>(self, key: K, value: V) -> InsertError<K, V> {
        match self {
            Full::Capacity(capacity) => InsertError::CapacityExceeded {
                key,
                value,
                capacity,
            },
            Full::Alloc(source) => InsertError::Alloc { key, value, source },
        }
    }
}

pub(crate) struct EntryStore<T> {
    slots: BoundedArray<T>,
    len: usize,
    growth: Growth,
}

impl<T> EntryStore<T> {
    pub(crate) fn with_config(config: &TableConfig) -> Result<Self, TableError> {
        let slots = BoundedArray::starting_at(config.first_index, config.capacity).map_err(
            |e| match e {
                ArrayError::Alloc(err) => TableError::Alloc(err),
                ArrayError::InvalidBounds { .. } => TableError::InvalidCapacity {
                    capacity: config.capacity,
                },
            },
        )?;
        Ok(Self {
            slots,
            len: 0,
            growth: config.growth,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) fn first_index(&self) -> isize {
        self.slots.low()
    }

    pub(crate) fn growth(&self) -> Growth {
        self.growth
    }

    #[inline]
    fn slot(&self, pos: usize) -> isize {
        self.slots.low() + pos as isize
    }

    pub(crate) fn get(&self, pos: usize) -> &T {
        debug_assert!(pos < self.len);
        let i = self.slot(pos);
        self.slots.get(i).expect("occupied prefix has no holes")
    }

    pub(crate) fn get_mut(&mut self, pos: usize) -> &mut T {
        debug_assert!(pos < self.len);
        let i = self.slot(pos);
        self.slots.get_mut(i).expect("occupied prefix has no holes")
    }

    /// Occupied entries in storage order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).map(move |pos| self.get(pos))
    }

    /// Append at position `len`, growing first if the policy allows.
    /// On failure the item comes back with the reason.
    pub(crate) fn push(&mut self, item: T) -> Result<usize, (T, Full)> {
        if self.len == self.slots.capacity() {
            if let Err(full) = self.grow() {
                return Err((item, full));
            }
        }
        let pos = self.len;
        let i = self.slot(pos);
        let prev = self.slots.replace(i, item);
        debug_assert!(prev.is_none(), "slot past the occupied prefix was not empty");
        self.len += 1;
        Ok(pos)
    }

    /// Swap `item` into an occupied position and return the previous entry.
    pub(crate) fn replace(&mut self, pos: usize, item: T) -> T {
        debug_assert!(pos < self.len);
        let i = self.slot(pos);
        self.slots
            .replace(i, item)
            .expect("occupied prefix has no holes")
    }

    /// Remove the entry at `pos` and fill the hole with the last entry.
    ///
    /// Returns the removed entry and, if an entry was relocated, the position
    /// it came from (always the old last position).
    pub(crate) fn swap_remove(&mut self, pos: usize) -> (T, Option<usize>) {
        debug_assert!(pos < self.len);
        let last = self.len - 1;
        let (hole, tail) = (self.slot(pos), self.slot(last));
        let removed = self.slots.take(hole).expect("occupied prefix has no holes");
        let moved_from = if pos != last {
            let moved = self.slots.take(tail).expect("occupied prefix has no holes");
            let prev = self.slots.replace(hole, moved);
            debug_assert!(prev.is_none());
            Some(last)
        } else {
            None
        };
        self.len = last;
        (removed, moved_from)
    }

    /// Remove the last entry.
    pub(crate) fn pop(&mut self) -> Option<T> {
        let last = self.len.checked_sub(1)?;
        let i = self.slot(last);
        let item = self.slots.take(i);
        debug_assert!(item.is_some());
        self.len = last;
        item
    }

    fn grow(&mut self) -> Result<(), Full> {
        let capacity = self.slots.capacity();
        if self.growth == Growth::Fixed {
            return Err(Full::Capacity(capacity));
        }
        let doubled = capacity.checked_mul(2).ok_or(Full::Capacity(capacity))?;
        let mut next = BoundedArray::starting_at(self.slots.low(), doubled).map_err(|e| match e {
            ArrayError::Alloc(err) => Full::Alloc(err),
            ArrayError::InvalidBounds { .. } => Full::Capacity(capacity),
        })?;
        for pos in 0..self.len {
            let i = self.slot(pos);
            if let Some(item) = self.slots.take(i) {
                next.replace(i, item);
            }
        }
        self.slots = next;
        Ok(())
    }

    /// Every slot below `len` is occupied and every slot at or above it is empty.
    #[cfg(test)]
    pub(crate) fn is_dense(&self) -> bool {
        self.slots.iter().enumerate().all(|(pos, (_, item))| item.is_some() == (pos < self.len))
    }
}
