//! Table: associative storage over one `BoundedArray`, found by linear scan.
//!
//! Entries occupy positions `[0, len)` of an [`EntryStore`] with no holes.
//! Keys are unique under the table's [`Compare`]: a second insert of an
//! equal key replaces the entry in place (last write wins) and releases the
//! superseded key and value. Removal moves the last entry into the vacated
//! position, so storage order after a removal is not insertion order.
//!
//! Every operation is O(n) in the number of entries.

use crate::bounded_array::Release;
use crate::config::{Growth, TableConfig};
use crate::error::{InsertError, TableError};
use crate::scan_lock::ScanLock;
use crate::store::{Entry, EntryStore, Releasers};
use core::cmp::Ordering;
use core::fmt;

/// Three-way key comparison. Only `Ordering::Equal` is significant to a
/// table; a total order is not required.
pub trait Compare<K: ?Sized> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Compare keys with their `Ord` implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct OrdCompare;

impl<K: Ord + ?Sized> Compare<K> for OrdCompare {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: ?Sized, F> Compare<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

pub struct Table<K, V, C = OrdCompare> {
    store: EntryStore<Entry<K, V>>,
    compare: C,
    releasers: Releasers<K, V>,
    scan: ScanLock,
}

impl<K: Ord, V> Table<K, V> {
    /// A doubling table using `K: Ord`, with no release callbacks.
    pub fn new() -> Result<Self, TableError> {
        Self::builder().build()
    }

    pub fn builder() -> TableBuilder<K, V> {
        TableBuilder::new(OrdCompare)
    }
}

impl<K, V, C> Table<K, V, C>
where
    C: Compare<K>,
{
    /// Create an empty table with the default configuration.
    ///
    /// `key_release`/`value_release` receive keys and values the table lets
    /// go of (overwrite, removal, destruction). `None` means the table just
    /// drops them.
    pub fn empty(
        compare: C,
        key_release: Option<Release<K>>,
        value_release: Option<Release<V>>,
    ) -> Result<Self, TableError> {
        Self::with_config(TableConfig::default(), compare, key_release, value_release)
    }

    pub fn with_config(
        config: TableConfig,
        compare: C,
        key_release: Option<Release<K>>,
        value_release: Option<Release<V>>,
    ) -> Result<Self, TableError> {
        Ok(Self {
            store: EntryStore::with_config(&config)?,
            compare,
            releasers: Releasers {
                key: key_release,
                value: value_release,
            },
            scan: ScanLock::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// Current number of slots. Grows only under [`Growth::Doubling`].
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// The configuration reflecting the table's current capacity.
    pub fn config(&self) -> TableConfig {
        TableConfig {
            capacity: self.store.capacity(),
            growth: self.store.growth(),
            first_index: self.store.first_index(),
        }
    }

    /// Position of the first entry whose key compares equal to `key`.
    fn position(&self, key: &K) -> Option<usize> {
        let _g = self.scan.enter("scan");
        self.store
            .iter()
            .position(|e| self.compare.compare(&e.key, key) == Ordering::Equal)
    }

    /// Insert `key -> value`. If an equal key is present its entry is
    /// replaced in place and the old key and value are released; otherwise
    /// the pair is appended.
    ///
    /// On error the table is unchanged and the pair is returned inside the
    /// error.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), InsertError<K, V>> {
        match self.position(&key) {
            Some(pos) => {
                let old = self.store.replace(pos, Entry { key, value });
                self.releasers.release(old);
                Ok(())
            }
            None => match self.store.push(Entry { key, value }) {
                Ok(_) => Ok(()),
                Err((Entry { key, value }, full)) => Err(full.into_insert_error(key, value)),
            },
        }
    }

    pub fn lookup(&self, key: &K) -> Option<&V> {
        let pos = self.position(key)?;
        Some(&self.store.get(pos).value)
    }

    pub fn lookup_mut(&mut self, key: &K) -> Option<&mut V> {
        let pos = self.position(key)?;
        Some(&mut self.store.get_mut(pos).value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// Remove the entry for `key`, releasing its key and value. Returns
    /// whether an entry was found; a missing key is a no-op.
    ///
    /// The last entry moves into the vacated position.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.take(key) {
            Some((key, value)) => {
                self.releasers.release(Entry { key, value });
                true
            }
            None => false,
        }
    }

    /// Remove the entry for `key` and hand it to the caller instead of the
    /// release callbacks. Compacts exactly like [`remove`](Self::remove).
    pub fn take(&mut self, key: &K) -> Option<(K, V)> {
        let pos = self.position(key)?;
        let (Entry { key, value }, _moved_from) = self.store.swap_remove(pos);
        Some((key, value))
    }

    /// Release every entry, leaving an empty table with the same capacity.
    pub fn clear(&mut self) {
        while let Some(entry) = self.store.pop() {
            self.releasers.release(entry);
        }
    }

    /// Release every entry and free the table.
    pub fn destroy(self) {
        drop(self);
    }

    /// Entries in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.store.iter().map(|e| (&e.key, &e.value))
    }

    /// Call `f` on each pair in storage order.
    pub fn print_with<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }

    pub fn print(&self)
    where
        K: fmt::Debug,
        V: fmt::Debug,
    {
        self.print_with(|k, v| println!("[{k:?}, {v:?}]"));
    }

    #[cfg(test)]
    pub(crate) fn is_dense(&self) -> bool {
        self.store.is_dense()
    }
}

impl<K, V, C> Drop for Table<K, V, C> {
    fn drop(&mut self) {
        while let Some(entry) = self.store.pop() {
            self.releasers.release(entry);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Table<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.store.iter().map(|e| (&e.key, &e.value)))
            .finish()
    }
}

/// Fluent construction of a [`Table`].
pub struct TableBuilder<K, V, C = OrdCompare> {
    config: TableConfig,
    compare: C,
    key_release: Option<Release<K>>,
    value_release: Option<Release<V>>,
}

impl<K, V, C> TableBuilder<K, V, C> {
    pub fn new(compare: C) -> Self {
        Self {
            config: TableConfig::default(),
            compare,
            key_release: None,
            value_release: None,
        }
    }

    /// Replace the comparator, keeping everything else.
    pub fn compare_by<C2>(self, compare: C2) -> TableBuilder<K, V, C2> {
        TableBuilder {
            config: self.config,
            compare,
            key_release: self.key_release,
            value_release: self.value_release,
        }
    }

    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    pub fn growth(mut self, growth: Growth) -> Self {
        self.config.growth = growth;
        self
    }

    pub fn first_index(mut self, first_index: isize) -> Self {
        self.config.first_index = first_index;
        self
    }

    pub fn key_release<F>(mut self, release: F) -> Self
    where
        F: FnMut(K) + 'static,
    {
        self.key_release = Some(Box::new(release));
        self
    }

    pub fn value_release<F>(mut self, release: F) -> Self
    where
        F: FnMut(V) + 'static,
    {
        self.value_release = Some(Box::new(release));
        self
    }

    pub fn build(self) -> Result<Table<K, V, C>, TableError>
    where
        C: Compare<K>,
    {
        Table::with_config(
            self.config,
            self.compare,
            self.key_release,
            self.value_release,
        )
    }
}
