//! HashedTable: the same dense storage and ownership contract as
//! [`Table`](crate::Table), with a hash index in front of it.
//!
//! Entries still live in a no-holes prefix of one `BoundedArray` and removal
//! still swap-compacts. The `hashbrown::HashTable<usize>` index maps each
//! key's hash to its position in that prefix, so lookups are O(1) average.
//!
//! Each entry stores its precomputed hash. Re-pointing the index after a
//! swap-compaction or rehashing on growth uses the stored hash; `K: Hash` is
//! only invoked on the caller's key.

use crate::bounded_array::Release;
use crate::config::{Growth, TableConfig};
use crate::error::{InsertError, TableError};
use crate::scan_lock::ScanLock;
use crate::store::{Entry, EntryStore, Releasers};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::HashTable;
use std::collections::hash_map::RandomState;

#[derive(Debug)]
struct Hashed<K, V> {
    hash: u64,
    entry: Entry<K, V>,
}

pub struct HashedTable<K, V, S = RandomState> {
    store: EntryStore<Hashed<K, V>>,
    // Positions into `store`, keyed by the entry's stored hash.
    index: HashTable<usize>,
    hasher: S,
    releasers: Releasers<K, V>,
    scan: ScanLock,
}

impl<K, V> HashedTable<K, V>
where
    K: Eq + Hash,
{
    /// A doubling table with the default hasher and no release callbacks.
    pub fn new() -> Result<Self, TableError> {
        Self::empty(None, None)
    }

    pub fn empty(
        key_release: Option<Release<K>>,
        value_release: Option<Release<V>>,
    ) -> Result<Self, TableError> {
        Self::with_config(TableConfig::default(), key_release, value_release)
    }

    pub fn with_config(
        config: TableConfig,
        key_release: Option<Release<K>>,
        value_release: Option<Release<V>>,
    ) -> Result<Self, TableError> {
        Self::with_config_and_hasher(config, Default::default(), key_release, value_release)
    }
}

impl<K, V, S> HashedTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Result<Self, TableError> {
        Self::with_config_and_hasher(TableConfig::default(), hasher, None, None)
    }

    pub fn with_config_and_hasher(
        config: TableConfig,
        hasher: S,
        key_release: Option<Release<K>>,
        value_release: Option<Release<V>>,
    ) -> Result<Self, TableError> {
        Ok(Self {
            store: EntryStore::with_config(&config)?,
            index: HashTable::new(),
            hasher,
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

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn config(&self) -> TableConfig {
        TableConfig {
            capacity: self.store.capacity(),
            growth: self.store.growth(),
            first_index: self.store.first_index(),
        }
    }

    pub fn growth(&self) -> Growth {
        self.store.growth()
    }

    fn position<Q>(&self, hash: u64, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let _g = self.scan.enter("scan");
        let store = &self.store;
        self.index
            .find(hash, |&pos| store.get(pos).entry.key.borrow() == q)
            .copied()
    }

    /// Insert `key -> value`, replacing and releasing an existing entry with
    /// an equal key. On error the table is unchanged and the pair is
    /// returned inside the error.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), InsertError<K, V>> {
        let hash = {
            let _g = self.scan.enter("insert");
            self.hasher.hash_one(&key)
        };
        let item = Hashed {
            hash,
            entry: Entry { key, value },
        };
        match self.position(hash, &item.entry.key) {
            Some(pos) => {
                let old = self.store.replace(pos, item);
                self.releasers.release(old.entry);
                Ok(())
            }
            None => {
                let pos = match self.store.push(item) {
                    Ok(pos) => pos,
                    Err((Hashed { entry, .. }, full)) => {
                        return Err(full.into_insert_error(entry.key, entry.value))
                    }
                };
                let store = &self.store;
                self.index.insert_unique(hash, pos, |&p| store.get(p).hash);
                Ok(())
            }
        }
    }

    pub fn lookup<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let pos = self.position(self.hash_query(q), q)?;
        Some(&self.store.get(pos).entry.value)
    }

    pub fn lookup_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let pos = self.position(self.hash_query(q), q)?;
        Some(&mut self.store.get_mut(pos).entry.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.position(self.hash_query(q), q).is_some()
    }

    fn hash_query<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        let _g = self.scan.enter("hash");
        self.hasher.hash_one(q)
    }

    /// Remove the entry for `q`, releasing its key and value. Returns
    /// whether an entry was found.
    pub fn remove<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.take(q) {
            Some((key, value)) => {
                self.releasers.release(Entry { key, value });
                true
            }
            None => false,
        }
    }

    /// Remove the entry for `q` and hand it to the caller.
    pub fn take<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_query(q);
        let pos = {
            let _g = self.scan.enter("remove");
            let store = &self.store;
            let found = self
                .index
                .find_entry(hash, |&pos| store.get(pos).entry.key.borrow() == q)
                .ok()?;
            found.remove().0
        };

        let (removed, moved_from) = self.store.swap_remove(pos);
        if let Some(from) = moved_from {
            // The old last entry now lives at `pos`.
            let moved_hash = self.store.get(pos).hash;
            let mut e = self
                .index
                .find_entry(moved_hash, |&p| p == from)
                .ok()
                .expect("relocated entry is indexed");
            *e.get_mut() = pos;
        }
        let Entry { key, value } = removed.entry;
        Some((key, value))
    }

    /// Release every entry, leaving an empty table with the same capacity.
    pub fn clear(&mut self) {
        self.index.clear();
        while let Some(item) = self.store.pop() {
            self.releasers.release(item.entry);
        }
    }

    pub fn destroy(self) {
        drop(self);
    }

    /// Entries in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.store.iter().map(|h| (&h.entry.key, &h.entry.value))
    }

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

    /// Dense storage and an index entry pointing at every live position.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        self.store.is_dense()
            && self.index.len() == self.store.len()
            && (0..self.store.len()).all(|pos| {
                let hash = self.store.get(pos).hash;
                self.index.find(hash, |&p| p == pos).is_some()
            })
    }
}

impl<K, V, S> Drop for HashedTable<K, V, S> {
    fn drop(&mut self) {
        while let Some(item) = self.store.pop() {
            self.releasers.release(item.entry);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashedTable<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.store.iter().map(|h| (&h.entry.key, &h.entry.value)))
            .finish()
    }
}
