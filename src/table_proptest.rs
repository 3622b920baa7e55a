#![cfg(test)]

// Property tests for Table and HashedTable kept inside the crate so they can
// check storage density and index consistency directly.

use crate::{Compare, HashedTable, InsertError, Table, TableConfig};
use core::hash::BuildHasher;
use proptest::prelude::*;
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Take(usize),
    Lookup(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::Take),
            2 => idx.clone().prop_map(OpI::Lookup),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// Release tallies shared with the callbacks of the table under test.
#[derive(Clone, Default)]
struct Released {
    keys: Rc<Cell<usize>>,
    values: Rc<Cell<usize>>,
}

impl Released {
    fn key_fn(&self) -> impl FnMut(Key) + 'static {
        let c = self.keys.clone();
        move |_| c.set(c.get() + 1)
    }
    fn value_fn(&self) -> impl FnMut(i32) + 'static {
        let c = self.values.clone();
        move |_| c.set(c.get() + 1)
    }
}

/// The operations both table flavours share, so one state machine drives both.
trait Sut {
    fn insert(&mut self, k: Key, v: i32) -> Result<(), InsertError<Key, i32>>;
    fn lookup(&self, k: &Key) -> Option<i32>;
    fn contains(&self, s: &str) -> bool;
    fn lookup_mut(&mut self, k: &Key) -> Option<&mut i32>;
    fn remove(&mut self, k: &Key) -> bool;
    fn take(&mut self, k: &Key) -> Option<(Key, i32)>;
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn keys(&self) -> Vec<Key>;
    fn consistent(&self) -> bool;
}

impl<C: Compare<Key>> Sut for Table<Key, i32, C> {
    fn insert(&mut self, k: Key, v: i32) -> Result<(), InsertError<Key, i32>> {
        Table::insert(self, k, v)
    }
    fn lookup(&self, k: &Key) -> Option<i32> {
        Table::lookup(self, k).copied()
    }
    fn contains(&self, s: &str) -> bool {
        Table::contains_key(self, &Key(s.to_string()))
    }
    fn lookup_mut(&mut self, k: &Key) -> Option<&mut i32> {
        Table::lookup_mut(self, k)
    }
    fn remove(&mut self, k: &Key) -> bool {
        Table::remove(self, k)
    }
    fn take(&mut self, k: &Key) -> Option<(Key, i32)> {
        Table::take(self, k)
    }
    fn clear(&mut self) {
        Table::clear(self)
    }
    fn len(&self) -> usize {
        Table::len(self)
    }
    fn keys(&self) -> Vec<Key> {
        self.iter().map(|(k, _)| k.clone()).collect()
    }
    fn consistent(&self) -> bool {
        self.is_dense()
    }
}

impl<S: BuildHasher> Sut for HashedTable<Key, i32, S> {
    fn insert(&mut self, k: Key, v: i32) -> Result<(), InsertError<Key, i32>> {
        HashedTable::insert(self, k, v)
    }
    fn lookup(&self, k: &Key) -> Option<i32> {
        HashedTable::lookup(self, k).copied()
    }
    fn contains(&self, s: &str) -> bool {
        HashedTable::contains_key(self, s)
    }
    fn lookup_mut(&mut self, k: &Key) -> Option<&mut i32> {
        HashedTable::lookup_mut(self, k)
    }
    fn remove(&mut self, k: &Key) -> bool {
        HashedTable::remove(self, k)
    }
    fn take(&mut self, k: &Key) -> Option<(Key, i32)> {
        HashedTable::take(self, k)
    }
    fn clear(&mut self) {
        HashedTable::clear(self)
    }
    fn len(&self) -> usize {
        HashedTable::len(self)
    }
    fn keys(&self) -> Vec<Key> {
        self.iter().map(|(k, _)| k.clone()).collect()
    }
    fn consistent(&self) -> bool {
        self.is_consistent()
    }
}

// State-machine equivalence against std::collections::HashMap. After every
// op:
// - `len`/lookups match the model (last write wins, removal is exact).
// - Storage is dense and keys are unique.
// - Release accounting: every pair the table accepted is either live,
//   released once, or handed back by `take`.
// - A fixed table at capacity rejects new keys and returns the pair.
fn run_state_machine<T: Sut>(
    mut sut: T,
    released: &Released,
    fixed_capacity: Option<usize>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();
    let mut expect_released = 0usize;

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let present = model.contains_key(&k);
                let full = fixed_capacity.is_some_and(|cap| model.len() == cap);
                match sut.insert(k.clone(), v) {
                    Ok(()) => {
                        prop_assert!(present || !full, "insert into a full fixed table");
                        if present {
                            expect_released += 1;
                        }
                        model.insert(k, v);
                    }
                    Err(e @ InsertError::CapacityExceeded { .. }) => {
                        prop_assert!(!present && full, "rejected an insert that fits");
                        prop_assert_eq!(e.into_inner(), (k, v));
                    }
                    Err(InsertError::Alloc { .. }) => {
                        prop_assert!(false, "unexpected allocation failure");
                    }
                }
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                let removed = sut.remove(&k);
                prop_assert_eq!(removed, model.remove(&k).is_some());
                if removed {
                    expect_released += 1;
                }
            }
            OpI::Take(i) => {
                let k = key_from(pool, i);
                let taken = sut.take(&k);
                prop_assert_eq!(taken, model.remove_entry(&k));
            }
            OpI::Lookup(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.lookup(&k), model.get(&k).copied());
            }
            OpI::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains(&s), has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                match (sut.lookup_mut(&k), model.get_mut(&k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.saturating_add(d);
                        *mv = mv.saturating_add(d);
                    }
                    (None, None) => {}
                    (s, m) => prop_assert!(false, "presence mismatch: {:?} vs {:?}", s, m),
                }
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<_> = sut.keys().into_iter().collect();
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
            OpI::Clear => {
                expect_released += model.len();
                model.clear();
                sut.clear();
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert!(sut.consistent(), "storage lost density or index drifted");
        let keys = sut.keys();
        let unique: BTreeSet<_> = keys.iter().collect();
        prop_assert_eq!(unique.len(), keys.len(), "duplicate keys stored");
        prop_assert_eq!(released.keys.get(), expect_released);
        prop_assert_eq!(released.values.get(), expect_released);
    }

    // Dropping releases whatever is still live, once each.
    drop(sut);
    prop_assert_eq!(released.keys.get(), expect_released + model.len());
    prop_assert_eq!(released.values.get(), expect_released + model.len());
    Ok(())
}

#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_table_doubling((pool, ops) in arb_scenario()) {
        let released = Released::default();
        let sut = Table::builder()
            .config(TableConfig::growable(1))
            .key_release(released.key_fn())
            .value_release(released.value_fn())
            .build()
            .unwrap();
        run_state_machine(sut, &released, None, &pool, ops)?;
    }

    #[test]
    fn prop_table_fixed((pool, ops) in arb_scenario(), cap in 1usize..=4) {
        let released = Released::default();
        let sut = Table::builder()
            .config(TableConfig::fixed(cap).with_first_index(-3))
            .key_release(released.key_fn())
            .value_release(released.value_fn())
            .build()
            .unwrap();
        run_state_machine(sut, &released, Some(cap), &pool, ops)?;
    }

    #[test]
    fn prop_table_custom_comparator((pool, ops) in arb_scenario()) {
        let released = Released::default();
        let sut = Table::builder()
            .compare_by(|a: &Key, b: &Key| b.0.cmp(&a.0))
            .key_release(released.key_fn())
            .value_release(released.value_fn())
            .build()
            .unwrap();
        run_state_machine(sut, &released, None, &pool, ops)?;
    }

    #[test]
    fn prop_hashed_table((pool, ops) in arb_scenario()) {
        let released = Released::default();
        let sut: HashedTable<Key, i32> = HashedTable::with_config(
            TableConfig::growable(1),
            Some(Box::new(released.key_fn())),
            Some(Box::new(released.value_fn())),
        )
        .unwrap();
        run_state_machine(sut, &released, None, &pool, ops)?;
    }

    // Same state machine under worst-case collisions, at fixed capacity.
    #[test]
    fn prop_hashed_table_with_collisions((pool, ops) in arb_scenario(), cap in 1usize..=4) {
        let released = Released::default();
        let sut: HashedTable<Key, i32, ConstBuildHasher> = HashedTable::with_config_and_hasher(
            TableConfig::fixed(cap),
            ConstBuildHasher,
            Some(Box::new(released.key_fn())),
            Some(Box::new(released.value_fn())),
        )
        .unwrap();
        run_state_machine(sut, &released, Some(cap), &pool, ops)?;
    }
}
