// Table contract suite, run against both `Table` and `HashedTable`.
//
// Each test documents the behavior it verifies. The invariants exercised:
// - Emptiness: a new table is empty; one insert makes it non-empty.
// - Lookup: hits return the stored value; misses are `None` before and
//   after unrelated inserts.
// - Last write wins: duplicate inserts keep only the newest value and
//   release each superseded key/value once.
// - Removal: exact, order-independent, and swap-compacting; the table is
//   empty after every key has been removed.
// - Destruction: releases each live key and value exactly once.
use array_table::{HashedTable, Release, Table, TableError};
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

/// Callbacks standing in for the caller's deallocator: they record what the
/// table hands back.
struct Freed {
    keys: Log,
    values: Log,
}

impl Freed {
    fn new() -> Self {
        Self {
            keys: Rc::default(),
            values: Rc::default(),
        }
    }

    fn key_release(&self) -> Option<Release<String>> {
        let log = self.keys.clone();
        Some(Box::new(move |k| log.borrow_mut().push(k)))
    }

    fn value_release(&self) -> Option<Release<String>> {
        let log = self.values.clone();
        Some(Box::new(move |v| log.borrow_mut().push(v)))
    }

    fn keys(&self) -> Vec<String> {
        let mut v = self.keys.borrow().clone();
        v.sort();
        v
    }

    fn values(&self) -> Vec<String> {
        let mut v = self.values.borrow().clone();
        v.sort();
        v
    }
}

fn s(x: &str) -> String {
    x.to_string()
}

/// The operations the contract is written against.
trait Contract {
    fn make(
        key_release: Option<Release<String>>,
        value_release: Option<Release<String>>,
    ) -> Result<Self, TableError>
    where
        Self: Sized;
    fn put(&mut self, k: &str, v: &str);
    fn get(&self, k: &str) -> Option<String>;
    fn del(&mut self, k: &str) -> bool;
    fn empty(&self) -> bool;
    fn storage_keys(&self) -> Vec<String>;
}

impl Contract for Table<String, String> {
    fn make(
        key_release: Option<Release<String>>,
        value_release: Option<Release<String>>,
    ) -> Result<Self, TableError> {
        Table::empty(Default::default(), key_release, value_release)
    }
    fn put(&mut self, k: &str, v: &str) {
        self.insert(s(k), s(v)).unwrap();
    }
    fn get(&self, k: &str) -> Option<String> {
        self.lookup(&s(k)).cloned()
    }
    fn del(&mut self, k: &str) -> bool {
        self.remove(&s(k))
    }
    fn empty(&self) -> bool {
        self.is_empty()
    }
    fn storage_keys(&self) -> Vec<String> {
        self.iter().map(|(k, _)| k.clone()).collect()
    }
}

impl Contract for HashedTable<String, String> {
    fn make(
        key_release: Option<Release<String>>,
        value_release: Option<Release<String>>,
    ) -> Result<Self, TableError> {
        HashedTable::empty(key_release, value_release)
    }
    fn put(&mut self, k: &str, v: &str) {
        self.insert(s(k), s(v)).unwrap();
    }
    fn get(&self, k: &str) -> Option<String> {
        self.lookup(k).cloned()
    }
    fn del(&mut self, k: &str) -> bool {
        self.remove(k)
    }
    fn empty(&self) -> bool {
        self.is_empty()
    }
    fn storage_keys(&self) -> Vec<String> {
        self.iter().map(|(k, _)| k.clone()).collect()
    }
}

fn fresh<T: Contract>() -> (T, Freed) {
    let freed = Freed::new();
    let t = T::make(freed.key_release(), freed.value_release()).expect("table created");
    (t, freed)
}

// Test: a freshly created table is empty.
fn is_empty_after_create<T: Contract>() {
    let (t, _f) = fresh::<T>();
    assert!(t.empty());
}

// Test: a single insert makes the table non-empty.
fn non_empty_after_insert<T: Contract>() {
    let (mut t, _f) = fresh::<T>();
    t.put("key1", "value1");
    assert!(!t.empty());
}

// Test: single element lookup.
// Verifies: a missing key is not found; the inserted key returns its value.
fn lookup_single_element<T: Contract>() {
    let (mut t, _f) = fresh::<T>();
    t.put("key1", "value1");
    assert_eq!(t.get("key2"), None);
    assert_eq!(t.get("key1").as_deref(), Some("value1"));
}

// Test: three distinct keys are each found with their own value.
fn insert_lookup_different_keys<T: Contract>() {
    let (mut t, _f) = fresh::<T>();
    assert_eq!(t.get("key3"), None);
    for i in 1..=3 {
        t.put(&format!("key{i}"), &format!("value{i}"));
    }
    for i in 1..=3 {
        assert_eq!(t.get(&format!("key{i}")), Some(format!("value{i}")));
    }
    assert_eq!(t.get("key4"), None);
}

// Test: three inserts under one key.
// Verifies: the last value wins after each insert; the two superseded pairs
// are released, each exactly once.
fn insert_lookup_same_keys<T: Contract>() {
    let (mut t, f) = fresh::<T>();
    for i in 1..=3 {
        t.put("key1", &format!("value{i}"));
        assert_eq!(t.get("key1"), Some(format!("value{i}")));
    }
    assert_eq!(t.storage_keys(), vec![s("key1")]);
    assert_eq!(f.keys(), vec![s("key1"), s("key1")]);
    assert_eq!(f.values(), vec![s("value1"), s("value2")]);
}

// Test: removing the only element empties the table.
fn remove_single_element<T: Contract>() {
    let (mut t, f) = fresh::<T>();
    t.put("key1", "value1");
    assert!(t.del("key1"));
    assert!(t.empty());
    assert_eq!(t.get("key1"), None);
    assert_eq!(f.keys(), vec![s("key1")]);
    assert_eq!(f.values(), vec![s("value1")]);
}

// Test: removal shrinks and compacts.
// Verifies: after removing A from {A, B, C}, B and C keep their values;
// removing B then C empties the table.
fn remove_elements_different_keys<T: Contract>() {
    let (mut t, _f) = fresh::<T>();
    for k in ["A", "B", "C"] {
        t.put(k, k);
    }
    assert!(t.del("A"));
    assert!(!t.empty());
    assert_eq!(t.get("A"), None);
    assert_eq!(t.get("B").as_deref(), Some("B"));
    assert_eq!(t.get("C").as_deref(), Some("C"));
    // C was last, so it now occupies A's old slot.
    assert_eq!(t.storage_keys(), vec![s("C"), s("B")]);

    assert!(t.del("B"));
    assert!(!t.empty());
    assert_eq!(t.get("C").as_deref(), Some("C"));
    assert!(t.del("C"));
    assert!(t.empty());
}

// Test: removal with duplicates.
// Scenario: insert D, then E three times (E1, E2, E3), then remove D.
// Verifies: D is gone and E still maps to E3 after E is relocated into D's
// slot; removing E empties the table.
fn remove_elements_same_keys<T: Contract>() {
    let (mut t, f) = fresh::<T>();
    t.put("key1", "value11");
    t.put("key2", "value21");
    t.put("key2", "value22");
    t.put("key2", "value23");

    assert!(t.del("key1"));
    assert_eq!(t.get("key1"), None);
    assert_eq!(t.get("key2").as_deref(), Some("value23"));
    assert_eq!(t.storage_keys(), vec![s("key2")]);

    assert!(t.del("key2"));
    assert_eq!(t.get("key2"), None);
    assert!(t.empty());

    assert_eq!(f.keys(), vec![s("key1"), s("key2"), s("key2"), s("key2")]);
    assert_eq!(
        f.values(),
        vec![s("value11"), s("value21"), s("value22"), s("value23")]
    );
}

// Test: removing an absent key is a no-op and releases nothing.
fn remove_missing_key_is_noop<T: Contract>() {
    let (mut t, f) = fresh::<T>();
    t.put("key1", "value1");
    assert!(!t.del("nope"));
    assert_eq!(t.get("key1").as_deref(), Some("value1"));
    assert!(f.keys().is_empty() && f.values().is_empty());
}

// Test: destroying a table releases each surviving key and value once.
fn destroy_releases_each_survivor_once<T: Contract>() {
    let (mut t, f) = fresh::<T>();
    for i in 0..20 {
        t.put(&format!("k{i:02}"), &format!("v{i:02}"));
    }
    for i in (0..20).step_by(3) {
        assert!(t.del(&format!("k{i:02}")));
    }
    let removed = f.keys().len();
    assert_eq!(removed, 7);
    drop(t);

    let expected_keys: Vec<String> = (0..20).map(|i| format!("k{i:02}")).collect();
    let expected_values: Vec<String> = (0..20).map(|i| format!("v{i:02}")).collect();
    assert_eq!(f.keys(), expected_keys);
    assert_eq!(f.values(), expected_values);
}

macro_rules! contract_tests {
    ($modname:ident, $ty:ty) => {
        mod $modname {
            use super::*;

            #[test]
            fn is_empty_after_create() {
                super::is_empty_after_create::<$ty>();
            }
            #[test]
            fn non_empty_after_insert() {
                super::non_empty_after_insert::<$ty>();
            }
            #[test]
            fn lookup_single_element() {
                super::lookup_single_element::<$ty>();
            }
            #[test]
            fn insert_lookup_different_keys() {
                super::insert_lookup_different_keys::<$ty>();
            }
            #[test]
            fn insert_lookup_same_keys() {
                super::insert_lookup_same_keys::<$ty>();
            }
            #[test]
            fn remove_single_element() {
                super::remove_single_element::<$ty>();
            }
            #[test]
            fn remove_elements_different_keys() {
                super::remove_elements_different_keys::<$ty>();
            }
            #[test]
            fn remove_elements_same_keys() {
                super::remove_elements_same_keys::<$ty>();
            }
            #[test]
            fn remove_missing_key_is_noop() {
                super::remove_missing_key_is_noop::<$ty>();
            }
            #[test]
            fn destroy_releases_each_survivor_once() {
                super::destroy_releases_each_survivor_once::<$ty>();
            }
        }
    };
}

contract_tests!(linear, Table<String, String>);
contract_tests!(hashed, HashedTable<String, String>);
