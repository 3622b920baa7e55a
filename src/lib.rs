//! array-table: a bounded, index-addressable array and a dense,
//! linear-scan associative table built on it.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: an associative table whose storage is one fixed-range array with
//!   no holes, and whose ownership of keys and values is explicit: every
//!   key and value the table lets go of is handed to a caller-registered
//!   release callback exactly once.
//! - Layers:
//!   - BoundedArray<T>: slots over an inclusive `[low, high]` index range,
//!     each empty or holding one item, with an optional release callback
//!     run on overwrite and on drop. Never resizes.
//!   - EntryStore<T> (internal): keeps entries packed into positions
//!     `[0, len)` of one BoundedArray; push, in-place replace,
//!     swap-compaction removal, optional doubling growth.
//!   - Table<K, V, C>: linear scan under a three-way comparator `C`.
//!   - HashedTable<K, V, S>: the same storage and contract behind a
//!     `hashbrown` index from stored hash to position.
//!
//! Invariants
//! - Density: occupied slots exactly fill `[low, low + len)`.
//! - Uniqueness: after any insert returns, no two entries compare equal.
//!   Duplicate inserts replace in place (last write wins); they are never
//!   rejected.
//! - Ownership: an item is owned by the table or by the caller, never both.
//!   Overwrite, `remove`, `clear` and drop release; `take` and a rejected
//!   insert give the item back; `lookup` never transfers.
//! - Relocation is a move. Swap-compaction and growth go through
//!   `BoundedArray::{take, replace}`, which never release.
//!
//! Callback ordering
//! - The store is consistent (density, uniqueness, `len`) before any
//!   release callback runs.
//! - User code that runs mid-scan (comparator, `Eq`, `Hash`) is fenced by a
//!   debug-only scan lock; re-entering the same table from there panics in
//!   debug builds.
//!
//! Capacity
//! - `TableConfig` fixes the initial slot count, the first index, and the
//!   full-table policy: `Growth::Fixed` rejects new keys with
//!   `InsertError::CapacityExceeded`, `Growth::Doubling` reallocates.
//!   Rejected pairs always come back to the caller.
//! - Array and table creation allocate fallibly; exhaustion is an error
//!   value, not an abort.
//!
//! Notes and non-goals
//! - Single-threaded: tables are `!Send`/`!Sync`.
//! - Removal does not preserve storage order: the last entry moves into the
//!   vacated position.
//! - `Table` is O(n) per operation by construction. `HashedTable` exists for
//!   callers that want the same contract with O(1) average lookups.
//! - Out-of-range array indices are a caller error and panic.

mod bounded_array;
mod config;
mod error;
mod hashed_table;
mod scan_lock;
mod store;
mod table;
mod table_proptest;

// Public surface
pub use bounded_array::{BoundedArray, Release, Rendering};
pub use config::{Growth, TableConfig};
pub use error::{ArrayError, InsertError, TableError};
pub use hashed_table::HashedTable;
pub use table::{Compare, OrdCompare, Table, TableBuilder};
