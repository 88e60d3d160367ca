#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Baseline separate chaining: one singly linked chain per bucket, resized all
/// at once.
pub mod chaining;

/// Separate chaining over 8-slot buckets with cached top-hash bytes and an
/// incremental, bucket-at-a-time resize.
pub mod incremental;

/// Open addressing over 16-slot groups with per-slot control bytes.
pub mod grouped;

/// Hash builder selection and hash derivation shared by all tables.
pub mod hasher;

#[cfg(any(test, feature = "stats"))]
mod stats;

pub use chaining::ChainingTable;
pub use grouped::GroupedOpenAddressTable;
pub use hasher::DefaultHashBuilder;
pub use incremental::IncrementalChainingTable;
#[cfg(any(test, feature = "stats"))]
pub use stats::DebugStats;

/// The operations every table engine in this crate supports.
///
/// All engines behave identically through this trait: the same sequence of
/// calls yields the same results regardless of the layout underneath. It lets
/// callers and benchmarks treat the engines interchangeably.
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use probe_hash::ChainingTable;
/// use probe_hash::GroupedOpenAddressTable;
/// use probe_hash::IncrementalChainingTable;
/// use probe_hash::Table;
///
/// fn exercise(table: &mut dyn Table<u32, u32>) {
///     for i in 0..100 {
///         table.insert(i, i * 2);
///     }
///     assert_eq!(table.get(&42), Some(&84));
///     assert_eq!(table.remove(&42), Some(84));
///     assert_eq!(table.len(), 99);
/// }
///
/// exercise(&mut ChainingTable::<u32, u32>::new());
/// exercise(&mut IncrementalChainingTable::<u32, u32>::new());
/// exercise(&mut GroupedOpenAddressTable::<u32, u32>::new());
/// # }
/// ```
pub trait Table<K, V> {
    /// Inserts `value` under `key`, returning the value it replaced if the key
    /// was already present.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &K) -> Option<&V>;

    /// Removes `key`, returning its value if it was present.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Number of entries currently stored.
    fn len(&self) -> usize;

    /// Returns `true` if the table holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry. The table stays usable afterwards.
    fn clear(&mut self);
}
