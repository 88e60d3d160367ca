use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::Table;
use crate::hasher::DefaultHashBuilder;
use crate::hasher::hash32;

/// Slots per bucket.
const BUCKET_SIZE: usize = 8;

/// Number of primary buckets in a freshly constructed table (16 slots).
const INITIAL_BUCKETS: usize = 2;

/// Top hash of a vacant slot.
const EMPTY: u8 = 0;

/// Smallest top hash a live slot may carry. Computed fragments below this are
/// shifted up so they can never be mistaken for `EMPTY`.
const MIN_TOP_HASH: u8 = 1;

/// End-of-chain marker for overflow links.
const NO_OVERFLOW: u32 = u32::MAX;

/// Start migrating once `populated / slots` exceeds 3/4.
#[inline(always)]
fn over_load_factor(populated: usize, slots: usize) -> bool {
    populated * 4 > slots * 3
}

#[inline(always)]
fn top_hash(hash: u32) -> u8 {
    let top = (hash >> 24) as u8;
    if top < MIN_TOP_HASH {
        top + MIN_TOP_HASH
    } else {
        top
    }
}

/// Marks the high bit of every byte of `tophash` that equals `byte`.
///
/// Bytes above a true match may be reported spuriously when they equal
/// `byte ^ 0x01`, so callers must confirm each candidate. The lowest marked
/// byte is always a true match.
#[inline(always)]
fn match_byte(tophash: &[u8; BUCKET_SIZE], byte: u8) -> u64 {
    const LO: u64 = 0x0101_0101_0101_0101;
    const HI: u64 = 0x8080_8080_8080_8080;

    let cmp = u64::from_le_bytes(*tophash) ^ (LO * byte as u64);
    cmp.wrapping_sub(LO) & !cmp & HI
}

#[inline(always)]
fn first_marked_slot(mask: u64) -> usize {
    (mask.trailing_zeros() >> 3) as usize
}

#[derive(Clone)]
struct Bucket<K, V> {
    tophash: [u8; BUCKET_SIZE],
    entries: [Option<(K, V)>; BUCKET_SIZE],
    overflow: u32,
}

impl<K, V> Bucket<K, V> {
    fn new() -> Self {
        Self {
            tophash: [EMPTY; BUCKET_SIZE],
            entries: core::array::from_fn(|_| None),
            overflow: NO_OVERFLOW,
        }
    }

    fn reset(&mut self) {
        self.tophash = [EMPTY; BUCKET_SIZE];
        self.entries.iter_mut().for_each(|entry| *entry = None);
        self.overflow = NO_OVERFLOW;
    }
}

/// One backing array: `mask + 1` primary buckets followed by any overflow
/// buckets, linked by index.
#[derive(Clone)]
struct BucketArray<K, V> {
    buckets: Vec<Bucket<K, V>>,
    mask: usize,
}

impl<K, V> BucketArray<K, V> {
    fn new(primary: usize) -> Self {
        debug_assert!(primary.is_power_of_two());
        let mut buckets = Vec::with_capacity(primary);
        buckets.resize_with(primary, Bucket::new);
        Self {
            buckets,
            mask: primary - 1,
        }
    }

    #[inline(always)]
    fn primary_len(&self) -> usize {
        self.mask + 1
    }

    #[inline(always)]
    fn slot_capacity(&self) -> usize {
        self.primary_len() * BUCKET_SIZE
    }

    #[inline(always)]
    fn home(&self, hash: u32) -> usize {
        hash as usize & self.mask
    }

    fn overflow_buckets(&self) -> usize {
        self.buckets.len() - self.primary_len()
    }

    /// Walks the chain starting at primary bucket `home`, returning the
    /// `(bucket, slot)` holding `key`.
    fn find(&self, home: usize, top: u8, key: &K) -> Option<(usize, usize)>
    where
        K: Eq,
    {
        let mut index = home;
        loop {
            let bucket = &self.buckets[index];
            let mut matches = match_byte(&bucket.tophash, top);
            while matches != 0 {
                let slot = first_marked_slot(matches);
                matches &= matches - 1;

                if bucket.tophash[slot] != top {
                    continue;
                }
                if let Some((k, _)) = &bucket.entries[slot] {
                    if k == key {
                        return Some((index, slot));
                    }
                }
            }

            if bucket.overflow == NO_OVERFLOW {
                return None;
            }
            index = bucket.overflow as usize;
        }
    }

    /// Stores an entry known to be absent in the first vacant slot of the
    /// chain at `home`, appending an overflow bucket if the chain is full.
    fn insert_vacant(&mut self, home: usize, top: u8, key: K, value: V) {
        debug_assert!(top != EMPTY);

        let mut index = home;
        loop {
            let bucket = &mut self.buckets[index];
            let empties = match_byte(&bucket.tophash, EMPTY);
            if empties != 0 {
                let slot = first_marked_slot(empties);
                debug_assert!(bucket.entries[slot].is_none());
                bucket.tophash[slot] = top;
                bucket.entries[slot] = Some((key, value));
                return;
            }

            if bucket.overflow == NO_OVERFLOW {
                break;
            }
            index = bucket.overflow as usize;
        }

        let overflow = u32::try_from(self.buckets.len())
            .ok()
            .filter(|&overflow| overflow != NO_OVERFLOW)
            .expect("capacity overflow");
        let mut bucket = Bucket::new();
        bucket.tophash[0] = top;
        bucket.entries[0] = Some((key, value));
        self.buckets.push(bucket);
        self.buckets[index].overflow = overflow;
    }

    fn take(&mut self, index: usize, slot: usize) -> Option<(K, V)> {
        let bucket = &mut self.buckets[index];
        bucket.tophash[slot] = EMPTY;
        bucket.entries[slot].take()
    }

    /// Drops every entry and overflow bucket, keeping the primary buckets.
    fn clear(&mut self) {
        self.buckets.truncate(self.primary_len());
        self.buckets.iter_mut().for_each(Bucket::reset);
    }

    /// Number of buckets in the chain starting at `home`.
    #[cfg(any(test, feature = "stats"))]
    fn chain_len(&self, home: usize) -> usize {
        let mut length = 1;
        let mut index = home;
        while self.buckets[index].overflow != NO_OVERFLOW {
            index = self.buckets[index].overflow as usize;
            length += 1;
        }
        length
    }
}

/// Growth state of an [`IncrementalChainingTable`].
#[derive(Clone)]
enum Resize<K, V> {
    Idle,
    /// Primary buckets `cursor..` of `old` still hold their entries; buckets
    /// below `cursor` have been evacuated into the table's current array.
    Migrating {
        old: BucketArray<K, V>,
        cursor: usize,
    },
}

/// Which backing array a located entry lives in.
#[derive(Clone, Copy)]
enum Side {
    Old,
    New,
}

/// Bucketed chaining hash map with incremental (amortized) resize.
///
/// Entries live in 8-slot buckets. Each slot caches the top byte of its key's
/// hash so most non-matching slots are rejected without calling `Eq`. A full
/// bucket chains into overflow buckets stored at the tail of the same array.
///
/// When the load factor exceeds 0.75 a doubled array is allocated, but
/// entries are not moved all at once. Instead every subsequent `insert` and
/// `remove` first evacuates one old primary bucket (with its overflow chain)
/// into the new array. Until the last old bucket has been evacuated, lookups
/// consult the key's old bucket before the new array, and `capacity()` keeps
/// reporting the old size.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use probe_hash::IncrementalChainingTable;
///
/// let mut table: IncrementalChainingTable<_, _> = IncrementalChainingTable::new();
/// for i in 0..100 {
///     table.insert(i, i * 2);
/// }
/// assert_eq!(table.len(), 100);
/// assert_eq!(table.get(&42), Some(&84));
/// # }
/// ```
#[derive(Clone)]
pub struct IncrementalChainingTable<K, V, S = DefaultHashBuilder> {
    buckets: BucketArray<K, V>,
    resize: Resize<K, V>,
    populated: usize,
    hash_builder: S,
}

impl<K, V, S> Debug for IncrementalChainingTable<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> IncrementalChainingTable<K, V, S> {
    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots (buckets × 8). Always a power of two.
    ///
    /// While a migration is in progress this is still the size of the old
    /// array; the doubled capacity takes effect once the last old bucket has
    /// been evacuated.
    pub fn capacity(&self) -> usize {
        match &self.resize {
            Resize::Idle => self.buckets.slot_capacity(),
            Resize::Migrating { old, .. } => old.slot_capacity(),
        }
    }

    /// Returns `true` while entries are being migrated to a larger array.
    pub fn is_resizing(&self) -> bool {
        matches!(self.resize, Resize::Migrating { .. })
    }

    /// Removes all elements from the table.
    ///
    /// An in-progress migration is abandoned and the larger array is kept.
    pub fn clear(&mut self) {
        self.resize = Resize::Idle;
        self.buckets.clear();
        self.populated = 0;
    }

    /// Returns an iterator over all key-value pairs in arbitrary order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let old: &[Bucket<K, V>] = match &self.resize {
            Resize::Idle => &[],
            Resize::Migrating { old, .. } => &old.buckets,
        };
        Iter {
            buckets: old.iter().chain(self.buckets.buckets.iter()),
            entries: Default::default(),
            remaining: self.populated,
        }
    }

    fn array(&self, side: Side) -> &BucketArray<K, V> {
        match (side, &self.resize) {
            (Side::Old, Resize::Migrating { old, .. }) => old,
            _ => &self.buckets,
        }
    }

    fn array_mut(&mut self, side: Side) -> &mut BucketArray<K, V> {
        match (side, &mut self.resize) {
            (Side::Old, Resize::Migrating { old, .. }) => old,
            _ => &mut self.buckets,
        }
    }

    /// Finds the entry for `key`, checking the old array first while a
    /// migration is in progress.
    fn locate(&self, hash: u32, key: &K) -> Option<(Side, usize, usize)>
    where
        K: Eq,
    {
        let top = top_hash(hash);
        if let Resize::Migrating { old, cursor } = &self.resize {
            let home = old.home(hash);
            if home >= *cursor {
                if let Some((index, slot)) = old.find(home, top, key) {
                    return Some((Side::Old, index, slot));
                }
            }
        }

        self.buckets
            .find(self.buckets.home(hash), top, key)
            .map(|(index, slot)| (Side::New, index, slot))
    }

    #[cold]
    #[inline(never)]
    fn start_resize(&mut self) {
        let primary = self
            .buckets
            .primary_len()
            .checked_mul(2)
            .expect("capacity overflow");
        let old = core::mem::replace(&mut self.buckets, BucketArray::new(primary));
        self.resize = Resize::Migrating { old, cursor: 0 };
    }

    /// Evacuates the old bucket at the migration cursor, if any, and finishes
    /// the migration once the cursor passes the last old bucket.
    fn grow_work(&mut self)
    where
        K: Hash,
        S: BuildHasher,
    {
        let Resize::Migrating { old, cursor } = &mut self.resize else {
            return;
        };

        let mut index = *cursor;
        loop {
            let bucket = &mut old.buckets[index];
            for slot in 0..BUCKET_SIZE {
                if let Some((key, value)) = bucket.entries[slot].take() {
                    bucket.tophash[slot] = EMPTY;
                    let hash = hash32(&self.hash_builder, &key);
                    let home = self.buckets.home(hash);
                    self.buckets.insert_vacant(home, top_hash(hash), key, value);
                }
            }

            if bucket.overflow == NO_OVERFLOW {
                break;
            }
            index = bucket.overflow as usize;
        }

        *cursor += 1;
        let finished = *cursor == old.primary_len();
        if finished {
            self.resize = Resize::Idle;
        }
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::DebugStats {
        let mut overflow_entries = self.buckets.overflow_buckets();
        let mut longest_probe = (0..self.buckets.primary_len())
            .map(|home| self.buckets.chain_len(home))
            .max()
            .unwrap_or(0);
        let mut migration = None;

        if let Resize::Migrating { old, cursor } = &self.resize {
            overflow_entries += old.overflow_buckets();
            longest_probe = (*cursor..old.primary_len())
                .map(|home| old.chain_len(home))
                .fold(longest_probe, usize::max);
            migration = Some((*cursor, old.primary_len()));
        }

        crate::DebugStats {
            populated: self.populated,
            capacity: self.capacity(),
            load_factor: crate::DebugStats::load_factor_of(self.populated, self.capacity()),
            overflow_entries,
            tombstones: 0,
            longest_probe,
            migration,
        }
    }
}

impl<K, V, S> IncrementalChainingTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty table with two buckets (16 slots) and the given hasher
    /// builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates an empty table that can hold at least `capacity` elements
    /// before its first migration.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let primary = capacity
            .checked_mul(4)
            .expect("capacity overflow")
            .div_ceil(3)
            .div_ceil(BUCKET_SIZE)
            .next_power_of_two()
            .max(INITIAL_BUCKETS);
        Self {
            buckets: BucketArray::new(primary),
            resize: Resize::Idle,
            populated: 0,
            hash_builder,
        }
    }

    /// Inserts a key-value pair into the table.
    ///
    /// Returns the previous value if the key was present. If a migration is in
    /// progress, one old bucket is evacuated first.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.grow_work();

        let hash = hash32(&self.hash_builder, &key);
        if let Some((side, index, slot)) = self.locate(hash, &key) {
            if let Some((_, existing)) = self.array_mut(side).buckets[index].entries[slot].as_mut()
            {
                return Some(core::mem::replace(existing, value));
            }
        }

        let home = self.buckets.home(hash);
        self.buckets.insert_vacant(home, top_hash(hash), key, value);
        self.populated += 1;

        if !self.is_resizing() && over_load_factor(self.populated, self.buckets.slot_capacity()) {
            self.start_resize();
        }
        None
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = hash32(&self.hash_builder, key);
        let (side, index, slot) = self.locate(hash, key)?;
        self.array(side).buckets[index].entries[slot]
            .as_ref()
            .map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = hash32(&self.hash_builder, key);
        let (side, index, slot) = self.locate(hash, key)?;
        self.array_mut(side).buckets[index].entries[slot]
            .as_mut()
            .map(|(_, value)| value)
    }

    /// Returns `true` if the table contains a value for the key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes a key from the table, returning its value if it was present.
    ///
    /// If a migration is in progress, one old bucket is evacuated first.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.grow_work();

        let hash = hash32(&self.hash_builder, key);
        let (side, index, slot) = self.locate(hash, key)?;
        let (_, value) = self.array_mut(side).take(index, slot)?;
        self.populated -= 1;
        Some(value)
    }
}

impl<K, V, S> IncrementalChainingTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty table using the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty table with room for `capacity` elements using the
    /// default hasher builder.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<K, V, S> Default for IncrementalChainingTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Table<K, V> for IncrementalChainingTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        IncrementalChainingTable::insert(self, key, value)
    }

    fn get(&self, key: &K) -> Option<&V> {
        IncrementalChainingTable::get(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        IncrementalChainingTable::remove(self, key)
    }

    fn len(&self) -> usize {
        IncrementalChainingTable::len(self)
    }

    fn clear(&mut self) {
        IncrementalChainingTable::clear(self)
    }
}

type BucketIter<'a, K, V> = core::slice::Iter<'a, Bucket<K, V>>;

/// An iterator over the entries of an [`IncrementalChainingTable`].
pub struct Iter<'a, K, V> {
    buckets: core::iter::Chain<BucketIter<'a, K, V>, BucketIter<'a, K, V>>,
    entries: core::slice::Iter<'a, Option<(K, V)>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        loop {
            for entry in self.entries.by_ref() {
                if let Some((key, value)) = entry {
                    self.remaining -= 1;
                    return Some((key, value));
                }
            }
            self.entries = self.buckets.next()?.entries.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
