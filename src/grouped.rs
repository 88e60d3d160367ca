use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::Table;
use crate::hasher::DefaultHashBuilder;
use crate::hasher::hash64;

/// Slots per group. One SSE2 register of control bytes.
const GROUP_WIDTH: usize = 16;

/// Number of groups in a freshly constructed table (128 slots).
const INITIAL_GROUPS: usize = 8;

/// Control byte of a slot that has never held an entry. Terminates probes.
const EMPTY: u8 = 0x00;

/// Control byte of a slot whose entry was removed. Skipped by probes.
const DELETED: u8 = 0x01;

/// Set on every in-use control byte; the low 7 bits carry the hash fragment.
const FULL_BIT: u8 = 0x80;

#[inline(always)]
fn control_byte(hash: u64) -> u8 {
    (hash >> 57) as u8 | FULL_BIT
}

#[derive(Clone, Copy)]
#[repr(C, align(16))]
struct ControlBytes {
    bytes: [u8; GROUP_WIDTH],
}

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "x86_64", target_feature = "sse2"))] {
        impl ControlBytes {
            /// Bitmask of the slots whose control byte equals `byte`.
            #[inline(always)]
            fn match_byte(&self, byte: u8) -> u16 {
                use core::arch::x86_64::*;
                // SAFETY: `ControlBytes` is `#[repr(C, align(16))]` with `bytes` at
                // offset 0, so the 16-byte aligned load stays in bounds.
                unsafe {
                    let data = _mm_load_si128(self.bytes.as_ptr() as *const __m128i);
                    let cmp = _mm_cmpeq_epi8(data, _mm_set1_epi8(byte as i8));
                    _mm_movemask_epi8(cmp) as u16
                }
            }

            /// Bitmask of the slots holding an entry.
            #[inline(always)]
            fn match_full(&self) -> u16 {
                use core::arch::x86_64::*;
                // SAFETY: as in `match_byte`. `FULL_BIT` is the sign bit, which is
                // exactly what `movemask` collects.
                unsafe {
                    let data = _mm_load_si128(self.bytes.as_ptr() as *const __m128i);
                    _mm_movemask_epi8(data) as u16
                }
            }
        }
    } else {
        impl ControlBytes {
            /// Bitmask of the slots whose control byte equals `byte`.
            #[inline(always)]
            fn match_byte(&self, byte: u8) -> u16 {
                let mut bits: u16 = 0;
                for (i, &b) in self.bytes.iter().enumerate() {
                    if b == byte {
                        bits |= 1 << i;
                    }
                }
                bits
            }

            /// Bitmask of the slots holding an entry.
            #[inline(always)]
            fn match_full(&self) -> u16 {
                let mut bits: u16 = 0;
                for (i, &b) in self.bytes.iter().enumerate() {
                    if b & FULL_BIT != 0 {
                        bits |= 1 << i;
                    }
                }
                bits
            }
        }
    }
}

#[derive(Clone)]
struct Slot<K, V> {
    hash: u64,
    key: K,
    value: V,
}

#[derive(Clone)]
struct Group<K, V> {
    control: ControlBytes,
    slots: [Option<Slot<K, V>>; GROUP_WIDTH],
}

impl<K, V> Group<K, V> {
    fn new() -> Self {
        Self {
            control: ControlBytes {
                bytes: [EMPTY; GROUP_WIDTH],
            },
            slots: core::array::from_fn(|_| None),
        }
    }
}

fn new_groups<K, V>(count: usize) -> Vec<Group<K, V>> {
    debug_assert!(count.is_power_of_two());
    let mut groups = Vec::with_capacity(count);
    groups.resize_with(count, Group::new);
    groups
}

/// Outcome of walking the probe sequence for a key.
enum Probe {
    /// The key lives at `(group, slot)`.
    Found(usize, usize),
    /// The key is absent; `(group, slot)` is where it should be inserted: the
    /// first tombstone on the probe path, or else the terminating empty slot.
    Vacant(usize, usize),
    /// The key is absent and a full pass found no empty slot.
    Full,
}

/// Open-addressing hash map with 16-slot groups and per-slot control bytes,
/// in the style of Swiss tables.
///
/// Every slot has a control byte: `EMPTY`, `DELETED`, or the full bit plus the
/// top 7 bits of the key's 64-bit hash. A probe starts at group
/// `hash & (groups - 1)` and visits groups in increasing order with
/// wraparound. Within a group all 16 control bytes are compared at once; only
/// slots whose fragment matches are compared with `Eq`. A group containing an
/// `EMPTY` slot ends the probe.
///
/// Removal leaves a `DELETED` tombstone. An insert whose probe ends at an
/// empty slot lands on the first tombstone it passed, if any. The table grows
/// only when an insert finds no empty slot anywhere, at which point the number
/// of groups doubles and every live entry is re-inserted, dropping all
/// tombstones.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use probe_hash::GroupedOpenAddressTable;
///
/// let mut table: GroupedOpenAddressTable<_, _> = GroupedOpenAddressTable::new();
/// assert_eq!(table.capacity(), 128);
///
/// table.insert("key-7", 14);
/// assert_eq!(table.remove(&"key-7"), Some(14));
/// table.insert("key-7", 15);
/// assert_eq!(table.get(&"key-7"), Some(&15));
/// assert_eq!(table.capacity(), 128);
/// # }
/// ```
#[derive(Clone)]
pub struct GroupedOpenAddressTable<K, V, S = DefaultHashBuilder> {
    groups: Vec<Group<K, V>>,
    populated: usize,
    tombstones: usize,
    hash_builder: S,
}

impl<K, V, S> Debug for GroupedOpenAddressTable<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> GroupedOpenAddressTable<K, V, S> {
    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots (groups × 16). Always a power of two.
    pub fn capacity(&self) -> usize {
        self.groups.len() * GROUP_WIDTH
    }

    /// Removes all elements and tombstones, keeping the current number of
    /// groups.
    pub fn clear(&mut self) {
        for group in &mut self.groups {
            group.control.bytes = [EMPTY; GROUP_WIDTH];
            group.slots.iter_mut().for_each(|slot| *slot = None);
        }
        self.populated = 0;
        self.tombstones = 0;
    }

    /// Returns an iterator over all key-value pairs in arbitrary order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            groups: self.groups.iter(),
            slots: Default::default(),
            remaining: self.populated,
        }
    }

    #[inline(always)]
    fn home_group(&self, hash: u64) -> usize {
        hash as usize & (self.groups.len() - 1)
    }

    fn probe(&self, hash: u64, key: &K) -> Probe
    where
        K: Eq,
    {
        let tag = control_byte(hash);
        let mask = self.groups.len() - 1;
        let home = self.home_group(hash);
        let mut tombstone = None;

        for step in 0..self.groups.len() {
            let index = (home + step) & mask;
            let group = &self.groups[index];

            let mut matches = group.control.match_byte(tag);
            while matches != 0 {
                let slot = matches.trailing_zeros() as usize;
                matches &= matches - 1;

                if let Some(entry) = &group.slots[slot] {
                    if entry.hash == hash && entry.key == *key {
                        return Probe::Found(index, slot);
                    }
                }
            }

            if tombstone.is_none() {
                let deleted = group.control.match_byte(DELETED);
                if deleted != 0 {
                    tombstone = Some((index, deleted.trailing_zeros() as usize));
                }
            }

            let empties = group.control.match_byte(EMPTY);
            if empties != 0 {
                let (group, slot) =
                    tombstone.unwrap_or((index, empties.trailing_zeros() as usize));
                return Probe::Vacant(group, slot);
            }
        }

        Probe::Full
    }

    /// Places an entry into the first empty slot of its probe sequence. Only
    /// used while regrowing, when the table holds no tombstones and no
    /// duplicate of the key.
    fn insert_unique(&mut self, entry: Slot<K, V>) {
        let mask = self.groups.len() - 1;
        let mut index = self.home_group(entry.hash);
        loop {
            let group = &mut self.groups[index];
            let empties = group.control.match_byte(EMPTY);
            if empties != 0 {
                let slot = empties.trailing_zeros() as usize;
                group.control.bytes[slot] = control_byte(entry.hash);
                group.slots[slot] = Some(entry);
                return;
            }
            index = (index + 1) & mask;
        }
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self) {
        let count = self
            .groups
            .len()
            .checked_mul(2)
            .expect("capacity overflow");
        let old = core::mem::replace(&mut self.groups, new_groups(count));
        self.tombstones = 0;

        for mut group in old {
            let mut full = group.control.match_full();
            while full != 0 {
                let slot = full.trailing_zeros() as usize;
                full &= full - 1;

                if let Some(entry) = group.slots[slot].take() {
                    self.insert_unique(entry);
                }
            }
        }
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::DebugStats {
        let mask = self.groups.len() - 1;
        let mut overflow_entries = 0;
        let mut longest_probe = 0;
        for (index, group) in self.groups.iter().enumerate() {
            for entry in group.slots.iter().flatten() {
                let distance = index.wrapping_sub(self.home_group(entry.hash)) & mask;
                if distance != 0 {
                    overflow_entries += 1;
                }
                longest_probe = longest_probe.max(distance + 1);
            }
        }

        crate::DebugStats {
            populated: self.populated,
            capacity: self.capacity(),
            load_factor: crate::DebugStats::load_factor_of(self.populated, self.capacity()),
            overflow_entries,
            tombstones: self.tombstones,
            longest_probe,
            migration: None,
        }
    }
}

impl<K, V, S> GroupedOpenAddressTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty table with 8 groups (128 slots) and the given hasher
    /// builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates an empty table with at least `capacity` slots.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let groups = capacity
            .div_ceil(GROUP_WIDTH)
            .next_power_of_two()
            .max(INITIAL_GROUPS);
        Self {
            groups: new_groups(groups),
            populated: 0,
            tombstones: 0,
            hash_builder,
        }
    }

    /// Inserts a key-value pair into the table.
    ///
    /// Returns the previous value if the key was present. An absent key reuses
    /// the first tombstone on its probe path when that path ends at an empty
    /// slot; with no empty slot left the table grows first.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = hash64(&self.hash_builder, &key);
        loop {
            match self.probe(hash, &key) {
                Probe::Found(group, slot) => {
                    let entry = self.groups[group].slots[slot].as_mut();
                    debug_assert!(entry.is_some());
                    return entry.map(|entry| core::mem::replace(&mut entry.value, value));
                }
                Probe::Vacant(group, slot) => {
                    let group = &mut self.groups[group];
                    if group.control.bytes[slot] == DELETED {
                        self.tombstones -= 1;
                    }
                    group.control.bytes[slot] = control_byte(hash);
                    group.slots[slot] = Some(Slot { hash, key, value });
                    self.populated += 1;
                    return None;
                }
                Probe::Full => self.grow(),
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = hash64(&self.hash_builder, key);
        match self.probe(hash, key) {
            Probe::Found(group, slot) => self.groups[group].slots[slot]
                .as_ref()
                .map(|entry| &entry.value),
            Probe::Vacant(..) | Probe::Full => None,
        }
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = hash64(&self.hash_builder, key);
        match self.probe(hash, key) {
            Probe::Found(group, slot) => self.groups[group].slots[slot]
                .as_mut()
                .map(|entry| &mut entry.value),
            Probe::Vacant(..) | Probe::Full => None,
        }
    }

    /// Returns `true` if the table contains a value for the key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes a key from the table, returning its value if it was present.
    ///
    /// The slot becomes a tombstone; it is reclaimed by a later insert on the
    /// same probe path, a regrow, or `clear`.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = hash64(&self.hash_builder, key);
        let Probe::Found(group, slot) = self.probe(hash, key) else {
            return None;
        };

        let group = &mut self.groups[group];
        let entry = group.slots[slot].take()?;
        group.control.bytes[slot] = DELETED;
        self.populated -= 1;
        self.tombstones += 1;
        Some(entry.value)
    }
}

impl<K, V, S> GroupedOpenAddressTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty table using the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty table with at least `capacity` slots using the
    /// default hasher builder.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<K, V, S> Default for GroupedOpenAddressTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Table<K, V> for GroupedOpenAddressTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        GroupedOpenAddressTable::insert(self, key, value)
    }

    fn get(&self, key: &K) -> Option<&V> {
        GroupedOpenAddressTable::get(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        GroupedOpenAddressTable::remove(self, key)
    }

    fn len(&self) -> usize {
        GroupedOpenAddressTable::len(self)
    }

    fn clear(&mut self) {
        GroupedOpenAddressTable::clear(self)
    }
}

/// An iterator over the entries of a [`GroupedOpenAddressTable`].
pub struct Iter<'a, K, V> {
    groups: core::slice::Iter<'a, Group<K, V>>,
    slots: core::slice::Iter<'a, Option<Slot<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        loop {
            for slot in self.slots.by_ref() {
                if let Some(entry) = slot {
                    self.remaining -= 1;
                    return Some((&entry.key, &entry.value));
                }
            }
            self.slots = self.groups.next()?.slots.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::hasher::testing::ConstHashBuilder;
    use crate::hasher::testing::SipHashBuilder;

    /// Control bytes, slots and counters agree with each other.
    fn assert_consistent<K, V, S>(table: &GroupedOpenAddressTable<K, V, S>) {
        let mut full = 0;
        let mut deleted = 0;
        for group in &table.groups {
            for (slot, &control) in group.control.bytes.iter().enumerate() {
                match control {
                    EMPTY => assert!(group.slots[slot].is_none()),
                    DELETED => {
                        assert!(group.slots[slot].is_none());
                        deleted += 1;
                    }
                    _ => {
                        let entry = group.slots[slot].as_ref().unwrap();
                        assert_eq!(control, control_byte(entry.hash));
                        full += 1;
                    }
                }
            }
        }
        assert_eq!(full, table.populated);
        assert_eq!(deleted, table.tombstones);
    }

    #[test]
    fn control_byte_never_collides_with_sentinels() {
        assert_eq!(control_byte(0), FULL_BIT);
        assert_eq!(control_byte(u64::MAX), 0xFF);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let control = control_byte(rng.random());
            assert_ne!(control, EMPTY);
            assert_ne!(control, DELETED);
            assert_ne!(control & FULL_BIT, 0);
        }
    }

    #[test]
    fn group_matching() {
        let mut rng = SmallRng::seed_from_u64(11);
        let choices = [EMPTY, DELETED, 0x80, 0x81, 0xFF];
        for _ in 0..10_000 {
            let mut control = ControlBytes {
                bytes: [EMPTY; GROUP_WIDTH],
            };
            for byte in control.bytes.iter_mut() {
                *byte = choices[rng.random_range(0..choices.len())];
            }

            for needle in choices {
                let expected = control
                    .bytes
                    .iter()
                    .enumerate()
                    .filter(|&(_, &b)| b == needle)
                    .fold(0u16, |bits, (i, _)| bits | (1 << i));
                assert_eq!(control.match_byte(needle), expected);
            }

            let expected_full = control
                .bytes
                .iter()
                .enumerate()
                .filter(|&(_, &b)| b & FULL_BIT != 0)
                .fold(0u16, |bits, (i, _)| bits | (1 << i));
            assert_eq!(control.match_full(), expected_full);
        }
    }

    #[test]
    fn starts_with_eight_groups() {
        let table: GroupedOpenAddressTable<u64, u64, SipHashBuilder> =
            GroupedOpenAddressTable::new();
        assert_eq!(table.capacity(), 128);
        assert_eq!(table.groups.len(), 8);
    }

    #[test]
    fn growth_is_demand_driven() {
        let mut table = GroupedOpenAddressTable::with_hasher(SipHashBuilder::default());
        for k in 0..128u64 {
            table.insert(k, k);
        }
        // Every slot is in use, yet no growth has happened.
        assert_eq!(table.capacity(), 128);
        assert_eq!(table.len(), 128);
        assert_consistent(&table);

        table.insert(128, 128);
        assert_eq!(table.capacity(), 256);
        assert_consistent(&table);
        for k in 0..129u64 {
            assert_eq!(table.get(&k), Some(&k));
        }
    }

    #[test]
    fn tombstone_reuse_without_growth() {
        let mut table = GroupedOpenAddressTable::with_hasher(SipHashBuilder::default());
        for k in 0..100u64 {
            table.insert(k, k);
        }

        assert_eq!(table.remove(&5), Some(5));
        assert_eq!(table.debug_stats().tombstones, 1);
        assert_eq!(table.get(&5), None);

        table.insert(5, 50);
        assert_eq!(table.get(&5), Some(&50));
        assert_eq!(table.capacity(), 128);
        assert_eq!(table.debug_stats().tombstones, 0);
        assert_consistent(&table);
    }

    #[test]
    fn other_key_reuses_tombstone_on_its_path() {
        // Group 0 is full and group 1 still has empty slots.
        let mut table = GroupedOpenAddressTable::with_hasher(ConstHashBuilder(0));
        for k in 0..20u64 {
            table.insert(k, k);
        }
        assert_eq!(table.remove(&3), Some(3));
        assert_eq!(table.groups[0].control.match_byte(DELETED).count_ones(), 1);

        table.insert(1000, 1);
        assert_eq!(table.capacity(), 128);
        assert_eq!(table.debug_stats().tombstones, 0);
        assert_eq!(table.groups[0].control.match_full(), 0xFFFF);
        assert_eq!(table.get(&1000), Some(&1));
        assert_eq!(table.get(&3), None);
        assert_consistent(&table);
    }

    #[test]
    fn regrow_drops_tombstones() {
        let mut table = GroupedOpenAddressTable::with_hasher(SipHashBuilder::default());
        for k in 0..128u64 {
            table.insert(k, k);
        }
        for k in [3u64, 40, 99] {
            assert_eq!(table.remove(&k), Some(k));
        }
        // No empty slot is left, only tombstones.
        assert!(table.groups.iter().all(|g| g.control.match_byte(EMPTY) == 0));
        assert_eq!(table.debug_stats().tombstones, 3);

        table.insert(1000, 1000);
        assert_eq!(table.capacity(), 256);
        assert_eq!(table.debug_stats().tombstones, 0);
        assert_eq!(table.len(), 126);
        assert_consistent(&table);

        for k in [3u64, 40, 99] {
            assert_eq!(table.get(&k), None);
        }
        assert_eq!(table.get(&1000), Some(&1000));
        for k in (0..128u64).filter(|k| ![3, 40, 99].contains(k)) {
            assert_eq!(table.get(&k), Some(&k));
        }
    }

    #[test]
    fn churn_on_full_table_grows() {
        let mut table = GroupedOpenAddressTable::with_hasher(SipHashBuilder::default());
        for k in 0..128u64 {
            table.insert(k, k);
        }

        for round in 0..5000u64 {
            assert_eq!(table.remove(&round), Some(round));
            table.insert(128 + round, 128 + round);
            if round == 0 {
                assert_eq!(table.capacity(), 256);
            }
            assert!(table.groups.iter().any(|g| g.control.match_byte(EMPTY) != 0));
        }
        assert_eq!(table.len(), 128);
        assert_consistent(&table);
        for k in 5000..5128u64 {
            assert_eq!(table.get(&k), Some(&k));
        }
    }

    #[test]
    fn tombstones_do_not_terminate_probes() {
        // All keys share one home group, so later keys sit beyond earlier ones.
        let mut table = GroupedOpenAddressTable::with_hasher(ConstHashBuilder(0));
        for k in 0..40u64 {
            table.insert(k, k);
        }
        assert_eq!(table.debug_stats().longest_probe, 3);

        for k in 0..16u64 {
            assert_eq!(table.remove(&k), Some(k));
        }
        assert_eq!(table.debug_stats().tombstones, 16);
        for k in 16..40u64 {
            assert_eq!(table.get(&k), Some(&k));
        }
        for k in 0..16u64 {
            assert_eq!(table.get(&k), None);
        }
        assert_consistent(&table);
    }

    #[test]
    fn probe_wraps_around() {
        // Home group is the last one; overflow continues at group 0.
        let mut table = GroupedOpenAddressTable::with_hasher(ConstHashBuilder(7));
        for k in 0..40u64 {
            table.insert(k, k * 2);
        }
        assert_eq!(table.capacity(), 128);
        assert_eq!(table.debug_stats().longest_probe, 3);
        assert_eq!(table.groups[0].control.match_full(), 0xFFFF);
        for k in 0..40u64 {
            assert_eq!(table.get(&k), Some(&(k * 2)));
        }
    }

    #[test]
    fn partial_churn_keeps_entries() {
        let mut table = GroupedOpenAddressTable::with_hasher(SipHashBuilder::default());
        for k in 0..100u64 {
            table.insert(k, k);
        }
        for k in 0..50u64 {
            assert_eq!(table.remove(&k), Some(k));
        }
        assert_eq!(table.debug_stats().tombstones, 50);
        assert_eq!(table.len(), 50);
        assert_consistent(&table);

        for k in 100..400u64 {
            table.insert(k, k);
            assert_consistent(&table);
        }
        assert!(table.capacity() > 128);
        assert_eq!(table.len(), 350);
        for k in 50..400u64 {
            assert_eq!(table.get(&k), Some(&k));
        }
    }

    #[test]
    fn clear_resets_tombstones() {
        let mut table = GroupedOpenAddressTable::with_hasher(SipHashBuilder::default());
        for i in 0..200u64 {
            table.insert(format!("key-{i}"), i);
        }
        table.remove(&String::from("key-3"));
        let capacity = table.capacity();

        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.debug_stats().tombstones, 0);
        assert_consistent(&table);

        table.insert(String::from("key-3"), 3);
        assert_eq!(table.get(&String::from("key-3")), Some(&3));
    }

    #[test]
    fn get_mut_and_iter() {
        let mut table = GroupedOpenAddressTable::with_hasher(SipHashBuilder::default());
        for i in 0..300u64 {
            table.insert(i, i);
        }
        for i in (0..300u64).step_by(2) {
            table.remove(&i);
        }
        if let Some(v) = table.get_mut(&1) {
            *v = 1000;
        }
        assert_eq!(table.get(&1), Some(&1000));
        assert_eq!(table.get_mut(&2), None);

        assert_eq!(table.iter().count(), 150);
        assert!(table.iter().all(|(k, _)| k % 2 == 1));
    }
}
