use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::Table;
use crate::hasher::DefaultHashBuilder;
use crate::hasher::hash32;

/// Number of chain heads in a freshly constructed table.
const INITIAL_HEADS: usize = 16;

/// End-of-chain marker for node links.
const NIL: u32 = u32::MAX;

/// Grow once `populated / heads` exceeds 3/4.
#[inline(always)]
fn over_load_factor(populated: usize, heads: usize) -> bool {
    populated * 4 > heads * 3
}

#[derive(Clone)]
struct Node<K, V> {
    hash: u32,
    next: u32,
    key: K,
    value: V,
}

/// The link that points at a node: either a chain head or a predecessor's
/// `next`.
#[derive(Clone, Copy)]
enum Link {
    Head(usize),
    Node(usize),
}

/// Baseline separate-chaining hash map with stop-the-world resize.
///
/// Each of the `capacity()` heads starts a singly linked chain of nodes. The
/// nodes live in one dense arena and link to each other by index, so a resize
/// only rebuilds links: entries themselves never move.
///
/// When `len() / capacity()` exceeds 0.75 after an insertion the number of
/// heads doubles and every node is relinked in one pass.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use probe_hash::ChainingTable;
///
/// let mut table: ChainingTable<_, _> = ChainingTable::new();
/// assert_eq!(table.insert("key-1", 2), None);
/// assert_eq!(table.get(&"key-1"), Some(&2));
/// assert_eq!(table.remove(&"key-1"), Some(2));
/// assert!(table.is_empty());
/// # }
/// ```
#[derive(Clone)]
pub struct ChainingTable<K, V, S = DefaultHashBuilder> {
    heads: Vec<u32>,
    nodes: Vec<Node<K, V>>,
    hash_builder: S,
}

impl<K, V, S> Debug for ChainingTable<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> ChainingTable<K, V, S> {
    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of chain heads. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.heads.len()
    }

    /// Removes all elements from the table, keeping the current number of
    /// heads.
    pub fn clear(&mut self) {
        self.heads.fill(NIL);
        self.nodes.clear();
    }

    /// Returns an iterator over all key-value pairs in arbitrary order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.nodes.iter(),
        }
    }

    #[inline(always)]
    fn head_index(&self, hash: u32) -> usize {
        hash as usize & (self.heads.len() - 1)
    }

    /// Walks the chain for `hash`, returning the matching node and the link
    /// that points at it.
    fn search(&self, hash: u32, key: &K) -> Option<(Link, usize)>
    where
        K: Eq,
    {
        let mut link = Link::Head(self.head_index(hash));
        let mut cursor = self.heads[self.head_index(hash)];
        while cursor != NIL {
            let node = &self.nodes[cursor as usize];
            if node.hash == hash && node.key == *key {
                return Some((link, cursor as usize));
            }
            link = Link::Node(cursor as usize);
            cursor = node.next;
        }
        None
    }

    fn set_link(&mut self, link: Link, target: u32) {
        match link {
            Link::Head(head) => self.heads[head] = target,
            Link::Node(node) => self.nodes[node].next = target,
        }
    }

    /// Repoints whichever link references node `from` to node `to`.
    fn relink(&mut self, hash: u32, from: u32, to: u32) {
        let head = self.head_index(hash);
        if self.heads[head] == from {
            self.heads[head] = to;
            return;
        }

        let mut cursor = self.heads[head];
        while cursor != NIL {
            let node = &mut self.nodes[cursor as usize];
            if node.next == from {
                node.next = to;
                return;
            }
            cursor = node.next;
        }
        debug_assert!(false, "node {from} is not linked from its chain");
    }

    #[cold]
    #[inline(never)]
    fn resize_rehash(&mut self) {
        let heads = self
            .heads
            .len()
            .checked_mul(2)
            .expect("capacity overflow");
        self.heads = vec![NIL; heads];

        for index in 0..self.nodes.len() {
            let head = self.head_index(self.nodes[index].hash);
            self.nodes[index].next = self.heads[head];
            self.heads[head] = index as u32;
        }
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::DebugStats {
        let mut overflow_entries = 0;
        let mut longest_probe = 0;
        for &head in &self.heads {
            let mut length: usize = 0;
            let mut cursor = head;
            while cursor != NIL {
                length += 1;
                cursor = self.nodes[cursor as usize].next;
            }
            overflow_entries += length.saturating_sub(1);
            longest_probe = longest_probe.max(length);
        }

        crate::DebugStats {
            populated: self.len(),
            capacity: self.capacity(),
            load_factor: crate::DebugStats::load_factor_of(self.len(), self.capacity()),
            overflow_entries,
            tombstones: 0,
            longest_probe,
            migration: None,
        }
    }
}

impl<K, V, S> ChainingTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty table with 16 heads and the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates an empty table that can hold at least `capacity` elements
    /// before its first resize.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let heads = capacity
            .checked_mul(4)
            .expect("capacity overflow")
            .div_ceil(3)
            .next_power_of_two()
            .max(INITIAL_HEADS);
        Self {
            heads: vec![NIL; heads],
            nodes: Vec::new(),
            hash_builder,
        }
    }

    /// Inserts a key-value pair into the table.
    ///
    /// Returns the previous value if the key was present, in which case the
    /// value is updated in place and the length does not change.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = hash32(&self.hash_builder, &key);
        if let Some((_, index)) = self.search(hash, &key) {
            return Some(core::mem::replace(&mut self.nodes[index].value, value));
        }

        let index = u32::try_from(self.nodes.len())
            .ok()
            .filter(|&index| index != NIL)
            .expect("capacity overflow");
        let head = self.head_index(hash);
        self.nodes.push(Node {
            hash,
            next: self.heads[head],
            key,
            value,
        });
        self.heads[head] = index;

        if over_load_factor(self.nodes.len(), self.heads.len()) {
            self.resize_rehash();
        }
        None
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = hash32(&self.hash_builder, key);
        self.search(hash, key)
            .map(|(_, index)| &self.nodes[index].value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = hash32(&self.hash_builder, key);
        self.search(hash, key)
            .map(|(_, index)| &mut self.nodes[index].value)
    }

    /// Returns `true` if the table contains a value for the key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes a key from the table, returning its value if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = hash32(&self.hash_builder, key);
        let (link, index) = self.search(hash, key)?;
        self.set_link(link, self.nodes[index].next);

        let last = self.nodes.len() - 1;
        let removed = self.nodes.swap_remove(index);
        if index != last {
            let moved_hash = self.nodes[index].hash;
            self.relink(moved_hash, last as u32, index as u32);
        }

        Some(removed.value)
    }
}

impl<K, V, S> ChainingTable<K, V, S>
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

impl<K, V, S> Default for ChainingTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Table<K, V> for ChainingTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        ChainingTable::insert(self, key, value)
    }

    fn get(&self, key: &K) -> Option<&V> {
        ChainingTable::get(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        ChainingTable::remove(self, key)
    }

    fn len(&self) -> usize {
        ChainingTable::len(self)
    }

    fn clear(&mut self) {
        ChainingTable::clear(self)
    }
}

/// An iterator over the entries of a [`ChainingTable`].
pub struct Iter<'a, K, V> {
    inner: core::slice::Iter<'a, Node<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|node| (&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
