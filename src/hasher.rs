use core::hash::BuildHasher;
use core::hash::Hash;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hash builder used when a table is created with `new()` or
        /// `with_capacity()`.
        ///
        /// This is `foldhash::fast::RandomState` when the `foldhash` feature is
        /// enabled.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hash builder used when a table is created with `new()` or
        /// `with_capacity()`.
        ///
        /// This is `std::hash::RandomState` when `foldhash` is disabled.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Stand-in default hash builder when neither `foldhash` nor `std` is
        /// enabled.
        ///
        /// It is uninhabited and does not implement `Default`, so `new()` is
        /// unavailable; construct tables with `with_hasher` instead.
        pub type DefaultHashBuilder = NoDefaultHasher;
    }
}

/// An uninhabited hash builder, used as the default type parameter when no
/// hashing backend is compiled in.
#[derive(Debug, Clone, Copy)]
pub enum NoDefaultHasher {}

impl core::hash::Hasher for NoDefaultHasher {
    fn finish(&self) -> u64 {
        match *self {}
    }

    fn write(&mut self, _bytes: &[u8]) {
        match *self {}
    }
}

impl BuildHasher for NoDefaultHasher {
    type Hasher = NoDefaultHasher;

    fn build_hasher(&self) -> Self::Hasher {
        match *self {}
    }
}

/// Full 64-bit hash of `key`, as used by the grouped open-addressing table.
#[inline(always)]
pub(crate) fn hash64<K: Hash + ?Sized, S: BuildHasher>(builder: &S, key: &K) -> u64 {
    builder.hash_one(key)
}

/// 32-bit hash of `key`, as used by the chaining tables.
///
/// The high half is folded into the low half so both the bucket index (low
/// bits) and the cached top hash (high bits) see all 64 bits of entropy.
#[inline(always)]
pub(crate) fn hash32<K: Hash + ?Sized, S: BuildHasher>(builder: &S, key: &K) -> u32 {
    let hash = builder.hash_one(key);
    (hash ^ (hash >> 32)) as u32
}
