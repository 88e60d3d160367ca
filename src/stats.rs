/// Debug statistics for hash table analysis.
///
/// Available under `cfg(test)` or with the `stats` feature. Every engine
/// fills in the fields that make sense for its layout and leaves the rest at
/// zero/`None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Total number of addressable slots (chain heads, bucket slots or group
    /// slots)
    pub capacity: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Entries stored outside their home slot: chain nodes past the head for
    /// the baseline table, overflow buckets for the incremental table, and
    /// entries displaced out of their home group for the grouped table
    pub overflow_entries: usize,
    /// Slots marked deleted and not yet reclaimed by a regrow
    pub tombstones: usize,
    /// Longest chain (in nodes or buckets) or probe sequence (in groups)
    pub longest_probe: usize,
    /// `(cursor, old_buckets)` while an incremental migration is in progress
    pub migration: Option<(usize, usize)>,
}

impl DebugStats {
    pub(crate) fn load_factor_of(populated: usize, capacity: usize) -> f64 {
        if capacity == 0 {
            0.0
        } else {
            populated as f64 / capacity as f64
        }
    }

    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!("Overflow: {} entries", self.overflow_entries);
        println!("Tombstones: {}", self.tombstones);
        println!("Longest probe: {}", self.longest_probe);
        match self.migration {
            Some((cursor, old_buckets)) => {
                println!("Migration: {}/{} old buckets evacuated", cursor, old_buckets)
            }
            None => println!("Migration: idle"),
        }
    }
}
