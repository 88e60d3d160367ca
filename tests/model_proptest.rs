use std::collections::HashMap;

use probe_hash::ChainingTable;
use probe_hash::GroupedOpenAddressTable;
use probe_hash::IncrementalChainingTable;
use probe_hash::Table;
use proptest::prelude::*;

const KEY_SPACE: u16 = 512;

#[derive(Debug, Clone)]
enum Op {
    Insert(u16, u32),
    Get(u16),
    Remove(u16),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0..KEY_SPACE, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        3 => (0..KEY_SPACE).prop_map(Op::Get),
        3 => (0..KEY_SPACE).prop_map(Op::Remove),
        1 => Just(Op::Clear),
    ]
}

/// Replays `ops` against `table` and `std`'s `HashMap`, comparing every
/// result, then compares the full key space.
fn check_against_model(table: &mut dyn Table<u16, u32>, ops: &[Op]) -> Result<(), TestCaseError> {
    let mut model = HashMap::new();

    for op in ops {
        match *op {
            Op::Insert(k, v) => {
                prop_assert_eq!(table.insert(k, v), model.insert(k, v));
            }
            Op::Get(k) => {
                prop_assert_eq!(table.get(&k), model.get(&k));
            }
            Op::Remove(k) => {
                prop_assert_eq!(table.remove(&k), model.remove(&k));
            }
            Op::Clear => {
                table.clear();
                model.clear();
            }
        }
        prop_assert_eq!(table.len(), model.len());
        prop_assert_eq!(table.is_empty(), model.is_empty());
    }

    for k in 0..KEY_SPACE {
        prop_assert_eq!(table.get(&k), model.get(&k));
    }
    Ok(())
}

proptest! {
    #[test]
    fn chaining_matches_model(ops in proptest::collection::vec(op_strategy(), 1..600)) {
        check_against_model(&mut ChainingTable::<u16, u32>::new(), &ops)?;
    }

    #[test]
    fn incremental_matches_model(ops in proptest::collection::vec(op_strategy(), 1..600)) {
        check_against_model(&mut IncrementalChainingTable::<u16, u32>::new(), &ops)?;
    }

    #[test]
    fn grouped_matches_model(ops in proptest::collection::vec(op_strategy(), 1..600)) {
        check_against_model(&mut GroupedOpenAddressTable::<u16, u32>::new(), &ops)?;
    }

    // Operations issued while a migration is underway, starting from a table
    // that has just crossed its load threshold.
    #[test]
    fn incremental_mid_migration_matches_model(
        prefill in 13usize..200,
        ops in proptest::collection::vec(op_strategy(), 1..200),
    ) {
        let mut table = IncrementalChainingTable::<u16, u32>::new();
        let mut model = HashMap::new();
        for k in 0..prefill as u16 {
            table.insert(k, u32::from(k));
            model.insert(k, u32::from(k));
        }

        for op in &ops {
            match *op {
                Op::Insert(k, v) => prop_assert_eq!(table.insert(k, v), model.insert(k, v)),
                Op::Get(k) => prop_assert_eq!(table.get(&k), model.get(&k)),
                Op::Remove(k) => prop_assert_eq!(table.remove(&k), model.remove(&k)),
                Op::Clear => {
                    table.clear();
                    model.clear();
                    prop_assert!(!table.is_resizing());
                }
            }
            prop_assert_eq!(table.len(), model.len());
            prop_assert_eq!(table.iter().count(), model.len());
        }

        let mut entries = table.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>();
        entries.sort();
        let mut expected = model.into_iter().collect::<Vec<_>>();
        expected.sort();
        prop_assert_eq!(entries, expected);
    }
}
