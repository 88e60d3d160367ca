use clap::Parser;
use clap::ValueEnum;
use probe_hash::ChainingTable;
use probe_hash::DebugStats;
use probe_hash::GroupedOpenAddressTable;
use probe_hash::IncrementalChainingTable;
use probe_hash::Table;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Engine {
    Chaining,
    Incremental,
    Grouped,
    All,
}

#[derive(Parser, Debug)]
struct Args {
    /// Table engine to fill.
    #[arg(short, long, value_enum, default_value_t = Engine::All)]
    engine: Engine,

    /// Number of distinct `key-i` keys inserted.
    #[arg(short, long, default_value_t = 1000)]
    count: usize,

    /// Random remove/re-insert pairs applied after filling.
    #[arg(long, default_value_t = 0)]
    churn: usize,
}

fn fill<T: Table<String, u64>>(table: &mut T, args: &Args) {
    for i in 0..args.count {
        table.insert(format!("key-{i}"), i as u64);
    }

    let mut rng = SmallRng::from_os_rng();
    let mut removed = 0;
    for _ in 0..args.churn {
        let victim = format!("key-{}", rng.random_range(0..args.count.max(1)));
        if table.remove(&victim).is_some() {
            removed += 1;
        }
        let fresh = rng.random_range(0..args.count.max(1) * 2);
        table.insert(format!("key-{fresh}"), fresh as u64);
    }

    println!("Inserted {} keys, churned {} removals", args.count, removed);
    println!("Final size: {}", table.len());
}

fn report(name: &str, stats: DebugStats) {
    println!();
    println!("--- {name} ---");
    stats.print();
}

fn main() {
    let args = Args::parse();

    if matches!(args.engine, Engine::Chaining | Engine::All) {
        let mut table = ChainingTable::<String, u64>::new();
        fill(&mut table, &args);
        report("chaining", table.debug_stats());
    }

    if matches!(args.engine, Engine::Incremental | Engine::All) {
        let mut table = IncrementalChainingTable::<String, u64>::new();
        fill(&mut table, &args);
        if table.is_resizing() {
            println!("Migration still in progress");
        }
        report("incremental", table.debug_stats());
    }

    if matches!(args.engine, Engine::Grouped | Engine::All) {
        let mut table = GroupedOpenAddressTable::<String, u64>::new();
        fill(&mut table, &args);
        report("grouped", table.debug_stats());
    }
}
