//! Session orchestration — wires loader, cache, simulation, and harness.
//!
//! Entry points:
//! - `simulate_from_config()`: load CSV + simulate (through the cache).
//!   Used by the CLI `simulate` and `allocate` commands.
//! - `run_bench_session()`: the full pipeline ending in a
//!   `BenchmarkReport`. Used by the CLI `bench` command.

use thiserror::Error;

use allocbench_core::{simulate_universe, SimError, StockUniverse, Strategy};

use crate::bench::{benchmark_all, BenchError, BenchmarkReport};
use crate::cache::MetricsCache;
use crate::config::BenchConfig;
use crate::data_loader::{load_price_table, LoadError, PriceTable};
use crate::profiling::ProfileScope;

/// Errors from the session runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("simulation error: {0}")]
    Sim(#[from] SimError),
    #[error("benchmark error: {0}")]
    Bench(#[from] BenchError),
}

/// A simulated dataset ready for allocation.
#[derive(Debug)]
pub struct SimulatedData {
    pub universe: StockUniverse,
    pub dataset_hash: String,
    /// Whether the universe came out of the cache rather than a fresh run.
    pub from_cache: bool,
}

/// Full result of a benchmark session.
#[derive(Debug)]
pub struct SessionResult {
    pub universe: StockUniverse,
    pub dataset_hash: String,
    pub report: BenchmarkReport,
}

/// Load the configured CSV and simulate its universe, consulting `cache`
/// when one is supplied and the run is seeded.
pub fn simulate_from_config(
    config: &BenchConfig,
    cache: Option<&MetricsCache>,
) -> Result<SimulatedData, RunError> {
    let table = {
        let _scope = ProfileScope::new("load_price_table");
        load_price_table(&config.data.csv_path)?
    };
    simulate_table(&table, config, cache)
}

/// Simulate a pre-loaded table (no file I/O).
pub fn simulate_table(
    table: &PriceTable,
    config: &BenchConfig,
    cache: Option<&MetricsCache>,
) -> Result<SimulatedData, RunError> {
    let key = MetricsCache::key(&table.dataset_hash, &config.simulation);
    let usable_cache = cache.filter(|_| MetricsCache::cacheable(&config.simulation));

    if let Some(cache) = usable_cache {
        if let Some(universe) = cache.get(&key) {
            return Ok(SimulatedData {
                universe,
                dataset_hash: table.dataset_hash.clone(),
                from_cache: true,
            });
        }
    }

    let universe = {
        let _scope = ProfileScope::new("simulate_universe");
        simulate_universe(&table.series, &config.simulation)?
    };

    if let Some(cache) = usable_cache {
        // Cache failures are not session failures; the result is still good.
        let _ = cache.put(&key, &universe);
    }

    Ok(SimulatedData {
        universe,
        dataset_hash: table.dataset_hash.clone(),
        from_cache: false,
    })
}

/// The three competing strategies as configured.
pub fn strategies_from_config(config: &BenchConfig) -> Vec<Strategy> {
    vec![
        Strategy::EqualWeight,
        Strategy::GreedyRatio(config.allocation.greedy),
        Strategy::DpKnapsack(config.allocation.knapsack),
    ]
}

/// Run the whole pipeline: load, simulate (through `cache`), benchmark.
pub fn run_bench_session(
    config: &BenchConfig,
    cache: Option<&MetricsCache>,
) -> Result<SessionResult, RunError> {
    let data = simulate_from_config(config, cache)?;
    let strategies = strategies_from_config(config);
    let report = benchmark_all(
        &strategies,
        &data.universe,
        &config.allocation.limits,
        config.benchmark.num_runs,
    )?;
    Ok(SessionResult {
        universe: data.universe,
        dataset_hash: data.dataset_hash,
        report,
    })
}
