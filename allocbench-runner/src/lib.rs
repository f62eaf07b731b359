//! AllocBench Runner — orchestration around the core engine.
//!
//! This crate builds on `allocbench-core` to provide:
//! - Wide-CSV price table loading with dataset hashing
//! - TOML-backed configuration
//! - A metrics cache memoizing simulated universes
//! - The benchmark harness: timing, rankings, trade-off metrics
//! - Text reporting and CSV/JSON export of the record table

pub mod bench;
pub mod cache;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod profiling;
pub mod report;
pub mod runner;

pub use bench::{
    benchmark_all, run_strategy, AlgorithmStats, BenchError, BenchmarkRecord, BenchmarkReport,
};
pub use cache::MetricsCache;
pub use config::{AllocationConfig, BenchConfig, BenchmarkConfig, ConfigError, DataConfig};
pub use data_loader::{load_price_table, LoadError, PriceTable};
pub use export::{
    export_records_csv, export_records_json, import_records_json, BenchmarkArtifact,
    SCHEMA_VERSION,
};
pub use runner::{
    run_bench_session, simulate_from_config, simulate_table, strategies_from_config, RunError,
    SessionResult, SimulatedData,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<BenchmarkRecord>();
        assert_sync::<BenchmarkRecord>();
        assert_send::<BenchmarkReport>();
        assert_sync::<BenchmarkReport>();
        assert_send::<AlgorithmStats>();
        assert_sync::<AlgorithmStats>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BenchConfig>();
        assert_sync::<BenchConfig>();
        assert_send::<PriceTable>();
        assert_sync::<PriceTable>();
    }
}
