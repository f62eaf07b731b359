//! Criterion benchmarks for AllocBench hot paths.
//!
//! Benchmarks:
//! 1. Monte Carlo simulation (the dominant system cost, per universe size)
//! 2. The three allocation strategies over a pre-simulated universe

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashMap;

use allocbench_core::{
    simulate_universe, AllocationLimits, GreedyConfig, KnapsackConfig, PriceSeries, StockMetrics,
    StockUniverse, SimulationConfig, Strategy,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(symbol: &str, n: usize) -> PriceSeries {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let mut price = 100.0;
    let mut closes = Vec::with_capacity(n);
    for i in 0..n {
        price *= 1.0 + 0.0003 + 0.012 * ((i as f64) * 0.37).sin();
        closes.push(price);
    }
    let dates = (0..n)
        .map(|i| base_date + chrono::Duration::days(i as i64))
        .collect();
    PriceSeries::new(symbol, dates, closes)
}

fn make_universe(n_stocks: usize) -> StockUniverse {
    let symbols: Vec<String> = (0..n_stocks).map(|i| format!("S{i:03}")).collect();
    let metrics: HashMap<String, StockMetrics> = symbols
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mean = 0.02 + 0.002 * i as f64;
            (
                s.clone(),
                StockMetrics {
                    mean_annual_return: mean,
                    median_annual_return: mean,
                    std_annual_return: 0.15 + 0.001 * i as f64,
                    var_5: mean - 0.3,
                    var_95: mean + 0.3,
                    simulated_annual_returns: vec![],
                },
            )
        })
        .collect();
    StockUniverse { symbols, metrics }
}

// ── 1. Simulation engine ─────────────────────────────────────────────

fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate_universe");
    for n_stocks in [5usize, 20] {
        let series: Vec<PriceSeries> = (0..n_stocks)
            .map(|i| make_series(&format!("S{i:03}"), 500))
            .collect();
        let config = SimulationConfig {
            num_simulations: 1_000,
            trading_days_per_year: 252,
            risk_free_rate: 0.0,
            seed: Some(42),
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(n_stocks),
            &series,
            |b, series| {
                b.iter(|| simulate_universe(black_box(series), black_box(&config)).unwrap())
            },
        );
    }
    group.finish();
}

// ── 2. Allocation strategies ─────────────────────────────────────────

fn bench_strategies(c: &mut Criterion) {
    let universe = make_universe(50);
    let limits = AllocationLimits {
        min_weight: 0.005,
        max_weight: 0.10,
        risk_free_rate: 0.0,
    };
    let strategies = [
        Strategy::EqualWeight,
        Strategy::GreedyRatio(GreedyConfig::default()),
        Strategy::DpKnapsack(KnapsackConfig {
            capacity_steps: 1000,
            candidates_per_stock: 8,
        }),
    ];

    let mut group = c.benchmark_group("allocate");
    for strategy in &strategies {
        group.bench_with_input(
            BenchmarkId::from_parameter(strategy.name()),
            strategy,
            |b, strategy| {
                b.iter(|| {
                    strategy
                        .allocate(black_box(&universe), black_box(&limits))
                        .unwrap()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_simulation, bench_strategies);
criterion_main!(benches);
