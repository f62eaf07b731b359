//! Benchmark harness — times each strategy and aggregates solution quality.
//!
//! Per run: start a timer, invoke the strategy, stop the timer, then
//! compute the portfolio summary against the same universe (outside the
//! timed window). Strategies are stateless values, so repeated runs share
//! no mutable state; the three strategies execute sequentially so timing
//! windows never contend for a core.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use allocbench_core::{AllocError, AllocationLimits, PortfolioSummary, StockUniverse, Strategy};

/// Errors from the harness.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("benchmark requires num_runs >= 1")]
    NoRuns,
    #[error("strategy '{strategy}' failed on run {run}: {source}")]
    StrategyFailed {
        strategy: &'static str,
        run: usize,
        #[source]
        source: AllocError,
    },
}

/// One timed strategy invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub algorithm: String,
    pub run: usize,
    pub execution_time_ms: f64,
    pub portfolio_return: f64,
    pub portfolio_std: f64,
    pub portfolio_sharpe: f64,
    pub num_stocks: usize,
}

/// Per-algorithm aggregate over its runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStats {
    pub algorithm: String,
    pub mean_time_ms: f64,
    pub std_time_ms: f64,
    pub mean_sharpe: f64,
    pub mean_return: f64,
}

/// All records from one benchmark session plus ranking views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub records: Vec<BenchmarkRecord>,
}

/// Run one strategy `num_runs` times against a shared read-only universe.
pub fn run_strategy(
    strategy: &Strategy,
    universe: &StockUniverse,
    limits: &AllocationLimits,
    num_runs: usize,
) -> Result<Vec<BenchmarkRecord>, BenchError> {
    if num_runs == 0 {
        return Err(BenchError::NoRuns);
    }

    let mut records = Vec::with_capacity(num_runs);
    for run in 0..num_runs {
        let start = Instant::now();
        let allocation = strategy
            .allocate(universe, limits)
            .map_err(|source| BenchError::StrategyFailed {
                strategy: strategy.name(),
                run,
                source,
            })?;
        let execution_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        let summary = PortfolioSummary::compute(&allocation, universe, limits.risk_free_rate);
        records.push(BenchmarkRecord {
            algorithm: strategy.name().to_string(),
            run,
            execution_time_ms,
            portfolio_return: summary.expected_return,
            portfolio_std: summary.std_dev,
            portfolio_sharpe: summary.sharpe_ratio,
            num_stocks: allocation.num_stocks(),
        });
    }
    Ok(records)
}

/// Benchmark every strategy sequentially and collect one report.
pub fn benchmark_all(
    strategies: &[Strategy],
    universe: &StockUniverse,
    limits: &AllocationLimits,
    num_runs: usize,
) -> Result<BenchmarkReport, BenchError> {
    let mut records = Vec::with_capacity(strategies.len() * num_runs);
    for strategy in strategies {
        records.extend(run_strategy(strategy, universe, limits, num_runs)?);
    }
    Ok(BenchmarkReport { records })
}

impl BenchmarkReport {
    /// Aggregate stats per algorithm, in first-seen record order.
    pub fn algorithm_stats(&self) -> Vec<AlgorithmStats> {
        let mut order: Vec<&str> = Vec::new();
        for r in &self.records {
            if !order.contains(&r.algorithm.as_str()) {
                order.push(&r.algorithm);
            }
        }
        order
            .into_iter()
            .map(|name| {
                let times: Vec<f64> = self
                    .records
                    .iter()
                    .filter(|r| r.algorithm == name)
                    .map(|r| r.execution_time_ms)
                    .collect();
                let sharpes: Vec<f64> = self
                    .records
                    .iter()
                    .filter(|r| r.algorithm == name)
                    .map(|r| r.portfolio_sharpe)
                    .collect();
                let returns: Vec<f64> = self
                    .records
                    .iter()
                    .filter(|r| r.algorithm == name)
                    .map(|r| r.portfolio_return)
                    .collect();
                AlgorithmStats {
                    algorithm: name.to_string(),
                    mean_time_ms: mean(&times),
                    std_time_ms: std_dev(&times),
                    mean_sharpe: mean(&sharpes),
                    mean_return: mean(&returns),
                }
            })
            .collect()
    }

    /// Algorithm names by mean execution time, fastest first.
    pub fn speed_ranking(&self) -> Vec<String> {
        let mut stats = self.algorithm_stats();
        stats.sort_by(|a, b| {
            a.mean_time_ms
                .partial_cmp(&b.mean_time_ms)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        stats.into_iter().map(|s| s.algorithm).collect()
    }

    /// Algorithm names by mean portfolio Sharpe, best first.
    pub fn quality_ranking(&self) -> Vec<String> {
        let mut stats = self.algorithm_stats();
        stats.sort_by(|a, b| {
            b.mean_sharpe
                .partial_cmp(&a.mean_sharpe)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        stats.into_iter().map(|s| s.algorithm).collect()
    }

    /// Sharpe gained per extra millisecond spent, comparing algorithm `a`
    /// against algorithm `b`.
    ///
    /// Positive means `a` buys quality with its extra time. `None` when
    /// either algorithm is missing or the time delta is too small to carry
    /// a meaningful ratio.
    pub fn quality_per_ms(&self, a: &str, b: &str) -> Option<f64> {
        let stats = self.algorithm_stats();
        let sa = stats.iter().find(|s| s.algorithm == a)?;
        let sb = stats.iter().find(|s| s.algorithm == b)?;
        let dt = sa.mean_time_ms - sb.mean_time_ms;
        if dt.abs() < 1e-9 {
            return None;
        }
        Some((sa.mean_sharpe - sb.mean_sharpe) / dt)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (n - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocbench_core::StockMetrics;
    use std::collections::HashMap;

    fn universe(entries: &[(&str, f64, f64)]) -> StockUniverse {
        StockUniverse {
            symbols: entries.iter().map(|(s, _, _)| s.to_string()).collect(),
            metrics: entries
                .iter()
                .map(|(s, mean, std)| {
                    (
                        s.to_string(),
                        StockMetrics {
                            mean_annual_return: *mean,
                            median_annual_return: *mean,
                            std_annual_return: *std,
                            var_5: mean - 2.0 * std,
                            var_95: mean + 2.0 * std,
                            simulated_annual_returns: vec![],
                        },
                    )
                })
                .collect(),
        }
    }

    fn limits() -> AllocationLimits {
        AllocationLimits {
            min_weight: 0.05,
            max_weight: 0.60,
            risk_free_rate: 0.0,
        }
    }

    #[test]
    fn deterministic_strategy_repeats_identically() {
        let u = universe(&[("A", 0.10, 0.2), ("B", 0.20, 0.25), ("C", 0.05, 0.15)]);
        let records = run_strategy(&Strategy::EqualWeight, &u, &limits(), 5).unwrap();
        assert_eq!(records.len(), 5);
        let first = &records[0];
        for r in &records {
            assert!(r.execution_time_ms >= 0.0);
            assert_eq!(r.portfolio_return, first.portfolio_return);
            assert_eq!(r.portfolio_std, first.portfolio_std);
            assert_eq!(r.portfolio_sharpe, first.portfolio_sharpe);
            assert_eq!(r.num_stocks, 3);
        }
    }

    #[test]
    fn zero_runs_rejected() {
        let u = universe(&[("A", 0.10, 0.2)]);
        assert!(matches!(
            run_strategy(&Strategy::EqualWeight, &u, &limits(), 0),
            Err(BenchError::NoRuns)
        ));
    }

    #[test]
    fn strategy_failure_carries_context() {
        let u = universe(&[]);
        let err = run_strategy(&Strategy::EqualWeight, &u, &limits(), 2).unwrap_err();
        match err {
            BenchError::StrategyFailed { strategy, run, .. } => {
                assert_eq!(strategy, "equal_weight");
                assert_eq!(run, 0);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    fn fixed_record(algorithm: &str, run: usize, time: f64, sharpe: f64) -> BenchmarkRecord {
        BenchmarkRecord {
            algorithm: algorithm.to_string(),
            run,
            execution_time_ms: time,
            portfolio_return: 0.1,
            portfolio_std: 0.2,
            portfolio_sharpe: sharpe,
            num_stocks: 3,
        }
    }

    #[test]
    fn rankings_sort_as_specified() {
        let report = BenchmarkReport {
            records: vec![
                fixed_record("slow_good", 0, 100.0, 1.5),
                fixed_record("slow_good", 1, 110.0, 1.5),
                fixed_record("fast_poor", 0, 1.0, 0.5),
                fixed_record("fast_poor", 1, 1.2, 0.5),
            ],
        };
        assert_eq!(report.speed_ranking(), vec!["fast_poor", "slow_good"]);
        assert_eq!(report.quality_ranking(), vec!["slow_good", "fast_poor"]);
    }

    #[test]
    fn quality_per_ms_trade_off() {
        let report = BenchmarkReport {
            records: vec![
                fixed_record("slow_good", 0, 101.0, 1.5),
                fixed_record("fast_poor", 0, 1.0, 0.5),
            ],
        };
        let q = report.quality_per_ms("slow_good", "fast_poor").unwrap();
        assert!((q - 0.01).abs() < 1e-9);
        assert!(report.quality_per_ms("slow_good", "missing").is_none());
    }

    #[test]
    fn quality_per_ms_identical_times_is_none() {
        let report = BenchmarkReport {
            records: vec![
                fixed_record("a", 0, 5.0, 1.0),
                fixed_record("b", 0, 5.0, 2.0),
            ],
        };
        assert!(report.quality_per_ms("a", "b").is_none());
    }

    #[test]
    fn benchmark_all_covers_every_strategy() {
        let u = universe(&[("A", 0.10, 0.2), ("B", 0.20, 0.25), ("C", 0.05, 0.15)]);
        let strategies = [
            Strategy::EqualWeight,
            Strategy::GreedyRatio(Default::default()),
        ];
        let report = benchmark_all(&strategies, &u, &limits(), 3).unwrap();
        assert_eq!(report.records.len(), 6);
        let stats = report.algorithm_stats();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].algorithm, "equal_weight");
        assert_eq!(stats[1].algorithm, "greedy_ratio");
    }
}
