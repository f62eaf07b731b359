//! Domain types shared across the estimator, simulation engine, and
//! allocation strategies.
//!
//! Everything here is produced once and read many times: a `PriceSeries` is
//! loaded once per dataset, a `StockUniverse` is computed once per simulation
//! run, and the strategies only ever borrow it. Nothing downstream mutates an
//! upstream structure.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::stats;

/// Chronological closing prices for one stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
}

impl PriceSeries {
    /// Build a series from parallel date/close vectors.
    ///
    /// Panics if the vectors disagree in length — that is a loader bug, not
    /// a data condition.
    pub fn new(symbol: impl Into<String>, dates: Vec<NaiveDate>, closes: Vec<f64>) -> Self {
        assert_eq!(
            dates.len(),
            closes.len(),
            "date and close columns must be the same length"
        );
        Self {
            symbol: symbol.into(),
            dates,
            closes,
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// Per-stock distribution summary produced by the simulation engine.
///
/// `simulated_annual_returns` holds the full sample (one entry per
/// simulation path) so downstream consumers can re-derive any percentile
/// without re-running the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMetrics {
    pub mean_annual_return: f64,
    pub median_annual_return: f64,
    pub std_annual_return: f64,
    /// 5th percentile of simulated annual returns (downside VaR bound).
    pub var_5: f64,
    /// 95th percentile of simulated annual returns.
    pub var_95: f64,
    pub simulated_annual_returns: Vec<f64>,
}

/// Simulated metrics for every stock in a dataset.
///
/// `symbols` preserves the CSV column order and is the canonical iteration
/// and tie-break order everywhere; `metrics` is keyed by symbol. The
/// universe is read-only shared state once built: strategies take `&self`
/// and may run concurrently against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockUniverse {
    pub symbols: Vec<String>,
    pub metrics: HashMap<String, StockMetrics>,
}

impl StockUniverse {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn metrics_for(&self, symbol: &str) -> Option<&StockMetrics> {
        self.metrics.get(symbol)
    }

    /// Iterate (symbol, metrics) in canonical universe order.
    pub fn iter_ordered(&self) -> impl Iterator<Item = (&str, &StockMetrics)> {
        self.symbols
            .iter()
            .filter_map(|s| self.metrics.get(s).map(|m| (s.as_str(), m)))
    }
}

/// A portfolio weighting: fraction of capital per symbol.
///
/// Weights are non-negative and sum to 1.0 within floating tolerance.
/// Created fresh by every strategy invocation and never mutated after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationResult {
    pub weights: HashMap<String, f64>,
}

impl AllocationResult {
    pub fn num_stocks(&self) -> usize {
        self.weights.len()
    }

    pub fn weight(&self, symbol: &str) -> f64 {
        self.weights.get(symbol).copied().unwrap_or(0.0)
    }

    /// Iterate (symbol, weight) in the universe's canonical order, skipping
    /// symbols this allocation did not select.
    pub fn iter_ordered<'a>(
        &'a self,
        universe: &'a StockUniverse,
    ) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        universe
            .symbols
            .iter()
            .filter_map(|s| self.weights.get(s).map(|w| (s.as_str(), *w)))
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }
}

/// Portfolio-level metrics derived from an allocation and the universe it
/// was computed against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Weighted mean of per-stock expected annual returns.
    pub expected_return: f64,
    /// sqrt(Σ wᵢ²σᵢ²). Inter-stock correlation is ignored.
    pub std_dev: f64,
    pub sharpe_ratio: f64,
}

impl PortfolioSummary {
    /// Compute the summary for `allocation` against `universe`.
    ///
    /// Symbols in the allocation that are missing from the universe
    /// contribute nothing; strategies never produce them.
    pub fn compute(
        allocation: &AllocationResult,
        universe: &StockUniverse,
        risk_free_rate: f64,
    ) -> Self {
        let mut expected_return = 0.0;
        let mut variance = 0.0;
        for (symbol, weight) in &allocation.weights {
            if let Some(m) = universe.metrics_for(symbol) {
                expected_return += weight * m.mean_annual_return;
                variance += weight * weight * m.std_annual_return * m.std_annual_return;
            }
        }
        let std_dev = variance.max(0.0).sqrt();
        let sharpe_ratio = stats::sharpe_ratio(expected_return, std_dev, risk_free_rate);
        Self {
            expected_return,
            std_dev,
            sharpe_ratio,
        }
    }
}
