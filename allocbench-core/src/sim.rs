//! Monte Carlo simulation engine.
//!
//! For each stock: estimate (μ, σ) of daily returns, draw one trading year
//! of independent normal samples, compound them multiplicatively into an
//! annual return, and repeat `num_simulations` times. The resulting
//! distribution is summarized into `StockMetrics`.
//!
//! Cost is O(num_simulations × trading_days_per_year) per stock — the
//! dominant cost of the whole system — so stocks are simulated in parallel
//! via rayon. Sub-seeds are derived per symbol with BLAKE3, making the
//! merged output identical regardless of thread scheduling.

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PriceSeries, StockMetrics, StockUniverse};
use crate::rng::SeedHierarchy;
use crate::stats::{self, EstimateError};

/// Parameters for one simulation run.
///
/// With `seed: Some(s)` the output is bit-reproducible for identical
/// inputs; with `None` a master seed is drawn from entropy and results are
/// only distributionally stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_num_simulations")]
    pub num_simulations: usize,
    #[serde(default = "default_trading_days")]
    pub trading_days_per_year: usize,
    #[serde(default)]
    pub risk_free_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_num_simulations() -> usize {
    10_000
}

fn default_trading_days() -> usize {
    252
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_simulations: default_num_simulations(),
            trading_days_per_year: default_trading_days(),
            risk_free_rate: 0.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.num_simulations == 0 {
            return Err(SimError::InvalidParameter {
                name: "num_simulations",
                value: self.num_simulations as i64,
            });
        }
        if self.trading_days_per_year == 0 {
            return Err(SimError::InvalidParameter {
                name: "trading_days_per_year",
                value: self.trading_days_per_year as i64,
            });
        }
        Ok(())
    }
}

/// Errors from the simulation engine.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid parameter {name} = {value}, must be positive")]
    InvalidParameter { name: &'static str, value: i64 },
    #[error("daily-return statistics for '{symbol}' are not finite")]
    NonFiniteStatistics { symbol: String },
    #[error(transparent)]
    Estimate(#[from] EstimateError),
}

/// Simulate one stock with an explicit RNG.
///
/// The caller owns seed policy; `simulate_universe` derives one RNG per
/// symbol so this stays deterministic under parallel execution.
pub fn simulate_series(
    series: &PriceSeries,
    config: &SimulationConfig,
    rng: &mut StdRng,
) -> Result<StockMetrics, SimError> {
    config.validate()?;

    let returns = stats::daily_returns(series)?;
    let mu = stats::mean(&returns);
    let sigma = stats::std_dev(&returns);
    let normal = Normal::new(mu, sigma).map_err(|_| SimError::NonFiniteStatistics {
        symbol: series.symbol.clone(),
    })?;

    let mut annual_returns = Vec::with_capacity(config.num_simulations);
    for _ in 0..config.num_simulations {
        let mut growth = 1.0;
        for _ in 0..config.trading_days_per_year {
            growth *= 1.0 + normal.sample(rng);
        }
        annual_returns.push(growth - 1.0);
    }

    Ok(summarize(annual_returns))
}

/// Simulate every series and assemble the universe.
///
/// Input order becomes the universe's canonical symbol order. Stocks run in
/// parallel; results are keyed by symbol, so completion order is irrelevant.
pub fn simulate_universe(
    series: &[PriceSeries],
    config: &SimulationConfig,
) -> Result<StockUniverse, SimError> {
    config.validate()?;

    let master_seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let seeds = SeedHierarchy::new(master_seed);

    let metrics = series
        .par_iter()
        .map(|s| {
            let mut rng = seeds.rng_for(&s.symbol);
            simulate_series(s, config, &mut rng).map(|m| (s.symbol.clone(), m))
        })
        .collect::<Result<_, SimError>>()?;

    Ok(StockUniverse {
        symbols: series.iter().map(|s| s.symbol.clone()).collect(),
        metrics,
    })
}

/// Collapse a sample of annual returns into `StockMetrics`.
fn summarize(annual_returns: Vec<f64>) -> StockMetrics {
    let mean = stats::mean(&annual_returns);
    let std = stats::std_dev(&annual_returns);

    let mut sorted = annual_returns.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = percentile_sorted(&sorted, 50.0);
    let var_5 = percentile_sorted(&sorted, 5.0);
    let var_95 = percentile_sorted(&sorted, 95.0);

    StockMetrics {
        mean_annual_return: mean,
        median_annual_return: median,
        std_annual_return: std,
        var_5,
        var_95,
        simulated_annual_returns: annual_returns,
    }
}

/// Percentile of a sorted slice using linear interpolation.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}
