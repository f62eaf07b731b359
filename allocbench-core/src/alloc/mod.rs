//! Allocation strategies — three competing policies that turn a simulated
//! `StockUniverse` into a portfolio weighting.
//!
//! The set is closed by design: a `Strategy` is one of exactly three tagged
//! variants, and every variant implements the same capability — given a
//! read-only universe and a set of limits, produce a fresh
//! `AllocationResult`. Strategies carry no scratch state, so a single value
//! can be invoked repeatedly (or concurrently) without cross-run effects.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::{AllocationResult, StockUniverse};

pub mod equal_weight;
pub mod greedy;
pub mod knapsack;

pub use greedy::{GreedyConfig, WeightingRule};
pub use knapsack::KnapsackConfig;

/// Errors from the allocation strategies.
#[derive(Debug, Error)]
pub enum AllocError {
    #[error("universe has no eligible stocks")]
    EmptyUniverse,
    #[error("allocation bounds infeasible: {0}")]
    InvalidBounds(String),
    #[error("no allocation satisfies the per-stock bounds within capacity")]
    InfeasibleAllocation,
}

/// Per-stock weight bounds shared by every strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationLimits {
    /// Minimum weight a selected stock may receive.
    #[serde(default = "default_min_weight")]
    pub min_weight: f64,
    /// Maximum weight any stock may receive.
    #[serde(default = "default_max_weight")]
    pub max_weight: f64,
    /// Risk-free rate used for per-stock ratios and portfolio Sharpe.
    #[serde(default)]
    pub risk_free_rate: f64,
}

fn default_min_weight() -> f64 {
    0.005
}

fn default_max_weight() -> f64 {
    0.10
}

impl Default for AllocationLimits {
    fn default() -> Self {
        Self {
            min_weight: default_min_weight(),
            max_weight: default_max_weight(),
            risk_free_rate: 0.0,
        }
    }
}

impl AllocationLimits {
    pub fn validate(&self) -> Result<(), AllocError> {
        if !(0.0..1.0).contains(&self.min_weight) {
            return Err(AllocError::InvalidBounds(format!(
                "min_weight {} outside [0, 1)",
                self.min_weight
            )));
        }
        if self.max_weight <= 0.0 || self.max_weight > 1.0 {
            return Err(AllocError::InvalidBounds(format!(
                "max_weight {} outside (0, 1]",
                self.max_weight
            )));
        }
        if self.min_weight >= self.max_weight {
            return Err(AllocError::InvalidBounds(format!(
                "min_weight {} >= max_weight {}",
                self.min_weight, self.max_weight
            )));
        }
        Ok(())
    }
}

/// The closed set of allocation policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Strategy {
    /// 1/N across the whole universe.
    EqualWeight,
    /// Sort by risk-adjusted ratio, keep the top K, weight by a pluggable
    /// rule, clamp and renormalize.
    GreedyRatio(GreedyConfig),
    /// Bounded multi-choice knapsack over discretized capital units.
    DpKnapsack(KnapsackConfig),
}

impl Strategy {
    /// Stable identifier used in benchmark records and exports.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::EqualWeight => "equal_weight",
            Strategy::GreedyRatio(_) => "greedy_ratio",
            Strategy::DpKnapsack(_) => "dp_knapsack",
        }
    }

    /// Produce a fresh allocation for `universe` under `limits`.
    pub fn allocate(
        &self,
        universe: &StockUniverse,
        limits: &AllocationLimits,
    ) -> Result<AllocationResult, AllocError> {
        match self {
            Strategy::EqualWeight => equal_weight::allocate(universe),
            Strategy::GreedyRatio(config) => greedy::allocate(universe, limits, config),
            Strategy::DpKnapsack(config) => knapsack::allocate(universe, limits, config),
        }
    }
}

/// Scale `weights` so they sum to exactly 1.0.
///
/// Callers guarantee a strictly positive total; a zero-sum weighting is a
/// strategy failure upstream, never renormalized into existence here.
pub(crate) fn renormalize(weights: &mut HashMap<String, f64>) {
    let total: f64 = weights.values().sum();
    debug_assert!(total > 0.0, "renormalize requires a positive total");
    for w in weights.values_mut() {
        *w /= total;
    }
}

/// Per-stock Sharpe-like ratios in canonical universe order.
///
/// Returns `(symbol, ratio)` pairs; position in the vector is the tie-break
/// rank for the sorting strategies.
pub(crate) fn ratios_in_order(
    universe: &StockUniverse,
    limits: &AllocationLimits,
) -> Vec<(String, f64)> {
    universe
        .iter_ordered()
        .map(|(symbol, m)| {
            let ratio = crate::stats::sharpe_ratio(
                m.mean_annual_return,
                m.std_annual_return,
                limits.risk_free_rate,
            );
            (symbol.to_string(), ratio)
        })
        .collect()
}
