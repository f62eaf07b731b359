//! DP knapsack allocation.
//!
//! Capital is discretized into `capacity_steps` units. Each stock offers a
//! small set of candidate increments spanning `[min_weight, max_weight]` in
//! units (a bounded multi-choice knapsack — a stock is sized, not just
//! picked), plus the zero increment. A DP table over
//! (stock index, remaining capacity) maximizes total expected return;
//! backtracking recovers the chosen increment per stock, which is converted
//! to fractions and renormalized to exactly 1.0 to absorb discretization
//! rounding.
//!
//! O(N × capacity_steps × candidates) time, O(N × capacity_steps) space —
//! deliberately the most expensive strategy. Callers bound long runs by
//! choosing `capacity_steps`; there is no internal timeout.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{AllocationResult, StockUniverse};

use super::{renormalize, AllocError, AllocationLimits};

/// Knapsack strategy parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KnapsackConfig {
    /// Number of capital units (1000 = 0.1% granularity).
    #[serde(default = "default_capacity_steps")]
    pub capacity_steps: usize,
    /// Candidate increments per stock between the min and max bounds.
    #[serde(default = "default_candidates")]
    pub candidates_per_stock: usize,
}

fn default_capacity_steps() -> usize {
    1000
}

fn default_candidates() -> usize {
    8
}

impl Default for KnapsackConfig {
    fn default() -> Self {
        Self {
            capacity_steps: default_capacity_steps(),
            candidates_per_stock: default_candidates(),
        }
    }
}

pub fn allocate(
    universe: &StockUniverse,
    limits: &AllocationLimits,
    config: &KnapsackConfig,
) -> Result<AllocationResult, AllocError> {
    limits.validate()?;
    if universe.is_empty() {
        return Err(AllocError::EmptyUniverse);
    }
    if config.capacity_steps == 0 {
        return Err(AllocError::InvalidBounds(
            "capacity_steps must be positive".into(),
        ));
    }
    if config.candidates_per_stock == 0 {
        return Err(AllocError::InvalidBounds(
            "candidates_per_stock must be positive".into(),
        ));
    }

    // Expected annual return per stock, canonical order.
    let means: Vec<(String, f64)> = universe
        .iter_ordered()
        .map(|(s, m)| (s.to_string(), m.mean_annual_return))
        .collect();
    let n = means.len();
    let capacity = config.capacity_steps;

    // With max_weight * N < 1 no weighting can sum to 1 within bounds.
    if limits.max_weight * (n as f64) < 1.0 - 1e-9 {
        return Err(AllocError::InvalidBounds(format!(
            "max_weight {} x {n} stocks cannot reach total capital",
            limits.max_weight
        )));
    }

    let candidates = candidate_units(limits, capacity, config.candidates_per_stock)?;

    // table[i][c] = best attainable value using stocks i.. with c units left.
    // Row n is the all-zero base case.
    let width = capacity + 1;
    let mut table = vec![0.0_f64; (n + 1) * width];
    let mut choice = vec![0_u32; n * width];

    for i in (0..n).rev() {
        let unit_value = means[i].1 / capacity as f64;
        for c in 0..=capacity {
            // Zero increment: skip this stock.
            let mut best = table[(i + 1) * width + c];
            let mut best_units = 0_u32;
            for &u in &candidates {
                if u > c {
                    break;
                }
                let v = u as f64 * unit_value + table[(i + 1) * width + (c - u)];
                if v > best {
                    best = v;
                    best_units = u as u32;
                }
            }
            table[i * width + c] = best;
            choice[i * width + c] = best_units;
        }
    }

    // Backtrack the chosen increment per stock.
    let mut units = vec![0_usize; n];
    let mut remaining = capacity;
    for i in 0..n {
        let u = choice[i * width + remaining] as usize;
        units[i] = u;
        remaining -= u;
    }

    let total_units: usize = units.iter().sum();
    if total_units == 0 {
        // Every stock at zero: the bounds admit no useful selection.
        return Err(AllocError::InfeasibleAllocation);
    }

    let mut weights: HashMap<String, f64> = means
        .iter()
        .zip(&units)
        .filter(|(_, &u)| u > 0)
        .map(|((symbol, _), &u)| (symbol.clone(), u as f64))
        .collect();
    renormalize(&mut weights);

    Ok(AllocationResult { weights })
}

/// Candidate increments in units, ascending, spanning the weight bounds.
///
/// Both endpoints are always present; interior candidates are evenly
/// spaced. Fails when the bounds round to an empty unit range.
fn candidate_units(
    limits: &AllocationLimits,
    capacity: usize,
    count: usize,
) -> Result<Vec<usize>, AllocError> {
    let min_units = ((limits.min_weight * capacity as f64).ceil() as usize).max(1);
    let max_units = (limits.max_weight * capacity as f64).floor() as usize;
    if min_units > max_units || min_units > capacity {
        return Err(AllocError::InfeasibleAllocation);
    }

    let span = max_units - min_units;
    let steps = count.min(span + 1).max(1);
    if steps == 1 {
        return Ok(vec![min_units]);
    }
    let mut units: Vec<usize> = (0..steps)
        .map(|j| min_units + (j * span) / (steps - 1))
        .collect();
    units.dedup();
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::equal_weight;
    use crate::domain::{PortfolioSummary, StockMetrics};

    fn metrics(mean: f64, std: f64) -> StockMetrics {
        StockMetrics {
            mean_annual_return: mean,
            median_annual_return: mean,
            std_annual_return: std,
            var_5: mean - 2.0 * std,
            var_95: mean + 2.0 * std,
            simulated_annual_returns: vec![],
        }
    }

    fn universe(entries: &[(&str, f64, f64)]) -> StockUniverse {
        StockUniverse {
            symbols: entries.iter().map(|(s, _, _)| s.to_string()).collect(),
            metrics: entries
                .iter()
                .map(|(s, m, sd)| (s.to_string(), metrics(*m, *sd)))
                .collect(),
        }
    }

    fn wide_limits() -> AllocationLimits {
        AllocationLimits {
            min_weight: 0.05,
            max_weight: 0.60,
            risk_free_rate: 0.0,
        }
    }

    #[test]
    fn weights_sum_to_one() {
        let u = universe(&[("A", 0.10, 0.2), ("B", 0.20, 0.25), ("C", 0.05, 0.15)]);
        let config = KnapsackConfig {
            capacity_steps: 100,
            candidates_per_stock: 8,
        };
        let result = allocate(&u, &wide_limits(), &config).unwrap();
        assert!((result.total_weight() - 1.0).abs() < 1e-9);
        for (_, w) in &result.weights {
            assert!(*w >= 0.0);
        }
    }

    #[test]
    fn favors_higher_expected_return() {
        let u = universe(&[("LOW", 0.05, 0.2), ("HIGH", 0.25, 0.2), ("MID", 0.12, 0.2)]);
        let config = KnapsackConfig {
            capacity_steps: 100,
            candidates_per_stock: 8,
        };
        let result = allocate(&u, &wide_limits(), &config).unwrap();
        assert!(result.weight("HIGH") >= result.weight("MID"));
        assert!(result.weight("MID") >= result.weight("LOW"));
    }

    #[test]
    fn never_worse_than_equal_weight() {
        let u = universe(&[
            ("A", 0.18, 0.3),
            ("B", 0.02, 0.1),
            ("C", 0.11, 0.2),
            ("D", 0.07, 0.25),
        ]);
        let limits = AllocationLimits {
            min_weight: 0.05,
            max_weight: 0.90,
            risk_free_rate: 0.0,
        };
        let config = KnapsackConfig {
            capacity_steps: 200,
            candidates_per_stock: 10,
        };
        let dp = allocate(&u, &limits, &config).unwrap();
        let eq = equal_weight::allocate(&u).unwrap();
        let dp_ret = PortfolioSummary::compute(&dp, &u, 0.0).expected_return;
        let eq_ret = PortfolioSummary::compute(&eq, &u, 0.0).expected_return;
        assert!(
            dp_ret >= eq_ret - 1e-9,
            "dp {dp_ret} must not trail equal weight {eq_ret}"
        );
    }

    #[test]
    fn all_negative_returns_are_infeasible() {
        let u = universe(&[("A", -0.10, 0.2), ("B", -0.05, 0.2)]);
        let limits = AllocationLimits {
            min_weight: 0.05,
            max_weight: 0.90,
            risk_free_rate: 0.0,
        };
        let config = KnapsackConfig::default();
        assert!(matches!(
            allocate(&u, &limits, &config),
            Err(AllocError::InfeasibleAllocation)
        ));
    }

    #[test]
    fn min_bound_coarser_than_capacity_is_infeasible() {
        let u = universe(&[("A", 0.10, 0.2), ("B", 0.20, 0.2)]);
        // min 0.5% of capital at 50 units rounds to 1 unit; max 0.6% floors
        // to 0 units — no legal increment exists.
        let limits = AllocationLimits {
            min_weight: 0.005,
            max_weight: 0.006,
            risk_free_rate: 0.0,
        };
        let config = KnapsackConfig {
            capacity_steps: 50,
            candidates_per_stock: 4,
        };
        assert!(matches!(
            allocate(&u, &limits, &config),
            Err(AllocError::InfeasibleAllocation)
        ));
    }

    #[test]
    fn unreachable_total_capital_is_invalid_bounds() {
        let u = universe(&[("A", 0.10, 0.2), ("B", 0.20, 0.2)]);
        // 2 stocks x 10% max leaves 80% of capital unallocatable.
        let limits = AllocationLimits {
            min_weight: 0.005,
            max_weight: 0.10,
            risk_free_rate: 0.0,
        };
        assert!(matches!(
            allocate(&u, &limits, &KnapsackConfig::default()),
            Err(AllocError::InvalidBounds(_))
        ));
    }

    #[test]
    fn empty_universe_fails() {
        let u = universe(&[]);
        assert!(matches!(
            allocate(&u, &wide_limits(), &KnapsackConfig::default()),
            Err(AllocError::EmptyUniverse)
        ));
    }

    #[test]
    fn zero_capacity_rejected() {
        let u = universe(&[("A", 0.10, 0.2)]);
        let config = KnapsackConfig {
            capacity_steps: 0,
            candidates_per_stock: 4,
        };
        assert!(matches!(
            allocate(&u, &wide_limits(), &config),
            Err(AllocError::InvalidBounds(_))
        ));
    }

    #[test]
    fn candidate_units_include_bounds() {
        let limits = AllocationLimits {
            min_weight: 0.05,
            max_weight: 0.20,
            risk_free_rate: 0.0,
        };
        let units = candidate_units(&limits, 100, 8).unwrap();
        assert_eq!(*units.first().unwrap(), 5);
        assert_eq!(*units.last().unwrap(), 20);
        assert!(units.windows(2).all(|w| w[0] < w[1]));
    }
}
