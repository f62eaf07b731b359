//! Greedy ratio allocation.
//!
//! Ranks stocks by risk-adjusted ratio, keeps the top K, assigns base
//! weights via a pluggable rule, then clamps each weight into
//! `[min_weight, max_weight]` and renormalizes. Ties rank in universe
//! (CSV column) order, so the output is deterministic.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{AllocationResult, StockUniverse};

use super::{ratios_in_order, renormalize, AllocError, AllocationLimits};

/// How base weights are derived from the per-stock ratio.
///
/// `InverseRatio` hands more capital to lower-ratio stocks. It exists
/// because an earlier revision of this system shipped that rule; it is kept
/// as an explicitly selectable policy instead of being silently corrected,
/// but `ProportionalToRatio` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightingRule {
    ProportionalToRatio,
    InverseRatio,
}

impl Default for WeightingRule {
    fn default() -> Self {
        WeightingRule::ProportionalToRatio
    }
}

/// Greedy strategy parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreedyConfig {
    /// Keep at most this many stocks. `None` keeps the whole universe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub weighting: WeightingRule,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self {
            top_k: None,
            weighting: WeightingRule::default(),
        }
    }
}

pub fn allocate(
    universe: &StockUniverse,
    limits: &AllocationLimits,
    config: &GreedyConfig,
) -> Result<AllocationResult, AllocError> {
    limits.validate()?;
    if universe.is_empty() {
        return Err(AllocError::EmptyUniverse);
    }

    // Rank descending by ratio; Vec::sort_by is stable, so equal ratios keep
    // their universe order.
    let mut ranked = ratios_in_order(universe, limits);
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let top_k = config.top_k.unwrap_or(universe.len());
    ranked.truncate(top_k);

    // Only stocks with a positive ratio receive capital.
    let selected: Vec<(String, f64)> = ranked.into_iter().filter(|(_, r)| *r > 0.0).collect();
    if selected.is_empty() {
        return Err(AllocError::EmptyUniverse);
    }

    let k = selected.len();
    if limits.min_weight * k as f64 > 1.0 {
        return Err(AllocError::InvalidBounds(format!(
            "min_weight {} x {k} selected stocks exceeds total capital",
            limits.min_weight
        )));
    }

    let mut weights = base_weights(&selected, config.weighting);

    for w in weights.values_mut() {
        *w = w.clamp(limits.min_weight, limits.max_weight);
    }
    renormalize(&mut weights);

    Ok(AllocationResult { weights })
}

/// Base weights before clamping. `selected` ratios are strictly positive.
fn base_weights(selected: &[(String, f64)], rule: WeightingRule) -> HashMap<String, f64> {
    match rule {
        WeightingRule::ProportionalToRatio => {
            let total: f64 = selected.iter().map(|(_, r)| r).sum();
            selected
                .iter()
                .map(|(s, r)| (s.clone(), r / total))
                .collect()
        }
        WeightingRule::InverseRatio => {
            let total: f64 = selected.iter().map(|(_, r)| 1.0 / r).sum();
            selected
                .iter()
                .map(|(s, r)| (s.clone(), (1.0 / r) / total))
                .collect()
        }
    }
}
