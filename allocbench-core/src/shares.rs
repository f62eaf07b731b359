//! Whole-share conversion of a fractional allocation.
//!
//! Brokerage orders are whole shares; a weight vector is not a purchase
//! plan. This module floors each stock's target dollars to whole shares,
//! then sweeps the leftover cash: while any targeted stock is still
//! affordable, buy one more share of the affordable stock with the highest
//! target weight. Ties break on symbol so the sweep is deterministic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::AllocationResult;

/// Errors from share planning.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("budget {0} must be positive")]
    NonPositiveBudget(f64),
    #[error("no targeted stock has a usable price")]
    NoPricedStocks,
}

/// A concrete purchase plan for one allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePlan {
    /// Whole shares per symbol; symbols that ended at zero are dropped.
    pub shares: HashMap<String, u64>,
    /// Dollars spent per symbol.
    pub spent: HashMap<String, f64>,
    pub total_spent: f64,
    pub cash_remaining: f64,
    /// Realized weights (spent / total_spent) — drifts from the target by
    /// share granularity.
    pub realized_weights: HashMap<String, f64>,
    /// Extra shares bought by the cash sweep.
    pub sweep_purchases: u64,
}

/// Convert `allocation` into whole shares at `prices` under `budget`.
///
/// Symbols with a missing or non-positive price are skipped (zero shares),
/// matching the behavior of reporting a partial fill rather than failing
/// the whole plan; the error case is every symbol being unpriced.
pub fn allocate_whole_shares(
    allocation: &AllocationResult,
    prices: &HashMap<String, f64>,
    budget: f64,
) -> Result<SharePlan, ShareError> {
    if budget <= 0.0 {
        return Err(ShareError::NonPositiveBudget(budget));
    }

    let priced: Vec<(&str, f64, f64)> = allocation
        .weights
        .iter()
        .filter_map(|(symbol, weight)| {
            let price = prices.get(symbol).copied()?;
            (price > 0.0).then_some((symbol.as_str(), *weight, price))
        })
        .collect();
    if priced.is_empty() {
        return Err(ShareError::NoPricedStocks);
    }

    let mut shares: HashMap<String, u64> = HashMap::new();
    let mut spent: HashMap<String, f64> = HashMap::new();

    for (symbol, weight, price) in &priced {
        let target_dollars = weight * budget;
        let n = (target_dollars / price).floor() as u64;
        if n > 0 {
            shares.insert(symbol.to_string(), n);
            spent.insert(symbol.to_string(), n as f64 * price);
        }
    }

    let mut cash_remaining = budget - spent.values().sum::<f64>();

    // Cash sweep: highest target weight first, symbol as tie-break.
    let mut sweep_order = priced.clone();
    sweep_order.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    let mut sweep_purchases = 0u64;
    loop {
        let Some((symbol, _, price)) = sweep_order
            .iter()
            .find(|(_, _, price)| *price <= cash_remaining)
        else {
            break;
        };
        *shares.entry(symbol.to_string()).or_insert(0) += 1;
        *spent.entry(symbol.to_string()).or_insert(0.0) += price;
        cash_remaining -= price;
        sweep_purchases += 1;
    }

    let total_spent: f64 = spent.values().sum();
    let realized_weights = if total_spent > 0.0 {
        spent
            .iter()
            .map(|(s, d)| (s.clone(), d / total_spent))
            .collect()
    } else {
        HashMap::new()
    };

    Ok(SharePlan {
        shares,
        spent,
        total_spent,
        cash_remaining,
        realized_weights,
        sweep_purchases,
    })
}
