//! Return estimator — sample statistics over a historical price series.
//!
//! One numeric convention holds crate-wide: standard deviation uses the
//! sample estimator (n − 1 divisor). Every downstream ratio shifts if this
//! changes, so it is fixed here and nowhere else.

use thiserror::Error;

use crate::domain::PriceSeries;

/// Errors from the estimator.
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("'{symbol}' has {points} price points, need at least 2 to estimate returns")]
    InsufficientData { symbol: String, points: usize },
}

/// Fractional day-over-day changes: `closes[i+1] / closes[i] − 1`.
///
/// Output length is `len − 1`. Fails when the series has fewer than 2 points.
pub fn daily_returns(series: &PriceSeries) -> Result<Vec<f64>, EstimateError> {
    if series.len() < 2 {
        return Err(EstimateError::InsufficientData {
            symbol: series.symbol.clone(),
            points: series.len(),
        });
    }
    Ok(series
        .closes
        .windows(2)
        .map(|w| w[1] / w[0] - 1.0)
        .collect())
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1 divisor).
///
/// Returns 0.0 for fewer than 2 values.
pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}

/// Risk-adjusted return: `(ret − risk_free_rate) / std`.
///
/// A non-positive `std` means the ratio is undefined; this returns the 0.0
/// sentinel rather than letting a division produce NaN/Inf. Callers that
/// need to distinguish "zero risk" from "zero ratio" must check `std`
/// themselves before calling.
pub fn sharpe_ratio(ret: f64, std: f64, risk_free_rate: f64) -> f64 {
    if std <= 0.0 {
        return 0.0;
    }
    (ret - risk_free_rate) / std
}
