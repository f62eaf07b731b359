//! Equal-weight allocation: 1/N for every stock in the universe.

use crate::domain::{AllocationResult, StockUniverse};

use super::AllocError;

/// O(N). The only failure mode is an empty universe.
pub fn allocate(universe: &StockUniverse) -> Result<AllocationResult, AllocError> {
    let n = universe.len();
    if n == 0 {
        return Err(AllocError::EmptyUniverse);
    }
    let weight = 1.0 / n as f64;
    Ok(AllocationResult {
        weights: universe
            .symbols
            .iter()
            .map(|s| (s.clone(), weight))
            .collect(),
    })
}
