//! AllocBench Core — return estimation, Monte Carlo simulation, and
//! allocation strategies.
//!
//! This crate contains the computational heart of the system:
//! - Domain types (price series, simulated stock metrics, allocations,
//!   portfolio summaries)
//! - Return estimator (daily returns, sample statistics, Sharpe ratio)
//! - Monte Carlo simulation engine with deterministic per-symbol seeding
//! - Three allocation strategies: equal weight, greedy ratio, DP knapsack
//!
//! Data flows one way: prices → estimator → simulation → `StockUniverse` →
//! strategies → `AllocationResult`. Each stage produces a new immutable
//! value; nothing here performs I/O.

pub mod alloc;
pub mod domain;
pub mod rng;
pub mod shares;
pub mod sim;
pub mod stats;

pub use alloc::{
    AllocError, AllocationLimits, GreedyConfig, KnapsackConfig, Strategy, WeightingRule,
};
pub use domain::{
    AllocationResult, PortfolioSummary, PriceSeries, StockMetrics, StockUniverse,
};
pub use shares::{allocate_whole_shares, ShareError, SharePlan};
pub use sim::{simulate_series, simulate_universe, SimError, SimulationConfig};
pub use stats::EstimateError;
