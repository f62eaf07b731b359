//! Text rendering for simulation and benchmark results.
//!
//! The core only exposes ordered records and ranking functions; turning
//! them into something readable is this module's job. Output is plain
//! monospace tables suitable for a terminal or a log file.

use allocbench_core::{AllocationResult, PortfolioSummary, SharePlan, StockUniverse};

use crate::bench::BenchmarkReport;

/// Per-stock simulation summary, sorted by mean annual return descending.
pub fn render_metrics_table(universe: &StockUniverse) -> String {
    let mut rows: Vec<(&str, &allocbench_core::StockMetrics)> = universe.iter_ordered().collect();
    rows.sort_by(|a, b| {
        b.1.mean_annual_return
            .partial_cmp(&a.1.mean_annual_return)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut out = String::new();
    out.push_str(&format!(
        "{:<10} {:>12} {:>14} {:>10} {:>10} {:>10}\n",
        "Stock", "Mean Return", "Median Return", "Std Dev", "5th %ile", "95th %ile"
    ));
    out.push_str(&"-".repeat(74));
    out.push('\n');
    for (symbol, m) in rows {
        out.push_str(&format!(
            "{:<10} {:>11.2}% {:>13.2}% {:>9.2}% {:>9.2}% {:>9.2}%\n",
            symbol,
            m.mean_annual_return * 100.0,
            m.median_annual_return * 100.0,
            m.std_annual_return * 100.0,
            m.var_5 * 100.0,
            m.var_95 * 100.0,
        ));
    }
    out
}

/// One strategy's allocation with its portfolio summary.
pub fn render_allocation(
    name: &str,
    allocation: &AllocationResult,
    summary: &PortfolioSummary,
    universe: &StockUniverse,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Allocation ({name})\n"));
    out.push_str(&format!(
        "  expected return {:.2}%  std {:.2}%  sharpe {:.4}  stocks {}\n",
        summary.expected_return * 100.0,
        summary.std_dev * 100.0,
        summary.sharpe_ratio,
        allocation.num_stocks(),
    ));
    for (symbol, weight) in allocation.iter_ordered(universe) {
        out.push_str(&format!("  {symbol:<10} {:>6.2}%\n", weight * 100.0));
    }
    out
}

/// Whole-share purchase plan, in canonical universe order.
pub fn render_share_plan(plan: &SharePlan, universe: &StockUniverse) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Share plan: spent ${:.2}, cash left ${:.2}, {} sweep purchase(s)\n",
        plan.total_spent, plan.cash_remaining, plan.sweep_purchases
    ));
    for symbol in &universe.symbols {
        if let Some(n) = plan.shares.get(symbol) {
            out.push_str(&format!(
                "  {symbol:<10} {n:>6} shares  ${:>10.2}  ({:.2}%)\n",
                plan.spent.get(symbol).copied().unwrap_or(0.0),
                plan.realized_weights.get(symbol).copied().unwrap_or(0.0) * 100.0,
            ));
        }
    }
    out
}

/// Side-by-side comparison of every benchmarked algorithm: aggregate
/// table, both rankings, and the pairwise quality-per-time trade-off.
pub fn render_comparison(report: &BenchmarkReport) -> String {
    let stats = report.algorithm_stats();

    let mut out = String::new();
    out.push_str(&format!(
        "{:<14} {:>16} {:>10} {:>10} {:>8}\n",
        "Algorithm", "Time (ms)", "Return", "Sharpe", "Stocks"
    ));
    out.push_str(&"-".repeat(64));
    out.push('\n');
    for s in &stats {
        let stocks = report
            .records
            .iter()
            .find(|r| r.algorithm == s.algorithm)
            .map(|r| r.num_stocks)
            .unwrap_or(0);
        out.push_str(&format!(
            "{:<14} {:>9.3} ± {:<5.3} {:>9.2}% {:>10.4} {:>8}\n",
            s.algorithm,
            s.mean_time_ms,
            s.std_time_ms,
            s.mean_return * 100.0,
            s.mean_sharpe,
            stocks,
        ));
    }

    out.push_str(&format!(
        "\nSpeed ranking:   {}\n",
        report.speed_ranking().join(" > ")
    ));
    out.push_str(&format!(
        "Quality ranking: {}\n",
        report.quality_ranking().join(" > ")
    ));

    // Pairwise trade-off: best-quality vs fastest, when they differ.
    let quality = report.quality_ranking();
    let speed = report.speed_ranking();
    if let (Some(best), Some(fastest)) = (quality.first(), speed.first()) {
        if best != fastest {
            if let Some(q) = report.quality_per_ms(best, fastest) {
                out.push_str(&format!(
                    "Trade-off: {best} gains {q:.6} sharpe per extra ms over {fastest}\n"
                ));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::BenchmarkRecord;
    use allocbench_core::StockMetrics;
    use std::collections::HashMap;

    fn universe() -> StockUniverse {
        let entries = [("AAA", 0.05), ("BBB", 0.20), ("CCC", 0.10)];
        StockUniverse {
            symbols: entries.iter().map(|(s, _)| s.to_string()).collect(),
            metrics: entries
                .iter()
                .map(|(s, mean)| {
                    (
                        s.to_string(),
                        StockMetrics {
                            mean_annual_return: *mean,
                            median_annual_return: *mean,
                            std_annual_return: 0.2,
                            var_5: mean - 0.3,
                            var_95: mean + 0.3,
                            simulated_annual_returns: vec![],
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn metrics_table_sorted_by_mean_return() {
        let table = render_metrics_table(&universe());
        let bbb = table.find("BBB").unwrap();
        let ccc = table.find("CCC").unwrap();
        let aaa = table.find("AAA").unwrap();
        assert!(bbb < ccc && ccc < aaa);
    }

    #[test]
    fn comparison_lists_rankings() {
        let report = BenchmarkReport {
            records: vec![
                BenchmarkRecord {
                    algorithm: "equal_weight".into(),
                    run: 0,
                    execution_time_ms: 0.5,
                    portfolio_return: 0.1,
                    portfolio_std: 0.2,
                    portfolio_sharpe: 0.5,
                    num_stocks: 3,
                },
                BenchmarkRecord {
                    algorithm: "dp_knapsack".into(),
                    run: 0,
                    execution_time_ms: 20.0,
                    portfolio_return: 0.15,
                    portfolio_std: 0.2,
                    portfolio_sharpe: 0.75,
                    num_stocks: 3,
                },
            ],
        };
        let text = render_comparison(&report);
        assert!(text.contains("Speed ranking:   equal_weight > dp_knapsack"));
        assert!(text.contains("Quality ranking: dp_knapsack > equal_weight"));
        assert!(text.contains("Trade-off:"));
    }
}
