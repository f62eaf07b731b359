//! Benchmark table export — CSV and JSON.
//!
//! The flat record table is the contract with reporting collaborators
//! (console, dashboards, spreadsheets): one row per (algorithm, run) with
//! the columns `algorithm, execution_time_ms, portfolio_return,
//! portfolio_std, portfolio_sharpe, num_stocks`. JSON artifacts carry a
//! `schema_version`; unknown versions are rejected on load.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::bench::BenchmarkRecord;

/// Current schema version for persisted benchmark artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Serializable wrapper for a benchmark session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkArtifact {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub dataset_hash: String,
    pub records: Vec<BenchmarkRecord>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Render records as the flat CSV table.
pub fn export_records_csv(records: &[BenchmarkRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "algorithm",
        "execution_time_ms",
        "portfolio_return",
        "portfolio_std",
        "portfolio_sharpe",
        "num_stocks",
    ])?;

    for r in records {
        wtr.write_record([
            &r.algorithm,
            &format!("{:.4}", r.execution_time_ms),
            &format!("{:.6}", r.portfolio_return),
            &format!("{:.6}", r.portfolio_std),
            &format!("{:.6}", r.portfolio_sharpe),
            &r.num_stocks.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Serialize a benchmark session to pretty JSON.
pub fn export_records_json(dataset_hash: &str, records: &[BenchmarkRecord]) -> Result<String> {
    let artifact = BenchmarkArtifact {
        schema_version: SCHEMA_VERSION,
        dataset_hash: dataset_hash.to_string(),
        records: records.to_vec(),
    };
    serde_json::to_string_pretty(&artifact).context("failed to serialize benchmark artifact")
}

/// Deserialize a benchmark session, rejecting unknown schema versions.
pub fn import_records_json(json: &str) -> Result<BenchmarkArtifact> {
    let artifact: BenchmarkArtifact =
        serde_json::from_str(json).context("failed to deserialize benchmark artifact")?;
    if artifact.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            artifact.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(algorithm: &str, run: usize) -> BenchmarkRecord {
        BenchmarkRecord {
            algorithm: algorithm.to_string(),
            run,
            execution_time_ms: 1.25,
            portfolio_return: 0.1167,
            portfolio_std: 0.1155,
            portfolio_sharpe: 1.0104,
            num_stocks: 3,
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_record() {
        let records = vec![record("equal_weight", 0), record("equal_weight", 1)];
        let csv = export_records_csv(&records).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "algorithm,execution_time_ms,portfolio_return,portfolio_std,portfolio_sharpe,num_stocks"
        );
        assert!(lines[1].starts_with("equal_weight,1.2500,0.116700,"));
    }

    #[test]
    fn json_round_trips() {
        let records = vec![record("dp_knapsack", 0)];
        let json = export_records_json("abc123", &records).unwrap();
        let back = import_records_json(&json).unwrap();
        assert_eq!(back.schema_version, SCHEMA_VERSION);
        assert_eq!(back.dataset_hash, "abc123");
        assert_eq!(back.records.len(), 1);
        assert_eq!(back.records[0].algorithm, "dp_knapsack");
    }

    #[test]
    fn future_schema_version_rejected() {
        let json = format!(
            r#"{{"schema_version": {}, "dataset_hash": "x", "records": []}}"#,
            SCHEMA_VERSION + 1
        );
        assert!(import_records_json(&json).is_err());
    }

    #[test]
    fn missing_schema_version_defaults_to_current() {
        let json = r#"{"dataset_hash": "x", "records": []}"#;
        let artifact = import_records_json(json).unwrap();
        assert_eq!(artifact.schema_version, SCHEMA_VERSION);
    }
}
