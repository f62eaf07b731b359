//! Price table loading.
//!
//! Input is a wide CSV: a leading `Date` column, one column per stock
//! (header = symbol), one row per trading day in chronological order, cells
//! holding closing prices. Column order is preserved — it is the canonical
//! universe order used for tie-breaking everywhere downstream.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use allocbench_core::PriceSeries;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error in '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("'{path}' has no stock columns")]
    EmptyHeader { path: String },
    #[error("'{path}' has {rows} data rows, need at least 2")]
    TooFewRows { path: String, rows: usize },
    #[error("row {row}: bad date '{value}'")]
    BadDate { row: usize, value: String },
    #[error("row {row}, column '{column}': bad price '{value}'")]
    BadCell {
        row: usize,
        column: String,
        value: String,
    },
}

/// A parsed dataset: every stock's series plus provenance.
#[derive(Debug, Clone)]
pub struct PriceTable {
    pub dates: Vec<NaiveDate>,
    /// CSV column order — the canonical universe order.
    pub symbols: Vec<String>,
    pub series: Vec<PriceSeries>,
    /// BLAKE3 of the raw file bytes; keys the metrics cache and tags reports.
    pub dataset_hash: String,
}

impl PriceTable {
    pub fn num_stocks(&self) -> usize {
        self.symbols.len()
    }

    pub fn num_rows(&self) -> usize {
        self.dates.len()
    }
}

/// Load a wide price CSV from disk.
pub fn load_price_table(path: impl AsRef<Path>) -> Result<PriceTable, LoadError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let raw = std::fs::read(path).map_err(|source| LoadError::Io {
        path: display.clone(),
        source,
    })?;
    let dataset_hash = blake3::hash(&raw).to_hex().to_string();
    parse_price_csv(&raw, &display).map(|(dates, symbols, closes)| {
        let series = symbols
            .iter()
            .map(|s| PriceSeries::new(s.clone(), dates.clone(), closes[s].clone()))
            .collect();
        PriceTable {
            dates,
            symbols,
            series,
            dataset_hash,
        }
    })
}

type ParsedColumns = (Vec<NaiveDate>, Vec<String>, HashMap<String, Vec<f64>>);

fn parse_price_csv(raw: &[u8], path: &str) -> Result<ParsedColumns, LoadError> {
    let mut reader = csv::Reader::from_reader(raw);

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv {
            path: path.to_string(),
            source,
        })?
        .clone();
    // First column is the date key; the rest are stock symbols.
    let symbols: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();
    if symbols.is_empty() {
        return Err(LoadError::EmptyHeader {
            path: path.to_string(),
        });
    }

    let mut dates = Vec::new();
    let mut closes: HashMap<String, Vec<f64>> =
        symbols.iter().map(|s| (s.clone(), Vec::new())).collect();

    for (i, record) in reader.records().enumerate() {
        let row = i + 2; // 1-based, after header
        let record = record.map_err(|source| LoadError::Csv {
            path: path.to_string(),
            source,
        })?;

        let date_cell = record.get(0).unwrap_or("").trim();
        let date = parse_date(date_cell).ok_or_else(|| LoadError::BadDate {
            row,
            value: date_cell.to_string(),
        })?;
        dates.push(date);

        for (symbol, cell) in symbols.iter().zip(record.iter().skip(1)) {
            let value: f64 = cell.trim().parse().map_err(|_| LoadError::BadCell {
                row,
                column: symbol.clone(),
                value: cell.to_string(),
            })?;
            if !value.is_finite() {
                return Err(LoadError::BadCell {
                    row,
                    column: symbol.clone(),
                    value: cell.to_string(),
                });
            }
            closes
                .get_mut(symbol)
                .expect("column initialized from header")
                .push(value);
        }
    }

    if dates.len() < 2 {
        return Err(LoadError::TooFewRows {
            path: path.to_string(),
            rows: dates.len(),
        });
    }

    Ok((dates, symbols, closes))
}

/// Accepts `YYYY-MM-DD` and `YYYY/MM/DD`.
fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y/%m/%d"))
        .ok()
}
