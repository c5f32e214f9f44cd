//! CSV ingest and validation.
//!
//! This module turns the headerless lookup-table CSV into a clean set of
//! `SampleRow`s that are safe to group and fit.
//!
//! Design goals:
//! - **Fixed column layout** (`aa, ab, ba, bb, ss_ratio, time, i, j[, k]`)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no grouping or fitting logic here

use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{SampleRow, ValueColumn};
use crate::error::AppError;

/// Minimum field count for a usable row (everything except `k`).
const MIN_FIELDS: usize = 8;

/// Summary stats about the rows actually loaded, computed against the
/// selected value column.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_rows: usize,
    pub time_min: f64,
    pub time_max: f64,
    pub value_min: f64,
    pub value_max: f64,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed rows + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub rows: Vec<SampleRow>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load the lookup-table CSV into `SampleRow`s.
pub fn load_rows(path: &Path, value: ValueColumn) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // The file has no header, so records start at CSV line 1.
        let line = idx + 1;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record) {
            Ok(row) => rows.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = rows.len();
    if rows_used == 0 {
        return Err(AppError::new(
            3,
            format!("No valid rows in '{}'.", path.display()),
        ));
    }

    let stats = compute_stats(&rows, value)
        .ok_or_else(|| AppError::new(3, "No finite values remain after ingest."))?;

    Ok(IngestedData {
        rows,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn parse_row(record: &StringRecord) -> Result<SampleRow, String> {
    if record.len() < MIN_FIELDS {
        return Err(format!(
            "Expected at least {MIN_FIELDS} fields, got {}.",
            record.len()
        ));
    }

    let aa = parse_f64(record, 0, "aa")?;
    let ab = parse_f64(record, 1, "ab")?;
    let ba = parse_f64(record, 2, "ba")?;
    let bb = parse_f64(record, 3, "bb")?;
    let ss_ratio = parse_f64(record, 4, "ss_ratio")?;
    let time = parse_f64(record, 5, "time")?;
    let i = parse_i64(record, 6, "i")?;
    let j = parse_i64(record, 7, "j")?;

    // `k` is optional: older 8-column exports omit it. An empty trailing
    // field is treated the same as a missing one.
    let k = match record.get(8).filter(|s| !s.is_empty()) {
        Some(s) => Some(
            s.parse::<i64>()
                .map_err(|_| format!("Invalid integer `k`: '{s}'."))?,
        ),
        None => None,
    };

    Ok(SampleRow {
        aa,
        ab,
        ba,
        bb,
        ss_ratio,
        time,
        i,
        j,
        k,
    })
}

fn parse_f64(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing `{name}` field."))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid number `{name}`: '{raw}'."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite `{name}` value."))
    }
}

fn parse_i64(record: &StringRecord, idx: usize, name: &str) -> Result<i64, String> {
    let raw = record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing `{name}` field."))?;
    raw.parse::<i64>()
        .map_err(|_| format!("Invalid integer `{name}`: '{raw}'."))
}

fn compute_stats(rows: &[SampleRow], value: ValueColumn) -> Option<DatasetStats> {
    let mut time_min = f64::INFINITY;
    let mut time_max = f64::NEG_INFINITY;
    let mut value_min = f64::INFINITY;
    let mut value_max = f64::NEG_INFINITY;

    for row in rows {
        let v = row.value(value);
        time_min = time_min.min(row.time);
        time_max = time_max.max(row.time);
        value_min = value_min.min(v);
        value_max = value_max.max(v);
    }

    if !time_min.is_finite()
        || !time_max.is_finite()
        || !value_min.is_finite()
        || !value_max.is_finite()
    {
        return None;
    }

    Some(DatasetStats {
        n_rows: rows.len(),
        time_min,
        time_max,
        value_min,
        value_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn parse_row_full_nine_columns() {
        let rec = record(&[
            "9.32", "9.40", "8.10", "8.18", "0.95", "20", "9", "8", "5008",
        ]);
        let row = parse_row(&rec).unwrap();
        assert_eq!(row.i, 9);
        assert_eq!(row.j, 8);
        assert_eq!(row.k, Some(5008));
        assert!((row.aa - 9.32).abs() < 1e-12);
        assert!((row.time - 20.0).abs() < 1e-12);
    }

    #[test]
    fn parse_row_tolerates_missing_k() {
        let rec = record(&["1", "2", "3", "4", "0.9", "10", "0", "1"]);
        let row = parse_row(&rec).unwrap();
        assert_eq!(row.k, None);
    }

    #[test]
    fn parse_row_rejects_short_record() {
        let rec = record(&["1", "2", "3"]);
        let err = parse_row(&rec).unwrap_err();
        assert!(err.contains("at least 8"));
    }

    #[test]
    fn parse_row_rejects_bad_number() {
        let rec = record(&["1", "2", "oops", "4", "0.9", "10", "0", "1", "2"]);
        let err = parse_row(&rec).unwrap_err();
        assert!(err.contains("ba"));
    }

    #[test]
    fn stats_follow_selected_column() {
        let rows = vec![
            SampleRow {
                aa: 1.0,
                ab: 10.0,
                ba: 0.0,
                bb: 0.0,
                ss_ratio: 0.5,
                time: 10.0,
                i: 0,
                j: 0,
                k: Some(0),
            },
            SampleRow {
                aa: 3.0,
                ab: 20.0,
                ba: 0.0,
                bb: 0.0,
                ss_ratio: 0.55,
                time: 30.0,
                i: 0,
                j: 1,
                k: Some(1),
            },
        ];

        let stats = compute_stats(&rows, ValueColumn::Aa).unwrap();
        assert_eq!(stats.value_min, 1.0);
        assert_eq!(stats.value_max, 3.0);
        assert_eq!(stats.time_min, 10.0);
        assert_eq!(stats.time_max, 30.0);

        let stats = compute_stats(&rows, ValueColumn::Ab).unwrap();
        assert_eq!(stats.value_max, 20.0);
    }
}
