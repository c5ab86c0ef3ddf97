//! CSV ingest and normalization.
//!
//! This module is responsible for turning a `date,value` CSV export into a clean,
//! date-ordered actual series that is safe to project.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (rows are sorted by date, no hidden reordering rules)

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::ActualPoint;
use crate::error::AppError;

/// Accepted spellings of the value column, in priority order.
const VALUE_COLUMNS: [&str; 2] = ["value", "actual"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: ordered points + row errors.
#[derive(Debug, Clone)]
pub struct IngestedSeries {
    pub points: Vec<ActualPoint>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load an actual series from a CSV file.
pub fn load_actual_series(path: &Path) -> Result<IngestedSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let ingested = load_actual_series_from_reader(file)?;

    tracing::info!(
        path = %path.display(),
        rows_read = ingested.rows_read,
        rows_used = ingested.rows_used,
        "loaded actual series"
    );
    for err in &ingested.row_errors {
        tracing::warn!(line = err.line, "skipped row: {}", err.message);
    }

    Ok(ingested)
}

/// Load an actual series from any CSV reader (headers required).
pub fn load_actual_series_from_reader<R: Read>(reader: R) -> Result<IngestedSeries, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = *header_map
        .get("date")
        .ok_or_else(|| AppError::new(2, "Missing required column: `date`"))?;
    let value_idx = VALUE_COLUMNS
        .iter()
        .find_map(|name| header_map.get(*name).copied())
        .ok_or_else(|| AppError::new(2, "Missing required column: `value` (or `actual`)"))?;

    let mut points: Vec<(usize, ActualPoint)> = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line, and CSV lines are 1-based.
        let line = idx + 2;
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

        match parse_row(&record, date_idx, value_idx) {
            Ok(point) => points.push((line, point)),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    points.sort_by_key(|(_, p)| p.date);

    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(points.len());
    for (line, p) in points {
        if seen.insert(p.date) {
            kept.push(p);
        } else {
            row_errors.push(RowError {
                line,
                message: format!("Duplicate date {}.", p.date),
            });
        }
    }
    row_errors.sort_by_key(|e| e.line);

    let rows_used = kept.len();
    if rows_used == 0 {
        return Err(AppError::new(3, "No valid rows remain after validation."));
    }

    Ok(IngestedSeries {
        points: kept,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, date_idx: usize, value_idx: usize) -> Result<ActualPoint, String> {
    let date = parse_date(get_required(record, date_idx, "date")?)?;
    let raw = get_required(record, value_idx, "value")?;
    let value = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid value '{raw}'."))?;
    if !value.is_finite() {
        return Err(format!("Non-finite value '{raw}'."));
    }
    if value < 0.0 {
        return Err(format!("Negative value {value} on {date}."));
    }
    Ok(ActualPoint::new(date, value))
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, YYYY/MM/DD."
    ))
}
