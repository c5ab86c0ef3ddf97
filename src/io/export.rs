//! Export the merged series to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! one row per day, empty cells for channels that do not apply.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::MergedPoint;
use crate::error::AppError;

/// Write the merged series to a CSV file.
pub fn write_series_csv(path: &Path, merged: &[MergedPoint]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_series(&mut file, merged)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))?;

    tracing::info!(path = %path.display(), rows = merged.len(), "wrote series CSV");
    Ok(())
}

fn write_series<W: Write>(out: &mut W, merged: &[MergedPoint]) -> std::io::Result<()> {
    writeln!(out, "date,actual,budget,projected")?;
    for p in merged {
        writeln!(
            out,
            "{},{},{},{}",
            p.date,
            fmt_cell(p.actual),
            fmt_cell(p.budget),
            fmt_cell(p.projected),
        )?;
    }
    Ok(())
}

fn fmt_cell(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.6}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_cells_for_missing_channels() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let rows = [MergedPoint {
            date,
            actual: None,
            budget: Some(20.0),
            projected: Some(22.0),
        }];

        let mut buf = Vec::new();
        write_series(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "date,actual,budget,projected\n2025-03-31,,20.000000,22.000000\n"
        );
    }
}
