//! Read/write chart JSON files.
//!
//! Chart JSON is the "portable" representation of a run:
//! - the period bounds and accumulation mode at the top level
//! - the KPI summary (budget, projected target, variance)
//! - the full merged series, with `null` for channels that do not apply
//!
//! The schema is defined by `domain::ChartFile`.

use std::fs::File;
use std::path::Path;

use crate::app::pipeline::RunOutput;
use crate::domain::ChartFile;
use crate::error::AppError;

pub const TOOL_NAME: &str = "kpi";

/// Build the serializable chart for a run.
pub fn chart_file(run: &RunOutput) -> ChartFile {
    ChartFile {
        tool: TOOL_NAME.to_string(),
        period_start: run.summary.period_start,
        period_end: run.summary.period_end,
        accumulation: run.summary.accumulation,
        summary: run.summary.clone(),
        points: run.merged.clone(),
    }
}

/// Write a chart JSON file.
pub fn write_chart_json(path: &Path, chart: &ChartFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create chart JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, chart)
        .map_err(|e| AppError::new(2, format!("Failed to write chart JSON: {e}")))?;

    tracing::info!(path = %path.display(), points = chart.points.len(), "wrote chart JSON");
    Ok(())
}

/// Read a chart JSON file.
pub fn read_chart_json(path: &Path) -> Result<ChartFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open chart JSON '{}': {e}", path.display())))?;
    let chart: ChartFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid chart JSON: {e}")))?;
    if chart.points.is_empty() {
        return Err(AppError::new(3, "Chart JSON contains no points."));
    }
    Ok(chart)
}
