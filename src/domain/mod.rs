//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the actual and merged chart points (`ActualPoint`, `MergedPoint`)
//! - run configuration (`KpiConfig`, `SampleConfig`, `Accumulation`)
//! - report outputs (`KpiSummary`, `ChartFile`)

pub mod types;

pub use types::*;
