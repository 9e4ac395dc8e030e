//! Divergence report generation.
//!
//! Reports share one fixed column layout across formats:
//!
//! - **xlsx**: the `Divergências` worksheet accounting opens directly
//! - **csv**: same header and rows, for diffing and scripts
//! - **json**: records plus a generation timestamp
//!
//! [`divergence_frame`] exposes the same rows as a Polars `DataFrame`.

mod common;
mod frame;
mod json;
mod tabular;
mod xlsx;

use std::path::Path;

use anyhow::Result;
use nfe_validate::Divergence;

pub use common::{
    ABSENT, DEFAULT_REPORT_FILE, NO_DIVERGENCE_MESSAGE, REPORT_HEADERS, ReportFormat, SHEET_NAME,
    completion_message, report_row,
};
pub use frame::divergence_frame;
pub use json::write_json_report;
pub use tabular::write_csv_report;
pub use xlsx::{read_xlsx_report, write_xlsx_report};

/// Writes `divergences` to `path` in the given format.
pub fn write_report(path: &Path, format: ReportFormat, divergences: &[Divergence]) -> Result<()> {
    match format {
        ReportFormat::Xlsx => write_xlsx_report(path, divergences),
        ReportFormat::Csv => write_csv_report(path, divergences),
        ReportFormat::Json => write_json_report(path, divergences),
    }
}
