//! Spreadsheet report.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use calamine::{Reader, open_workbook_auto};
use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use nfe_validate::Divergence;

use crate::common::{REPORT_HEADERS, SHEET_NAME, ensure_parent, report_row};

const MIN_COLUMN_WIDTH: usize = 10;
const MAX_COLUMN_WIDTH: usize = 90;

/// Writes the divergence worksheet. Every cell is written as text so codes
/// keep their leading zeros.
pub fn write_xlsx_report(path: &Path, divergences: &[Divergence]) -> Result<()> {
    ensure_parent(path)?;

    let rows: Vec<[String; 10]> = divergences.iter().map(report_row).collect();

    let mut workbook = Workbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(SHEET_NAME)
        .context("name report worksheet")?;

    let header_format = Format::new().set_bold();
    for (col, header) in REPORT_HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .with_context(|| format!("write header {header}"))?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let row_num = u32::try_from(idx + 1).context("too many report rows")?;
        for (col, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_num, col as u16, value)
                .with_context(|| format!("write row {row_num}"))?;
        }
    }

    for (col, header) in REPORT_HEADERS.iter().enumerate() {
        let widest = rows
            .iter()
            .map(|row| row[col].chars().count())
            .chain(std::iter::once(header.chars().count()))
            .max()
            .unwrap_or(MIN_COLUMN_WIDTH);
        let width = (widest + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        worksheet
            .set_column_width(col as u16, width as f64)
            .context("set column width")?;
    }

    worksheet.set_freeze_panes(1, 0).context("freeze header row")?;
    let last_row = u32::try_from(rows.len()).context("too many report rows")?;
    worksheet
        .autofilter(0, 0, last_row, (REPORT_HEADERS.len() - 1) as u16)
        .context("set autofilter")?;

    workbook
        .save(path)
        .with_context(|| format!("write {}", path.display()))?;

    info!(path = %path.display(), rows = rows.len(), "xlsx report written");
    Ok(())
}

/// Reads the divergence worksheet back as text rows, header excluded.
pub fn read_xlsx_report(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("open {}", path.display()))?;
    let range = workbook
        .worksheet_range(SHEET_NAME)
        .with_context(|| format!("read sheet {SHEET_NAME} of {}", path.display()))?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| anyhow!("{} has no header row", path.display()))?
        .iter()
        .map(ToString::to_string)
        .collect();
    if header != REPORT_HEADERS {
        return Err(anyhow!(
            "unexpected report header in {}: {}",
            path.display(),
            header.join(", ")
        ));
    }

    Ok(rows
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect())
}
