//! Rule table file reading.
//!
//! CSV files go through Polars with every column read as text so codes like
//! `01` keep their leading zero. Workbooks go through calamine and are
//! assembled into a `DataFrame` column by column.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use polars::prelude::*;
use tracing::debug;

use nfe_model::CellValue;

use crate::error::{IngestError, Result};

/// Supported rule table containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFileFormat {
    Csv,
    Workbook,
}

impl RuleFileFormat {
    /// Detects the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Workbook),
            _ => None,
        }
    }
}

/// Reads a rule table file into a `DataFrame`.
///
/// `sheet` selects a worksheet by name; it is ignored for CSV files. When no
/// sheet is given the first worksheet is used.
pub fn read_rule_frame(path: &Path, sheet: Option<&str>) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let df = match RuleFileFormat::from_path(path) {
        Some(RuleFileFormat::Csv) => read_csv_frame(path)?,
        Some(RuleFileFormat::Workbook) => read_workbook_frame(path, sheet)?,
        None => {
            return Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "rule table file loaded"
    );
    Ok(df)
}

/// Reads the header line, skipping a UTF-8 BOM.
fn read_header_line(path: &Path) -> Result<Option<String>> {
    let file = File::open(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let reader = BufReader::new(file);
    match reader.lines().next() {
        Some(line_result) => {
            let line = line_result.map_err(|e| IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok(Some(
                line.strip_prefix('\u{feff}').unwrap_or(&line).to_string(),
            ))
        }
        None => Ok(None),
    }
}

/// Spreadsheet exports with a Brazilian locale separate fields with `;`.
fn detect_separator(header: &str) -> u8 {
    if header.contains(';') && !header.contains(',') {
        b';'
    } else {
        b','
    }
}

fn read_csv_frame(path: &Path) -> Result<DataFrame> {
    let Some(header) = read_header_line(path)? else {
        return Ok(DataFrame::empty());
    };
    let separator = detect_separator(&header);

    let csv_error = |e: PolarsError| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(csv_error)?
        .finish()
        .map_err(csv_error)?;

    Ok(df)
}

fn read_workbook_frame(path: &Path, sheet: Option<&str>) -> Result<DataFrame> {
    let workbook_error = |message: String| IngestError::Workbook {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let sheet_names = workbook.sheet_names().to_vec();

    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|candidate| candidate.as_str() == name)
            .cloned()
            .ok_or_else(|| IngestError::SheetNotFound {
                sheet: name.to_string(),
                path: path.to_path_buf(),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| IngestError::EmptyWorkbook {
                path: path.to_path_buf(),
            })?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| workbook_error(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(DataFrame::empty());
    };

    let headers = unique_headers(header_row);
    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];

    for row in rows {
        let values: Vec<CellValue> = (0..headers.len())
            .map(|idx| row.get(idx).map_or(CellValue::Missing, cell_from_data))
            .collect();
        if values.iter().all(CellValue::is_blank) {
            continue;
        }
        for (column, value) in cells.iter_mut().zip(values) {
            column.push(value);
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(cells)
        .map(|(name, values)| build_column(name, &values))
        .collect();

    debug!(sheet = %sheet_name, "worksheet selected");
    Ok(DataFrame::new(columns)?)
}

/// Header names from the first worksheet row. Blank headers get a
/// positional name and repeated names get a numeric suffix.
fn unique_headers(row: &[Data]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::with_capacity(row.len());
    for (idx, cell) in row.iter().enumerate() {
        let base = match cell_from_data(cell).display() {
            name if name.is_empty() => format!("column_{}", idx + 1),
            name => name,
        };
        let mut name = base.clone();
        let mut suffix = 2;
        while headers.contains(&name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        headers.push(name);
    }
    headers
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Missing,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.clone()),
        Data::Float(f) => CellValue::from(*f),
        Data::Int(i) => CellValue::from(*i),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::from(dt.as_f64()),
    }
}

/// Numeric-only columns become `Float64`; anything holding text becomes
/// `String`.
fn build_column(name: &str, values: &[CellValue]) -> Column {
    let numeric_only = values
        .iter()
        .all(|value| matches!(value, CellValue::Missing | CellValue::Number(_)));

    if numeric_only {
        let data: Vec<Option<f64>> = values
            .iter()
            .map(|value| match value {
                CellValue::Number(n) => Some(*n),
                _ => None,
            })
            .collect();
        Series::new(name.into(), data).into_column()
    } else {
        let data: Vec<Option<String>> = values
            .iter()
            .map(|value| match value {
                CellValue::Missing => None,
                CellValue::Number(n) => Some(nfe_model::format_numeric(*n)),
                CellValue::Text(s) => Some(s.clone()),
            })
            .collect();
        Series::new(name.into(), data).into_column()
    }
}
