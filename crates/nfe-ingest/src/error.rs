//! Error types for NF-e ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading audit inputs.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Rule Table Parsing Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed to open or read a workbook.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// Requested sheet does not exist.
    #[error("sheet '{sheet}' not found in {path}")]
    SheetNotFound { sheet: String, path: PathBuf },

    /// Workbook contains no sheets.
    #[error("workbook has no sheets: {path}")]
    EmptyWorkbook { path: PathBuf },

    /// File extension is not a supported rule table format.
    #[error(
        "unsupported rule table format: {path} (expected .csv, .xlsx, .xlsm, .xlsb, .xls or .ods)"
    )]
    UnsupportedFormat { path: PathBuf },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    // === Rule Table Errors ===
    /// The rule table cannot be used for reconciliation.
    #[error(transparent)]
    MalformedRuleTable(#[from] RuleTableError),
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// A rule table that cannot drive a reconciliation. Fatal to the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleTableError {
    /// One or more logical columns matched none of the accepted headers.
    #[error(
        "unrecognized rule-table schema: missing {} column(s); found headers [{}]",
        .missing.join(", "),
        .found.join(", ")
    )]
    UnrecognizedSchema {
        missing: Vec<String>,
        found: Vec<String>,
    },

    /// The table has no rows (or no columns at all).
    #[error("rule table is empty")]
    Empty,

    /// Not a single row yielded a CFOP.
    #[error("rule table has {rows} row(s) but no parseable CFOP")]
    NoParseableCfop { rows: usize },
}

/// A single invoice document that could not be parsed. Recovered per
/// document.
#[derive(Debug, Error)]
pub enum DocumentParseError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed XML.
    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    /// The document contains no element.
    #[error("document has no root element")]
    NoRootElement,

    /// No `ide/nNF` node, or an empty one.
    #[error("invoice number (ide/nNF) not found")]
    MissingInvoiceNumber,
}
