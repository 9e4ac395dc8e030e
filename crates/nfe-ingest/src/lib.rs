//! NF-e auditor ingestion.
//!
//! This crate turns the two inputs of an audit into model values:
//!
//! - **Rule tables**: CSV or workbook files loaded into a Polars
//!   `DataFrame`, then built into a frozen [`RuleTable`](nfe_model::RuleTable)
//! - **Invoices**: NF-e XML parsed into an element tree, with the document
//!   namespace detected from the root element, then flattened into
//!   [`InvoiceLine`](nfe_model::InvoiceLine)s
//! - **Discovery**: expansion of input directories into XML files
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use nfe_ingest::{load_rule_table, read_invoice_file};
//!
//! let rules = load_rule_table(Path::new("regras.xlsx"), None)?;
//! let lines = read_invoice_file(Path::new("notas/35240112345678000199550010000012341000012345.xml"))?;
//! ```

mod discovery;
mod error;
pub mod invoice;
mod rules;
mod table;

// === Error Types ===
pub use error::{DocumentParseError, IngestError, Result, RuleTableError};

// === File Discovery ===
pub use discovery::{collect_xml_inputs, list_xml_files};

// === Rule Tables ===
pub use rules::{
    CFOP_HEADERS, ICMS_HEADERS, PIS_COFINS_HEADERS, RuleColumns, build_rule_table,
    load_rule_table,
};
pub use table::{RuleFileFormat, read_rule_frame};

// === Invoices ===
pub use invoice::{
    ContributionTax, MAX_DEPTH, Namespace, QName, XmlDocument, XmlElement,
    extract_invoice_lines, parse_document, parse_invoice, read_invoice_file,
};
