//! Data model for the NF-e CST/CFOP auditor.
//!
//! Everything here is a value type: rule entries built from the reference
//! spreadsheet, line items extracted from invoice XML, and the per-document
//! failure record reported alongside divergences.

pub mod cell;
pub mod invoice;
pub mod processing;
pub mod rule;

pub use cell::{CellValue, any_to_string, format_numeric};
pub use invoice::{IcmsCodeKind, InvoiceLine};
pub use processing::DocumentError;
pub use rule::{RuleEntry, RuleTable, RuleTableBuilder};
