//! Code normalization for the NF-e auditor.
//!
//! Rule tables are hand-maintained spreadsheets: CFOPs show up as `5.102`,
//! `5102` or `5102.0`, and CST codes lose their leading zero when a
//! spreadsheet stores them as numbers. The functions here map every
//! spelling onto the canonical form used for lookups and comparisons.
//!
//! # Example
//!
//! ```
//! use nfe_model::CellValue;
//! use nfe_transform::{normalize_cfop, normalize_icms_rule_value, normalize_tax_code};
//!
//! assert_eq!(normalize_cfop("5.102"), "5102");
//! assert_eq!(normalize_tax_code(&CellValue::from("1.0")).as_deref(), Some("01"));
//! assert_eq!(normalize_icms_rule_value(&CellValue::Number(0.0)).as_deref(), Some("00"));
//! ```

pub mod normalization;

pub use normalization::{
    normalize_cfop, normalize_cfop_cell, normalize_icms_rule_value, normalize_observed_code,
    normalize_tax_code, parse_numeric,
};
