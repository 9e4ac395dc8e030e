//! Normalizers for the values the auditor compares.
//!
//! - [`cfop`]: four-digit CFOP keys
//! - [`tax_code`]: CST codes from the rule table and from invoice XML
//! - [`numeric`]: numeric coercion shared by the code normalizers

pub mod cfop;
pub mod numeric;
pub mod tax_code;

pub use cfop::{normalize_cfop, normalize_cfop_cell};
pub use numeric::parse_numeric;
pub use tax_code::{normalize_icms_rule_value, normalize_observed_code, normalize_tax_code};
