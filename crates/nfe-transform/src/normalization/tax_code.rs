//! CST normalization.
//!
//! The two rule-table columns are normalized differently. PIS/COFINS codes
//! are always two digits, so single digits are padded. The ICMS column holds
//! *example* values: `0` stands for `00` and `100` is a sentinel for "any
//! code", and other values are kept as written because observed ICMS codes
//! are not always two digits.

use nfe_model::{CellValue, format_numeric};

use super::numeric::{integral, parse_numeric};

/// Sentinel in the ICMS example column meaning "no ICMS rule".
pub const ICMS_ANY_CODE: i64 = 100;

/// Normalizes a tax-situation code from the rule table.
///
/// Blank → `None`. Numeric values (including text such as `"1.0"`) are
/// truncated to integers; other text is kept trimmed. Single digits are
/// zero-padded: `"1"` and `"1.0"` both become `"01"`.
pub fn normalize_tax_code(value: &CellValue) -> Option<String> {
    let code = match value {
        CellValue::Missing => return None,
        CellValue::Number(n) if n.is_nan() => return None,
        CellValue::Number(n) => integral(*n).map_or_else(|| format_numeric(*n), |i| i.to_string()),
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            parse_numeric(trimmed)
                .and_then(integral)
                .map_or_else(|| trimmed.to_string(), |i| i.to_string())
        }
    };
    Some(pad_single_digit(code))
}

/// Normalizes the expected-ICMS example column.
///
/// Blank or NaN → `None`; `0` → `"00"`; `100` → `None`; other numbers →
/// their integer form, unpadded; other text → trimmed text.
pub fn normalize_icms_rule_value(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Missing => None,
        CellValue::Number(n) if n.is_nan() => None,
        CellValue::Number(n) => match integral(*n) {
            Some(code) => icms_from_integer(code),
            None => Some(format_numeric(*n)),
        },
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            match parse_numeric(trimmed).and_then(integral) {
                Some(code) => icms_from_integer(code),
                None => Some(trimmed.to_string()),
            }
        }
    }
}

/// Normalizes a code read from invoice XML: trimmed, blank → `None`.
/// Observed codes are compared as written and never padded.
pub fn normalize_observed_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn icms_from_integer(code: i64) -> Option<String> {
    match code {
        0 => Some("00".to_string()),
        ICMS_ANY_CODE => None,
        other => Some(other.to_string()),
    }
}

fn pad_single_digit(code: String) -> String {
    if code.len() == 1 && code.chars().all(|ch| ch.is_ascii_digit()) {
        format!("0{code}")
    } else {
        code
    }
}
