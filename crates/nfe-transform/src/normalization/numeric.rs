//! Numeric coercion for code cells.
//!
//! Only plain decimal notation is accepted. Thousands separators are not
//! stripped: a code cell reading `1,0` is kept as text rather than read
//! as ten.

/// Largest magnitude that is converted to an integer code.
const MAX_INTEGRAL: f64 = 1e15;

/// Parses a trimmed string as `f64`. Returns `None` for empty or
/// non-numeric input.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Truncates a finite number to an integer.
pub fn integral(value: f64) -> Option<i64> {
    if value.is_finite() && value.abs() < MAX_INTEGRAL {
        Some(value.trunc() as i64)
    } else {
        None
    }
}
