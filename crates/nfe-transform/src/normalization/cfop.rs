//! CFOP normalization.

use nfe_model::CellValue;

/// Number of digits in a CFOP.
pub const CFOP_LEN: usize = 4;

/// Canonicalizes a CFOP: keeps only digits, takes the rightmost four and
/// left-pads with zeros.
///
/// Input without any digit yields an empty string, which never matches a
/// rule.
pub fn normalize_cfop(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return String::new();
    }
    let start = digits.len().saturating_sub(CFOP_LEN);
    let tail: String = digits[start..].iter().collect();
    format!("{tail:0>width$}", width = CFOP_LEN)
}

/// Normalizes a CFOP cell from a rule table.
pub fn normalize_cfop_cell(value: &CellValue) -> String {
    normalize_cfop(&value.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(normalize_cfop("5.102"), "5102");
        assert_eq!(normalize_cfop(" 6-108 "), "6108");
    }

    #[test]
    fn test_keeps_rightmost_digits() {
        assert_eq!(normalize_cfop("CFOP 15102"), "5102");
    }

    #[test]
    fn test_pads_short_values() {
        assert_eq!(normalize_cfop("102"), "0102");
        assert_eq!(normalize_cfop("7"), "0007");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_cfop(""), "");
        assert_eq!(normalize_cfop("n/a"), "");
    }

    #[test]
    fn test_numeric_cells() {
        assert_eq!(normalize_cfop_cell(&CellValue::Number(5102.0)), "5102");
        assert_eq!(normalize_cfop_cell(&CellValue::Text("5.102".into())), "5102");
        assert_eq!(normalize_cfop_cell(&CellValue::Missing), "");
    }
}
