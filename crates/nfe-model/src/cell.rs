//! Spreadsheet cell values.
//!
//! Rule tables arrive from CSV and workbook files where the same logical
//! column can hold numbers, text, or nothing at all. `CellValue` is the
//! shape the normalizers consume.

use polars::prelude::AnyValue;
use serde::{Deserialize, Serialize};

/// A single cell from a rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Null, NaN, or an absent cell.
    Missing,
    /// A numeric cell (workbooks store integer codes as floats).
    Number(f64),
    /// A text cell, untrimmed.
    Text(String),
}

impl CellValue {
    /// Builds a cell from text, mapping the empty string to `Missing`.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Missing
        } else {
            Self::Text(value)
        }
    }

    /// Converts a Polars value. Null and NaN become `Missing`.
    pub fn from_any(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Self::Missing,
            AnyValue::Int8(v) => Self::Number(f64::from(v)),
            AnyValue::Int16(v) => Self::Number(f64::from(v)),
            AnyValue::Int32(v) => Self::Number(f64::from(v)),
            AnyValue::Int64(v) => Self::Number(v as f64),
            AnyValue::UInt8(v) => Self::Number(f64::from(v)),
            AnyValue::UInt16(v) => Self::Number(f64::from(v)),
            AnyValue::UInt32(v) => Self::Number(f64::from(v)),
            AnyValue::UInt64(v) => Self::Number(v as f64),
            AnyValue::Float32(v) if v.is_nan() => Self::Missing,
            AnyValue::Float32(v) => Self::Number(f64::from(v)),
            AnyValue::Float64(v) if v.is_nan() => Self::Missing,
            AnyValue::Float64(v) => Self::Number(v),
            AnyValue::String(s) => Self::text(s),
            AnyValue::StringOwned(s) => Self::text(s.as_str()),
            other => Self::text(any_to_string(other)),
        }
    }

    /// Returns true for `Missing` and for whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Number(v) => v.is_nan(),
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    /// Text rendering used for display columns. Integral numbers drop the
    /// fractional part so `5102.0` renders as `5102`.
    pub fn display(&self) -> String {
        match self {
            Self::Missing => String::new(),
            Self::Number(v) => format_numeric(*v),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Self::Missing
        } else {
            Self::Number(value)
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// Converts a Polars `AnyValue` to its string representation.
///
/// Returns an empty string for `Null`; floats are formatted without
/// trailing zeros.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => {
            let s = other.to_string();
            if s.starts_with('"') && s.ends_with('"') && s.len() >= 2 {
                s[1..s.len() - 1].to_string()
            } else {
                s
            }
        }
    }
}

/// Formats a float without trailing zeros after the decimal point.
///
/// Integer-valued floats like 40.0 are formatted as "40", not "4".
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.');
        if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        s
    }
}
