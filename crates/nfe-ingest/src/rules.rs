//! Rule table construction from a `DataFrame`.

use std::path::Path;

use polars::prelude::{AnyValue, Column, DataFrame};
use tracing::{debug, info, warn};

use nfe_model::{CellValue, RuleEntry, RuleTable, RuleTableBuilder};
use nfe_transform::{normalize_cfop, normalize_icms_rule_value, normalize_tax_code};

use crate::error::{Result, RuleTableError};
use crate::table::read_rule_frame;

/// Accepted spellings of the CFOP header.
pub const CFOP_HEADERS: &[&str] = &["cfop"];

/// Accepted spellings of the expected ICMS CST header, in priority order.
pub const ICMS_HEADERS: &[&str] = &["cst icms (exemplo)", "cst icms"];

/// Accepted spellings of the expected PIS/COFINS CST header, in priority
/// order.
pub const PIS_COFINS_HEADERS: &[&str] = &["cst pis/cofins", "cst pis_cofins"];

/// Column positions of the three logical rule columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleColumns {
    pub cfop: usize,
    pub icms: usize,
    pub pis_cofins: usize,
}

impl RuleColumns {
    /// Resolves the logical columns against the frame headers.
    pub fn resolve(df: &DataFrame) -> std::result::Result<Self, RuleTableError> {
        let found: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.as_str().to_string())
            .collect();
        let keys: Vec<String> = found.iter().map(|name| header_key(name)).collect();

        let lookup = |accepted: &[&str]| {
            accepted
                .iter()
                .find_map(|spelling| keys.iter().position(|key| key == spelling))
        };

        let cfop = lookup(CFOP_HEADERS);
        let icms = lookup(ICMS_HEADERS);
        let pis_cofins = lookup(PIS_COFINS_HEADERS);

        match (cfop, icms, pis_cofins) {
            (Some(cfop), Some(icms), Some(pis_cofins)) => Ok(Self {
                cfop,
                icms,
                pis_cofins,
            }),
            _ => {
                let mut missing = Vec::new();
                if cfop.is_none() {
                    missing.push("CFOP".to_string());
                }
                if icms.is_none() {
                    missing.push("CST ICMS".to_string());
                }
                if pis_cofins.is_none() {
                    missing.push("CST PIS/COFINS".to_string());
                }
                Err(RuleTableError::UnrecognizedSchema { missing, found })
            }
        }
    }
}

/// Normalized header used for matching.
fn header_key(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

fn cell_at(column: &Column, idx: usize) -> CellValue {
    CellValue::from_any(column.get(idx).unwrap_or(AnyValue::Null))
}

/// Builds a frozen rule table from a loaded frame.
///
/// Rows whose CFOP normalizes to empty are skipped. When the same CFOP
/// appears more than once the last row wins.
pub fn build_rule_table(df: &DataFrame) -> std::result::Result<RuleTable, RuleTableError> {
    if df.width() == 0 {
        return Err(RuleTableError::Empty);
    }
    let positions = RuleColumns::resolve(df)?;
    if df.height() == 0 {
        return Err(RuleTableError::Empty);
    }

    let columns = df.get_columns();
    let cfop_column = &columns[positions.cfop];
    let icms_column = &columns[positions.icms];
    let pis_cofins_column = &columns[positions.pis_cofins];

    let mut builder = RuleTableBuilder::new();
    let mut skipped = 0usize;

    for idx in 0..df.height() {
        let cfop_cell = cell_at(cfop_column, idx);
        let cfop_display = cfop_cell.display();
        let cfop = normalize_cfop(&cfop_display);
        if cfop.is_empty() {
            skipped += 1;
            debug!(row = idx + 1, "rule row skipped: no CFOP digits");
            continue;
        }

        let entry = RuleEntry {
            cfop,
            icms_expected: normalize_icms_rule_value(&cell_at(icms_column, idx)),
            pis_cofins_expected: normalize_tax_code(&cell_at(pis_cofins_column, idx)),
            cfop_display,
        };
        if let Some(previous) = builder.insert(entry) {
            warn!(
                cfop = %previous.cfop,
                row = idx + 1,
                "duplicate CFOP in rule table; later row replaces earlier one"
            );
        }
    }

    if builder.is_empty() {
        return Err(RuleTableError::NoParseableCfop { rows: df.height() });
    }

    let table = builder.build();
    info!(
        rules = table.len(),
        skipped,
        overwritten = table.overwritten().len(),
        "rule table built"
    );
    Ok(table)
}

/// Reads a rule table file and builds the lookup in one step.
pub fn load_rule_table(path: &Path, sheet: Option<&str>) -> Result<RuleTable> {
    let df = read_rule_frame(path, sheet)?;
    Ok(build_rule_table(&df)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    fn text_frame(headers: [&str; 3], rows: &[[&str; 3]]) -> DataFrame {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let values: Vec<String> = rows.iter().map(|row| row[idx].to_string()).collect();
                Series::new((*header).into(), values).into_column()
            })
            .collect();
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn test_resolve_prefers_first_spelling() {
        let df = DataFrame::new(vec![
            Series::new("CST ICMS".into(), vec!["1"]).into_column(),
            Series::new("CFOP".into(), vec!["5102"]).into_column(),
            Series::new("CST ICMS (exemplo)".into(), vec!["00"]).into_column(),
            Series::new("cst pis_cofins".into(), vec!["01"]).into_column(),
        ])
        .unwrap();

        let columns = RuleColumns::resolve(&df).unwrap();
        assert_eq!(columns.cfop, 1);
        assert_eq!(columns.icms, 2);
        assert_eq!(columns.pis_cofins, 3);
    }

    #[test]
    fn test_resolve_is_case_and_space_insensitive() {
        let df = text_frame([" Cfop ", "CST Icms", "CST PIS/COFINS"], &[["5102", "0", "1"]]);
        assert!(RuleColumns::resolve(&df).is_ok());
    }

    #[test]
    fn test_unrecognized_schema_lists_missing() {
        let df = text_frame(["CFOP", "ICMS", "PIS"], &[["5102", "0", "1"]]);
        let err = build_rule_table(&df).unwrap_err();
        match err {
            RuleTableError::UnrecognizedSchema { missing, found } => {
                assert_eq!(missing, vec!["CST ICMS", "CST PIS/COFINS"]);
                assert_eq!(found, vec!["CFOP", "ICMS", "PIS"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_builds_normalized_entries() {
        let df = text_frame(
            ["CFOP", "CST ICMS", "CST PIS/COFINS"],
            &[["5.102", "0", "1.0"], ["6108", "100", "6"], ["1.202", "60", ""]],
        );
        let table = build_rule_table(&df).unwrap();

        let entry = table.get("5102").unwrap();
        assert_eq!(entry.cfop_display, "5.102");
        assert_eq!(entry.icms_expected.as_deref(), Some("00"));
        assert_eq!(entry.pis_cofins_expected.as_deref(), Some("01"));

        let any_icms = table.get("6108").unwrap();
        assert_eq!(any_icms.icms_expected, None);
        assert_eq!(any_icms.pis_cofins_expected.as_deref(), Some("06"));

        let no_pis = table.get("1202").unwrap();
        assert_eq!(no_pis.icms_expected.as_deref(), Some("60"));
        assert_eq!(no_pis.pis_cofins_expected, None);
    }

    #[test]
    fn test_duplicate_cfop_last_wins() {
        let df = text_frame(
            ["CFOP", "CST ICMS", "CST PIS/COFINS"],
            &[["5102", "00", "01"], ["5.102", "20", "04"]],
        );
        let table = build_rule_table(&df).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("5102").unwrap().icms_expected.as_deref(), Some("20"));
        assert_eq!(table.overwritten().to_vec(), vec!["5102".to_string()]);
    }

    #[test]
    fn test_rows_without_cfop_are_skipped() {
        let df = text_frame(
            ["CFOP", "CST ICMS", "CST PIS/COFINS"],
            &[["", "00", "01"], ["n/a", "00", "01"], ["5102", "00", "01"]],
        );
        let table = build_rule_table(&df).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_no_parseable_cfop() {
        let df = text_frame(
            ["CFOP", "CST ICMS", "CST PIS/COFINS"],
            &[["", "00", "01"], ["-", "00", "01"]],
        );
        assert_eq!(
            build_rule_table(&df).unwrap_err(),
            RuleTableError::NoParseableCfop { rows: 2 }
        );
    }

    #[test]
    fn test_empty_frames() {
        assert_eq!(
            build_rule_table(&DataFrame::empty()).unwrap_err(),
            RuleTableError::Empty
        );
        let df = text_frame(["CFOP", "CST ICMS", "CST PIS/COFINS"], &[]);
        assert_eq!(build_rule_table(&df).unwrap_err(), RuleTableError::Empty);
    }

    #[test]
    fn test_numeric_cfop_column_displays_without_fraction() {
        let df = DataFrame::new(vec![
            Series::new("CFOP".into(), vec![5102.0_f64]).into_column(),
            Series::new("CST ICMS".into(), vec![0.0_f64]).into_column(),
            Series::new("CST PIS/COFINS".into(), vec![1.0_f64]).into_column(),
        ])
        .unwrap();
        let table = build_rule_table(&df).unwrap();
        let entry = table.get("5102").unwrap();
        assert_eq!(entry.cfop_display, "5102");
        assert_eq!(entry.icms_expected.as_deref(), Some("00"));
        assert_eq!(entry.pis_cofins_expected.as_deref(), Some("01"));
    }
}
