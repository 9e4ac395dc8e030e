//! Tabular view of divergences.

use anyhow::Result;
use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};

use nfe_validate::Divergence;

use crate::common::{REPORT_HEADERS, report_row};

/// Builds a frame with the report columns, one row per divergence.
pub fn divergence_frame(divergences: &[Divergence]) -> Result<DataFrame> {
    let rows: Vec<[String; 10]> = divergences.iter().map(report_row).collect();

    let columns = REPORT_HEADERS
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let values: Vec<String> = rows.iter().map(|row| row[col].clone()).collect();
            Series::new((*header).into(), values).into_column()
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}
