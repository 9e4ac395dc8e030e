//! CSV report.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use nfe_validate::Divergence;

use crate::common::{REPORT_HEADERS, ensure_parent, report_row};

pub fn write_csv_report(path: &Path, divergences: &[Divergence]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;

    writer
        .write_record(REPORT_HEADERS)
        .context("write csv header")?;
    for divergence in divergences {
        writer
            .write_record(report_row(divergence))
            .context("write csv row")?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;

    info!(path = %path.display(), rows = divergences.len(), "csv report written");
    Ok(())
}
