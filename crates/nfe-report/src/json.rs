//! JSON report.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use nfe_validate::Divergence;

use crate::common::ensure_parent;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    total: usize,
    divergences: Vec<JsonDivergence<'a>>,
}

#[derive(Serialize)]
struct JsonDivergence<'a> {
    #[serde(flatten)]
    divergence: &'a Divergence,
    justification: String,
}

pub fn write_json_report(path: &Path, divergences: &[Divergence]) -> Result<()> {
    ensure_parent(path)?;

    let report = JsonReport {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        total: divergences.len(),
        divergences: divergences
            .iter()
            .map(|divergence| JsonDivergence {
                divergence,
                justification: divergence.justification(),
            })
            .collect(),
    };

    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report).context("serialize json report")?;
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;

    info!(path = %path.display(), rows = divergences.len(), "json report written");
    Ok(())
}
