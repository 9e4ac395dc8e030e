//! Audit pipeline with explicit stages.
//!
//! 1. **Rules**: load and freeze the rule table (fatal on error)
//! 2. **Discover**: expand inputs into XML documents
//! 3. **Audit**: parse each document and reconcile its lines
//! 4. **Export**: write the divergence report

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use nfe_ingest::{DocumentParseError, collect_xml_inputs, load_rule_table, read_invoice_file};
use nfe_model::{InvoiceLine, RuleTable};
use nfe_report::write_report;
use nfe_validate::{AuditOutcome, Auditor};

use crate::types::{AuditConfig, AuditResult};

// ============================================================================
// Stage 1: Rules
// ============================================================================

pub fn load_rules(path: &Path, sheet: Option<&str>) -> Result<RuleTable> {
    let span = info_span!("rules", path = %path.display());
    let _guard = span.enter();
    let start = Instant::now();

    let rules = load_rule_table(path, sheet)
        .with_context(|| format!("load rule table {}", path.display()))?;

    info!(
        rules = rules.len(),
        duration_ms = start.elapsed().as_millis(),
        "rule table loaded"
    );
    Ok(rules)
}

// ============================================================================
// Stage 2: Discover
// ============================================================================

pub fn discover(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let documents = collect_xml_inputs(inputs).context("collect input documents")?;
    info!(documents = documents.len(), "input documents collected");
    Ok(documents)
}

// ============================================================================
// Stage 3: Audit
// ============================================================================

fn read_document(
    auditor: &Auditor,
    path: &Path,
) -> (String, Result<Vec<InvoiceLine>, DocumentParseError>) {
    let document = path.display().to_string();
    let lines = read_invoice_file(path);
    if let Ok(lines) = &lines {
        let invoice_number = lines
            .first()
            .map_or("", |line| line.invoice_number.as_str());
        debug!(
            document = %document,
            invoice_number = auditor.redact(invoice_number),
            lines = lines.len(),
            "document read"
        );
    }
    (document, lines)
}

/// Documents are read lazily, one at a time, in input order.
pub fn audit_documents(auditor: &Auditor, documents: &[PathBuf]) -> AuditOutcome {
    auditor.audit(documents.iter().map(|path| read_document(auditor, path)))
}

// ============================================================================
// Stage 4: Export
// ============================================================================

/// Writes the report when enabled and there is something to report.
pub fn export(config: &AuditConfig, outcome: &AuditOutcome) -> Result<Option<PathBuf>> {
    if !config.export || outcome.divergences.is_empty() {
        return Ok(None);
    }
    let path = config.output_path();
    let format = config.report_format();
    write_report(&path, format, &outcome.divergences)
        .with_context(|| format!("write report {}", path.display()))?;
    Ok(Some(path))
}

/// Runs every stage for one configuration.
pub fn run_audit(config: &AuditConfig) -> Result<AuditResult> {
    let span = info_span!("audit_run");
    let _guard = span.enter();
    let start = Instant::now();

    let rules = load_rules(&config.rules_path, config.sheet.as_deref())?;
    let rule_count = rules.len();
    let documents = discover(&config.inputs)?;

    let auditor = Auditor::new(rules).with_data_logging(config.log_data);
    let outcome = audit_documents(&auditor, &documents);
    let report = export(config, &outcome)?;

    info!(
        documents = documents.len(),
        divergences = outcome.divergences.len(),
        failed = outcome.document_errors.len(),
        duration_ms = start.elapsed().as_millis(),
        "audit run finished"
    );

    Ok(AuditResult {
        rules_path: config.rules_path.clone(),
        rule_count,
        documents_found: documents.len(),
        outcome,
        report,
        fail_on_divergence: config.fail_on_divergence,
    })
}
