//! Batch audit over many invoice documents.

use std::fmt::Display;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use nfe_model::{DocumentError, InvoiceLine, RuleTable};

use crate::divergence::{Divergence, DivergenceReason};
use crate::engine::evaluate_line;

/// Placeholder logged in place of invoice values.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Result of auditing a batch of documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditOutcome {
    /// Documents that parsed and were reconciled.
    pub documents_processed: usize,
    pub lines_checked: usize,
    /// In document order, then line order.
    pub divergences: Vec<Divergence>,
    /// Documents that could not be parsed, in input order.
    pub document_errors: Vec<DocumentError>,
}

impl AuditOutcome {
    /// True when nothing was flagged and every document parsed.
    pub fn is_clean(&self) -> bool {
        self.divergences.is_empty() && self.document_errors.is_empty()
    }
}

/// Reconciles documents against a frozen rule table.
#[derive(Debug)]
pub struct Auditor {
    rules: RuleTable,
    log_data: bool,
}

impl Auditor {
    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules,
            log_data: false,
        }
    }

    /// Allows invoice values (numbers and codes) in debug logs.
    pub fn with_data_logging(mut self, enable: bool) -> Self {
        self.log_data = enable;
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Returns `value` when data logging is enabled, otherwise
    /// [`REDACTED_VALUE`].
    pub fn redact<'a>(&self, value: &'a str) -> &'a str {
        if self.log_data { value } else { REDACTED_VALUE }
    }

    /// Audits parsed documents.
    ///
    /// Each item pairs a document identifier with its extraction result. A
    /// failed extraction is recorded and the batch continues.
    pub fn audit<I, E>(&self, documents: I) -> AuditOutcome
    where
        I: IntoIterator<Item = (String, Result<Vec<InvoiceLine>, E>)>,
        E: Display,
    {
        let span = info_span!("audit", rules = self.rules.len());
        let _guard = span.enter();
        let start = Instant::now();

        let mut outcome = AuditOutcome::default();

        for (document, extracted) in documents {
            let lines = match extracted {
                Ok(lines) => lines,
                Err(error) => {
                    warn!(document = %document, error = %error, "document skipped");
                    outcome
                        .document_errors
                        .push(DocumentError::new(document, error.to_string()));
                    continue;
                }
            };

            outcome.documents_processed += 1;
            outcome.lines_checked += lines.len();

            for line in &lines {
                if let Some(divergence) = evaluate_line(&self.rules, line) {
                    let codes = divergence
                        .reasons
                        .iter()
                        .map(DivergenceReason::code)
                        .collect::<Vec<_>>()
                        .join(",");
                    let justification = divergence.justification();
                    debug!(
                        document = %document,
                        invoice_number = self.redact(&divergence.invoice_number),
                        item = %divergence.item_index,
                        cfop = self.redact(&line.cfop),
                        reasons = %codes,
                        justification = self.redact(&justification),
                        "divergence found"
                    );
                    outcome.divergences.push(divergence);
                }
            }
        }

        info!(
            documents = outcome.documents_processed,
            failed = outcome.document_errors.len(),
            lines = outcome.lines_checked,
            divergences = outcome.divergences.len(),
            duration_ms = start.elapsed().as_millis(),
            "audit complete"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use nfe_model::{IcmsCodeKind, RuleEntry};

    fn rules() -> RuleTable {
        RuleTable::from_entries([RuleEntry {
            cfop: "5102".to_string(),
            icms_expected: Some("00".to_string()),
            pis_cofins_expected: Some("01".to_string()),
            cfop_display: "5102".to_string(),
        }])
    }

    fn line(invoice: &str, item: &str, icms: &str) -> InvoiceLine {
        InvoiceLine {
            invoice_number: invoice.to_string(),
            item_index: item.to_string(),
            cfop_raw: "5102".to_string(),
            cfop: "5102".to_string(),
            icms_group: Some("ICMS00".to_string()),
            icms_code: Some(icms.to_string()),
            icms_code_kind: IcmsCodeKind::Cst,
            pis_cst: Some("01".to_string()),
            cofins_cst: Some("01".to_string()),
        }
    }

    #[test]
    fn test_failed_document_does_not_stop_batch() {
        let documents = vec![
            ("a.xml".to_string(), Ok(vec![line("1", "1", "20")])),
            ("b.xml".to_string(), Err("malformed XML at byte 7")),
            (
                "c.xml".to_string(),
                Ok(vec![line("3", "1", "00"), line("3", "2", "40")]),
            ),
        ];

        let outcome = Auditor::new(rules()).audit(documents);

        assert_eq!(outcome.documents_processed, 2);
        assert_eq!(outcome.lines_checked, 3);
        assert_eq!(
            outcome.document_errors,
            vec![DocumentError::new("b.xml", "malformed XML at byte 7")]
        );
        let keys: Vec<_> = outcome
            .divergences
            .iter()
            .map(|d| (d.invoice_number.as_str(), d.item_index.as_str()))
            .collect();
        assert_eq!(keys, vec![("1", "1"), ("3", "2")]);
        assert!(!outcome.is_clean());
    }

    #[test]
    fn test_clean_batch() {
        let documents = vec![("a.xml".to_string(), Ok::<_, String>(vec![line("1", "1", "00")]))];
        let outcome = Auditor::new(rules()).with_data_logging(true).audit(documents);
        assert!(outcome.is_clean());
        assert_eq!(outcome.lines_checked, 1);
    }

    #[test]
    fn test_redaction() {
        let auditor = Auditor::new(rules());
        assert_eq!(auditor.redact("1234"), REDACTED_VALUE);
        let auditor = auditor.with_data_logging(true);
        assert_eq!(auditor.redact("1234"), "1234");
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn captured_logs(auditor: &Auditor) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let documents = vec![(
                "a.xml".to_string(),
                Ok::<_, String>(vec![line("98765", "1", "20")]),
            )];
            auditor.audit(documents);
        });
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_divergence_log_hides_invoice_values() {
        let logs = captured_logs(&Auditor::new(rules()));
        assert!(logs.contains("divergence found"));
        assert!(logs.contains(REDACTED_VALUE));
        assert!(!logs.contains("98765"));
        assert!(!logs.contains("5102"));

        let logs = captured_logs(&Auditor::new(rules()).with_data_logging(true));
        assert!(logs.contains("98765"));
        assert!(logs.contains("5102"));
    }
}
