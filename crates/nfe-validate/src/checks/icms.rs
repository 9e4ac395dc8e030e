//! ICMS CST check.

use nfe_model::{InvoiceLine, RuleEntry};

use crate::divergence::DivergenceReason;

/// Compares the observed ICMS code with the rule's expectation.
///
/// Skipped when the rule accepts any ICMS code or the line carries none.
pub fn check(line: &InvoiceLine, rule: &RuleEntry) -> Option<DivergenceReason> {
    let expected = rule.icms_expected.as_ref()?;
    let observed = line.icms_code.as_ref()?;
    (observed != expected).then(|| DivergenceReason::IcmsMismatch {
        observed: observed.clone(),
        expected: expected.clone(),
        cfop_display: rule.cfop_display.clone(),
    })
}
