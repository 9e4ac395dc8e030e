//! Tax regime check.

use nfe_model::InvoiceLine;

use crate::divergence::DivergenceReason;

/// Flags Simples Nacional codes. Independent of the rule table.
pub fn check(line: &InvoiceLine) -> Option<DivergenceReason> {
    line.uses_csosn()
        .then_some(DivergenceReason::SimplifiedRegimeCode)
}
