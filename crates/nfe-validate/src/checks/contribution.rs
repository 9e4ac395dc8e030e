//! PIS and COFINS CST checks.
//!
//! Both contributions are held to the same expected code.

use nfe_model::{InvoiceLine, RuleEntry};

use crate::divergence::DivergenceReason;

fn mismatch(observed: Option<&String>, rule: &RuleEntry) -> Option<(String, String)> {
    let expected = rule.pis_cofins_expected.as_ref()?;
    let observed = observed?;
    (observed != expected).then(|| (observed.clone(), expected.clone()))
}

pub fn check_pis(line: &InvoiceLine, rule: &RuleEntry) -> Option<DivergenceReason> {
    mismatch(line.pis_cst.as_ref(), rule)
        .map(|(observed, expected)| DivergenceReason::PisMismatch { observed, expected })
}

pub fn check_cofins(line: &InvoiceLine, rule: &RuleEntry) -> Option<DivergenceReason> {
    mismatch(line.cofins_cst.as_ref(), rule)
        .map(|(observed, expected)| DivergenceReason::CofinsMismatch { observed, expected })
}
