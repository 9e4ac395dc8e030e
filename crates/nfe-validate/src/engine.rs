//! Line evaluation.

use tracing::debug;

use nfe_model::{InvoiceLine, RuleTable};

use crate::checks::{contribution, icms, regime};
use crate::divergence::Divergence;

/// Evaluates one line against the rule table.
///
/// Checks run in a fixed order: regime, ICMS, PIS, COFINS. When the CFOP
/// has no rule only the regime check applies.
pub fn evaluate_line(rules: &RuleTable, line: &InvoiceLine) -> Option<Divergence> {
    let rule = rules.get(&line.cfop);

    let mut reasons = Vec::new();
    reasons.extend(regime::check(line));
    if let Some(rule) = rule {
        reasons.extend(icms::check(line, rule));
        reasons.extend(contribution::check_pis(line, rule));
        reasons.extend(contribution::check_cofins(line, rule));
    }

    Divergence::new(line, rule, reasons)
}

/// Evaluates every line, keeping line order.
pub fn reconcile(rules: &RuleTable, lines: &[InvoiceLine]) -> Vec<Divergence> {
    let divergences: Vec<Divergence> = lines
        .iter()
        .filter_map(|line| evaluate_line(rules, line))
        .collect();
    debug!(
        lines = lines.len(),
        divergences = divergences.len(),
        "lines reconciled"
    );
    divergences
}
