//! Divergence records and their reasons.
//!
//! Reason messages are in Portuguese; they are what accounting reads.

use std::fmt;

use serde::{Deserialize, Serialize};

use nfe_model::{InvoiceLine, RuleEntry};

/// Separator between reasons in a justification.
pub const REASON_SEPARATOR: &str = "; ";

/// Why a line diverges from the rule table. Each variant carries only the
/// values its message needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DivergenceReason {
    /// A CSOSN code on a taxpayer outside Simples Nacional.
    SimplifiedRegimeCode,
    IcmsMismatch {
        observed: String,
        expected: String,
        cfop_display: String,
    },
    PisMismatch { observed: String, expected: String },
    CofinsMismatch { observed: String, expected: String },
}

impl DivergenceReason {
    /// Stable identifier for filtering and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SimplifiedRegimeCode => "REGIME_CSOSN",
            Self::IcmsMismatch { .. } => "ICMS_CST",
            Self::PisMismatch { .. } => "PIS_CST",
            Self::CofinsMismatch { .. } => "COFINS_CST",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::SimplifiedRegimeCode => {
                "ICMS com CSOSN (Simples Nacional) em contribuinte Lucro Presumido".to_string()
            }
            Self::IcmsMismatch {
                observed,
                expected,
                cfop_display,
            } => format!(
                "ICMS CST {observed} difere do esperado {expected} para CFOP {cfop_display}"
            ),
            Self::PisMismatch { observed, expected } => {
                format!("PIS CST {observed} difere do esperado {expected}")
            }
            Self::CofinsMismatch { observed, expected } => {
                format!("COFINS CST {observed} difere do esperado {expected}")
            }
        }
    }
}

impl fmt::Display for DivergenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// One invoice line that disagrees with the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
    pub invoice_number: String,
    pub item_index: String,
    pub cfop_raw: String,
    /// CFOP as displayed by the matched rule.
    pub cfop_rule_display: Option<String>,
    pub icms_observed: Option<String>,
    pub pis_observed: Option<String>,
    pub cofins_observed: Option<String>,
    pub icms_expected: Option<String>,
    pub pis_cofins_expected: Option<String>,
    /// Never empty.
    pub reasons: Vec<DivergenceReason>,
}

impl Divergence {
    /// Builds a record, or `None` when there is nothing to report.
    pub fn new(
        line: &InvoiceLine,
        rule: Option<&RuleEntry>,
        reasons: Vec<DivergenceReason>,
    ) -> Option<Self> {
        if reasons.is_empty() {
            return None;
        }
        Some(Self {
            invoice_number: line.invoice_number.clone(),
            item_index: line.item_index.clone(),
            cfop_raw: line.cfop_raw.clone(),
            cfop_rule_display: rule.map(|rule| rule.cfop_display.clone()),
            icms_observed: line.icms_code.clone(),
            pis_observed: line.pis_cst.clone(),
            cofins_observed: line.cofins_cst.clone(),
            icms_expected: rule.and_then(|rule| rule.icms_expected.clone()),
            pis_cofins_expected: rule.and_then(|rule| rule.pis_cofins_expected.clone()),
            reasons,
        })
    }

    /// All reason messages joined in check order.
    pub fn justification(&self) -> String {
        self.reasons
            .iter()
            .map(DivergenceReason::message)
            .collect::<Vec<_>>()
            .join(REASON_SEPARATOR)
    }
}
