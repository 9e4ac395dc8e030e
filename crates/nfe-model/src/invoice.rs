use serde::{Deserialize, Serialize};

/// Which family of ICMS situation code a line item carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IcmsCodeKind {
    /// Regular-regime situation code (`CST`).
    Cst,
    /// Simples Nacional situation code (`CSOSN`).
    Csosn,
    /// The ICMS group carried neither code.
    #[default]
    Absent,
}

impl IcmsCodeKind {
    /// Tag name of the code element inside an ICMS group.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            Self::Cst => Some("CST"),
            Self::Csosn => Some("CSOSN"),
            Self::Absent => None,
        }
    }
}

/// One `det` line item extracted from an NF-e document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Invoice number (`ide/nNF`).
    pub invoice_number: String,
    /// `nItem` attribute of the line; empty when absent.
    pub item_index: String,
    /// CFOP as written in the XML, trimmed.
    pub cfop_raw: String,
    /// Normalized four-digit CFOP, or empty when the XML had none.
    pub cfop: String,
    /// Local name of the ICMS regime group (e.g. `ICMS00`, `ICMSSN102`).
    pub icms_group: Option<String>,
    pub icms_code: Option<String>,
    pub icms_code_kind: IcmsCodeKind,
    pub pis_cst: Option<String>,
    pub cofins_cst: Option<String>,
}

impl InvoiceLine {
    /// True when the ICMS group uses a Simples Nacional code.
    pub fn uses_csosn(&self) -> bool {
        self.icms_code_kind == IcmsCodeKind::Csosn
    }
}
