//! Line item extraction from NF-e documents.

use std::path::Path;

use tracing::debug;

use nfe_model::{IcmsCodeKind, InvoiceLine};
use nfe_transform::{normalize_cfop, normalize_observed_code};

use crate::error::DocumentParseError;

use super::namespace::Namespace;
use super::xml::{XmlDocument, XmlElement, parse_document};

/// ICMS code tags, searched in order inside the regime group.
const ICMS_CODE_KINDS: [IcmsCodeKind; 2] = [IcmsCodeKind::Cst, IcmsCodeKind::Csosn];

/// Federal contributions whose CST sits under a regime variant group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributionTax {
    Pis,
    Cofins,
}

impl ContributionTax {
    /// Tag of the tax branch under `imposto`.
    pub fn branch(self) -> &'static str {
        match self {
            Self::Pis => "PIS",
            Self::Cofins => "COFINS",
        }
    }

    /// Variant groups in lookup order.
    pub fn variants(self) -> &'static [&'static str] {
        match self {
            Self::Pis => &["PISAliq", "PISQtde", "PISNT", "PISOutr"],
            Self::Cofins => &["COFINSAliq", "COFINSQtde", "COFINSNT", "COFINSOutr"],
        }
    }

    /// Finds the CST of this contribution under a `det` element.
    ///
    /// The variant groups are tried in order; when none carries a code the
    /// first `CST` anywhere under the branch is used, even if blank.
    fn cst(self, det: &XmlElement, ns: &Namespace) -> Option<String> {
        let branch = ns.qualify(self.branch());
        let cst = ns.qualify("CST");

        self.variants()
            .iter()
            .find_map(|variant| {
                det.find_path(&[branch, ns.qualify(variant), cst])
                    .and_then(|code| normalize_observed_code(code.text()))
            })
            .or_else(|| {
                det.find_all(branch)
                    .find_map(|group| group.find(cst))
                    .and_then(|code| normalize_observed_code(code.text()))
            })
    }
}

/// ICMS regime group name, code and code family for one line.
fn icms_code(det: &XmlElement, ns: &Namespace) -> (Option<String>, Option<String>, IcmsCodeKind) {
    let Some(group) = det
        .find(ns.qualify("ICMS"))
        .and_then(XmlElement::first_child)
    else {
        return (None, None, IcmsCodeKind::Absent);
    };

    let code = ICMS_CODE_KINDS.iter().find_map(|kind| {
        let tag = kind.tag()?;
        group
            .find(ns.qualify(tag))
            .and_then(|element| normalize_observed_code(element.text()))
            .map(|code| (code, *kind))
    });

    match code {
        Some((code, kind)) => (Some(group.name.clone()), Some(code), kind),
        None => (Some(group.name.clone()), None, IcmsCodeKind::Absent),
    }
}

fn extract_line(det: &XmlElement, ns: &Namespace, invoice_number: &str) -> InvoiceLine {
    let cfop_raw = det
        .find(ns.qualify("CFOP"))
        .map(|element| element.text().to_string())
        .unwrap_or_default();
    let (icms_group, icms_code, icms_code_kind) = icms_code(det, ns);

    InvoiceLine {
        invoice_number: invoice_number.to_string(),
        item_index: det.attribute("nItem").unwrap_or_default().trim().to_string(),
        cfop: normalize_cfop(&cfop_raw),
        cfop_raw,
        icms_group,
        icms_code,
        icms_code_kind,
        pis_cst: ContributionTax::Pis.cst(det, ns),
        cofins_cst: ContributionTax::Cofins.cst(det, ns),
    }
}

/// Extracts every `det` line item of a parsed document, in document order.
pub fn extract_invoice_lines(document: &XmlDocument) -> Result<Vec<InvoiceLine>, DocumentParseError> {
    let ns = Namespace::detect(document);
    let root = document.root();

    let invoice_number = root
        .find_path(&[ns.qualify("ide"), ns.qualify("nNF")])
        .map(XmlElement::text)
        .filter(|number| !number.is_empty())
        .ok_or(DocumentParseError::MissingInvoiceNumber)?;

    let lines: Vec<InvoiceLine> = root
        .find_all(ns.qualify("det"))
        .map(|det| extract_line(det, &ns, invoice_number))
        .collect();

    debug!(
        namespace = ns.uri().unwrap_or("-"),
        lines = lines.len(),
        "invoice lines extracted"
    );
    Ok(lines)
}

/// Parses XML text and extracts its line items.
pub fn parse_invoice(xml: &str) -> Result<Vec<InvoiceLine>, DocumentParseError> {
    let document = parse_document(xml)?;
    extract_invoice_lines(&document)
}

/// Reads an NF-e file and extracts its line items.
pub fn read_invoice_file(path: &Path) -> Result<Vec<InvoiceLine>, DocumentParseError> {
    let xml = std::fs::read_to_string(path).map_err(|e| DocumentParseError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_invoice(&xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://www.portalfiscal.inf.br/nfe";

    fn invoice(det: &str) -> String {
        format!(
            r#"<nfeProc xmlns="{NS}"><NFe><infNFe><ide><nNF>1234</nNF></ide>{det}</infNFe></NFe></nfeProc>"#
        )
    }

    #[test]
    fn test_pis_variant_priority() {
        let xml = invoice(
            r#"<det nItem="1"><prod><CFOP>5102</CFOP></prod><imposto>
                <PIS><PISOutr><CST>99</CST></PISOutr><PISAliq><CST>01</CST></PISAliq></PIS>
            </imposto></det>"#,
        );
        let lines = parse_invoice(&xml).unwrap();
        assert_eq!(lines[0].pis_cst.as_deref(), Some("01"));
    }

    #[test]
    fn test_pis_fallback_to_any_cst() {
        let xml = invoice(
            r#"<det nItem="1"><imposto><PIS><PISST><CST>75</CST></PISST></PIS></imposto></det>"#,
        );
        let lines = parse_invoice(&xml).unwrap();
        assert_eq!(lines[0].pis_cst.as_deref(), Some("75"));
        assert_eq!(lines[0].cofins_cst, None);
    }

    #[test]
    fn test_pis_fallback_takes_first_cst_only() {
        let xml = invoice(
            r#"<det nItem="1"><imposto><PIS><PISST><CST></CST></PISST>
                <PISOutro><CST>75</CST></PISOutro></PIS></imposto></det>"#,
        );
        let lines = parse_invoice(&xml).unwrap();
        assert_eq!(lines[0].pis_cst, None);
    }

    #[test]
    fn test_blank_variant_code_falls_through() {
        let xml = invoice(
            r#"<det nItem="1"><imposto><COFINS><COFINSAliq><CST> </CST></COFINSAliq>
                <COFINSNT><CST>06</CST></COFINSNT></COFINS></imposto></det>"#,
        );
        let lines = parse_invoice(&xml).unwrap();
        assert_eq!(lines[0].cofins_cst.as_deref(), Some("06"));
    }

    #[test]
    fn test_icms_group_cst_before_csosn() {
        let xml = invoice(
            r#"<det nItem="1"><imposto><ICMS><ICMSSN102><orig>0</orig><CSOSN>102</CSOSN></ICMSSN102></ICMS></imposto></det>
               <det nItem="2"><imposto><ICMS><ICMS00><CST>00</CST></ICMS00></ICMS></imposto></det>"#,
        );
        let lines = parse_invoice(&xml).unwrap();
        assert_eq!(lines[0].icms_group.as_deref(), Some("ICMSSN102"));
        assert_eq!(lines[0].icms_code.as_deref(), Some("102"));
        assert_eq!(lines[0].icms_code_kind, IcmsCodeKind::Csosn);
        assert_eq!(lines[1].icms_code_kind, IcmsCodeKind::Cst);
        assert_eq!(lines[1].icms_code.as_deref(), Some("00"));
    }

    #[test]
    fn test_icms_group_without_code() {
        let xml = invoice(r#"<det nItem="1"><imposto><ICMS><ICMS00><orig>0</orig></ICMS00></ICMS></imposto></det>"#);
        let line = &parse_invoice(&xml).unwrap()[0];
        assert_eq!(line.icms_group.as_deref(), Some("ICMS00"));
        assert_eq!(line.icms_code, None);
        assert_eq!(line.icms_code_kind, IcmsCodeKind::Absent);
    }

    #[test]
    fn test_missing_branches() {
        let xml = invoice("<det><prod/></det>");
        let line = &parse_invoice(&xml).unwrap()[0];
        assert_eq!(line.item_index, "");
        assert_eq!(line.cfop_raw, "");
        assert_eq!(line.cfop, "");
        assert_eq!(line.icms_group, None);
        assert_eq!(line.icms_code_kind, IcmsCodeKind::Absent);
        assert_eq!(line.pis_cst, None);
        assert_eq!(line.cofins_cst, None);
    }

    #[test]
    fn test_missing_invoice_number() {
        let xml = format!(r#"<NFe xmlns="{NS}"><infNFe><ide><nNF> </nNF></ide></infNFe></NFe>"#);
        assert!(matches!(
            parse_invoice(&xml),
            Err(DocumentParseError::MissingInvoiceNumber)
        ));
    }

    #[test]
    fn test_elements_in_other_namespace_are_ignored() {
        let xml = r#"<NFe xmlns="urn:a"><ide><nNF>7</nNF></ide><det xmlns="urn:b" nItem="1"/></NFe>"#;
        assert!(parse_invoice(xml).unwrap().is_empty());
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_invoice_file(Path::new("/nonexistent/nota.xml"));
        assert!(matches!(result, Err(DocumentParseError::Read { .. })));
    }
}
