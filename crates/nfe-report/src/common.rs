//! Shared report layout.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use nfe_validate::Divergence;

/// Worksheet name of the xlsx report.
pub const SHEET_NAME: &str = "Divergências";

/// Report file written when no output path is given.
pub const DEFAULT_REPORT_FILE: &str = "divergencias_cst_cfop_icms_piscofins.xlsx";

/// Printed instead of writing a report when nothing diverges.
pub const NO_DIVERGENCE_MESSAGE: &str =
    "Nenhuma divergência encontrada conforme a planilha de regras enviada.";

/// Completion message for a run that found divergences.
pub fn completion_message(divergences: usize) -> String {
    format!("Análise concluída! Foram encontradas {divergences} divergências.")
}

/// Rendering of an absent value.
pub const ABSENT: &str = "-";

/// Report columns, in order.
pub const REPORT_HEADERS: [&str; 10] = [
    "Nota Fiscal",
    "Item",
    "CFOP(XML)",
    "CFOP(Regra)",
    "ICMS CST (XML)",
    "PIS CST (XML)",
    "COFINS CST (XML)",
    "ICMS CST Esperado",
    "PIS/COFINS CST Esperado",
    "Justificativa",
];

/// Output container for a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Xlsx,
    Csv,
    Json,
}

impl ReportFormat {
    /// Infers the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

fn text(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        ABSENT.to_string()
    } else {
        trimmed.to_string()
    }
}

fn optional(value: Option<&String>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |value| text(value))
}

/// Renders one divergence as report cells, in header order.
pub fn report_row(divergence: &Divergence) -> [String; 10] {
    [
        text(&divergence.invoice_number),
        text(&divergence.item_index),
        text(&divergence.cfop_raw),
        optional(divergence.cfop_rule_display.as_ref()),
        optional(divergence.icms_observed.as_ref()),
        optional(divergence.pis_observed.as_ref()),
        optional(divergence.cofins_observed.as_ref()),
        optional(divergence.icms_expected.as_ref()),
        optional(divergence.pis_cofins_expected.as_ref()),
        divergence.justification(),
    ]
}

/// Creates the parent directory of `path` when missing.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfe_validate::DivergenceReason;

    fn divergence() -> Divergence {
        Divergence {
            invoice_number: "1234".to_string(),
            item_index: String::new(),
            cfop_raw: "6108".to_string(),
            cfop_rule_display: None,
            icms_observed: Some("101".to_string()),
            pis_observed: Some("01".to_string()),
            cofins_observed: None,
            icms_expected: None,
            pis_cofins_expected: None,
            reasons: vec![DivergenceReason::SimplifiedRegimeCode],
        }
    }

    #[test]
    fn test_absent_values_render_as_dash() {
        insta::assert_snapshot!(
            report_row(&divergence()).join(" | "),
            @"1234 | - | 6108 | - | 101 | 01 | - | - | - | ICMS com CSOSN (Simples Nacional) em contribuinte Lucro Presumido"
        );
    }

    #[test]
    fn test_completion_message() {
        insta::assert_snapshot!(
            completion_message(3),
            @"Análise concluída! Foram encontradas 3 divergências."
        );
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ReportFormat::from_path(Path::new("out/DIV.JSON")),
            Some(ReportFormat::Json)
        );
        assert_eq!(
            ReportFormat::from_path(Path::new(DEFAULT_REPORT_FILE)),
            Some(ReportFormat::Xlsx)
        );
        assert_eq!(ReportFormat::from_path(Path::new("div.txt")), None);
    }
}
