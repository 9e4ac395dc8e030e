//! End-to-end audit runs over temporary rule tables and invoices.

use std::fs;
use std::path::{Path, PathBuf};

use nfe_cli::pipeline::run_audit;
use nfe_cli::types::AuditConfig;
use nfe_report::{ReportFormat, read_xlsx_report};
use tempfile::TempDir;

const RULES: &str = "CFOP,CST ICMS,CST PIS/COFINS\n5102,00,01\n6.108,00,01\n";

fn invoice(number: &str, second_item: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
  <NFe>
    <infNFe versao="4.00">
      <ide><mod>55</mod><nNF>{number}</nNF></ide>
      <det nItem="1">
        <prod><CFOP>5102</CFOP></prod>
        <imposto>
          <ICMS><ICMS00><orig>0</orig><CST>00</CST></ICMS00></ICMS>
          <PIS><PISAliq><CST>01</CST></PISAliq></PIS>
          <COFINS><COFINSAliq><CST>01</CST></COFINSAliq></COFINS>
        </imposto>
      </det>
      {second_item}
    </infNFe>
  </NFe>
</nfeProc>"#
    )
}

const DIVERGENT_ITEM: &str = r#"<det nItem="2">
        <prod><CFOP>6108</CFOP></prod>
        <imposto>
          <ICMS><ICMSSN102><orig>0</orig><CSOSN>102</CSOSN></ICMSSN102></ICMS>
          <PIS><PISNT><CST>07</CST></PISNT></PIS>
          <COFINS><COFINSOutr><CST>99</CST></COFINSOutr></COFINS>
        </imposto>
      </det>"#;

struct Fixture {
    dir: TempDir,
    rules: PathBuf,
    invoices: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let rules = dir.path().join("regras.csv");
        fs::write(&rules, RULES).unwrap();
        let invoices = dir.path().join("xml");
        fs::create_dir(&invoices).unwrap();
        Self {
            dir,
            rules,
            invoices,
        }
    }

    fn write_invoice(&self, name: &str, content: &str) {
        fs::write(self.invoices.join(name), content).unwrap();
    }

    fn config(&self) -> AuditConfig {
        let mut config = AuditConfig::new(&self.rules, vec![self.invoices.clone()]);
        config.output = Some(self.dir.path().join("out").join("relatorio.xlsx"));
        config
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }
}

fn exists(path: &Path) -> bool {
    path.try_exists().unwrap()
}

#[test]
fn divergent_batch_writes_xlsx_report() {
    let fixture = Fixture::new();
    fixture.write_invoice("a.xml", &invoice("1001", DIVERGENT_ITEM));
    fixture.write_invoice("b.xml", "<nfeProc><NFe>");
    fixture.write_invoice("notas.txt", "ignored");

    let mut config = fixture.config();
    config.fail_on_divergence = true;
    let result = run_audit(&config).unwrap();

    assert_eq!(result.rule_count, 2);
    assert_eq!(result.documents_found, 2);
    assert_eq!(result.outcome.documents_processed, 1);
    assert_eq!(result.outcome.lines_checked, 2);
    assert_eq!(result.outcome.document_errors.len(), 1);
    assert!(result.outcome.document_errors[0].document.ends_with("b.xml"));
    assert_eq!(result.exit_code(), 1);

    let report = result.report.clone().unwrap();
    assert_eq!(report, fixture.path("out/relatorio.xlsx"));
    let rows = read_xlsx_report(&report).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row[0], "1001");
    assert_eq!(row[1], "2");
    assert_eq!(row[2], "6108");
    assert_eq!(row[3], "6108");
    assert_eq!(row[4], "102");
    assert_eq!(row[7], "00");
    assert_eq!(row[8], "01");
    assert!(row[9].starts_with("ICMS com CSOSN"));
    assert!(row[9].contains("PIS CST 07 difere do esperado 01"));
    assert!(row[9].contains("COFINS CST 99 difere do esperado 01"));
}

#[test]
fn clean_batch_writes_no_report() {
    let fixture = Fixture::new();
    fixture.write_invoice("a.xml", &invoice("1002", ""));

    let mut config = fixture.config();
    config.fail_on_divergence = true;
    let result = run_audit(&config).unwrap();

    assert!(result.outcome.is_clean());
    assert_eq!(result.outcome.lines_checked, 1);
    assert!(result.report.is_none());
    assert!(!exists(&fixture.path("out/relatorio.xlsx")));
    assert_eq!(result.exit_code(), 0);
}

#[test]
fn explicit_csv_format() {
    let fixture = Fixture::new();
    fixture.write_invoice("a.xml", &invoice("1003", DIVERGENT_ITEM));

    let mut config = fixture.config();
    config.output = Some(fixture.path("relatorio.txt"));
    config.format = Some(ReportFormat::Csv);
    let result = run_audit(&config).unwrap();
    assert_eq!(result.exit_code(), 0);

    let content = fs::read_to_string(fixture.path("relatorio.txt")).unwrap();
    let mut lines = content.lines();
    assert!(lines.next().unwrap().starts_with("Nota Fiscal,Item,CFOP(XML)"));
    assert!(lines.next().unwrap().starts_with("1003,2,6108,6108,102,07,99,00,01,"));
    assert_eq!(lines.next(), None);
}

#[test]
fn no_export_keeps_divergences_in_memory() {
    let fixture = Fixture::new();
    fixture.write_invoice("a.xml", &invoice("1004", DIVERGENT_ITEM));

    let mut config = fixture.config();
    config.export = false;
    let result = run_audit(&config).unwrap();

    assert_eq!(result.outcome.divergences.len(), 1);
    assert!(result.report.is_none());
    assert!(!exists(&fixture.path("out")));
}

#[test]
fn unusable_rule_table_is_fatal() {
    let fixture = Fixture::new();
    fs::write(&fixture.rules, "Codigo,Aliquota\n5102,18\n").unwrap();
    fixture.write_invoice("a.xml", &invoice("1005", DIVERGENT_ITEM));

    let error = run_audit(&fixture.config()).unwrap_err();
    assert!(format!("{error:#}").contains("load rule table"));
    assert!(!exists(&fixture.path("out")));
}

#[test]
fn missing_input_file_is_a_document_error() {
    let fixture = Fixture::new();
    let config = AuditConfig::new(&fixture.rules, vec![fixture.path("ausente.xml")]);
    let result = run_audit(&config).unwrap();

    assert_eq!(result.documents_found, 1);
    assert_eq!(result.outcome.documents_processed, 0);
    assert_eq!(result.outcome.document_errors.len(), 1);
}
