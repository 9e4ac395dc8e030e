use anyhow::Result;
use comfy_table::{Cell, Table};

use nfe_cli::pipeline::{load_rules, run_audit as run_pipeline};
use nfe_cli::types::{AuditConfig, AuditResult};
use nfe_report::{ABSENT, ReportFormat};

use crate::cli::{AuditArgs, ReportFormatArg, RulesArgs};
use crate::summary::{apply_table_style, dim_cell, header_cell};

pub fn run_audit(args: &AuditArgs, log_data: bool) -> Result<AuditResult> {
    let config = AuditConfig {
        rules_path: args.source.rules.clone(),
        sheet: args.source.sheet.clone(),
        inputs: args.inputs.clone(),
        output: args.output.clone(),
        format: args.format.map(|format| match format {
            ReportFormatArg::Xlsx => ReportFormat::Xlsx,
            ReportFormatArg::Csv => ReportFormat::Csv,
            ReportFormatArg::Json => ReportFormat::Json,
        }),
        export: !args.no_export,
        fail_on_divergence: args.fail_on_divergence,
        log_data,
    };
    run_pipeline(&config)
}

pub fn run_rules(args: &RulesArgs) -> Result<()> {
    let rules = load_rules(&args.source.rules, args.source.sheet.as_deref())?;

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("CFOP"),
        header_cell("CFOP (planilha)"),
        header_cell("ICMS CST Esperado"),
        header_cell("PIS/COFINS CST Esperado"),
    ]);
    apply_table_style(&mut table);
    for entry in rules.iter() {
        table.add_row(vec![
            Cell::new(&entry.cfop),
            Cell::new(&entry.cfop_display),
            entry
                .icms_expected
                .as_deref()
                .map_or_else(|| dim_cell(ABSENT), Cell::new),
            entry
                .pis_cofins_expected
                .as_deref()
                .map_or_else(|| dim_cell(ABSENT), Cell::new),
        ]);
    }
    println!("Regras: {}", args.source.rules.display());
    println!("{table}");

    if !rules.overwritten().is_empty() {
        eprintln!(
            "CFOPs duplicados (última linha mantida): {}",
            rules.overwritten().join(", ")
        );
    }
    Ok(())
}
