//! CLI argument definitions for the NF-e auditor.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "nfe-audit",
    version,
    about = "NF-e auditor - Check CST/CSOSN codes against a CFOP rule table",
    long_about = "Check the ICMS, PIS and COFINS situation codes of NF-e invoices \
                  against a CFOP rule spreadsheet.\n\n\
                  Flags Simples Nacional codes (CSOSN) on Lucro Presumido taxpayers and \
                  exports every divergence to xlsx, csv or json."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Prefix log lines with a timestamp (pretty and compact formats).
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow invoice numbers and codes in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Audit invoice XML files against the rule table.
    Audit(AuditArgs),

    /// Print the normalized rule table.
    Rules(RulesArgs),
}

#[derive(Parser)]
pub struct RuleSourceArgs {
    /// Rule table file (.csv, .xlsx, .xlsm, .xlsb, .xls or .ods).
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: PathBuf,

    /// Worksheet to read (default: first sheet).
    #[arg(long = "sheet", value_name = "NAME")]
    pub sheet: Option<String>,
}

#[derive(Parser)]
pub struct AuditArgs {
    #[command(flatten)]
    pub source: RuleSourceArgs,

    /// NF-e XML files or directories containing them.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Report path (default: divergencias_cst_cfop_icms_piscofins.<ext>).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Report format (default: from the output extension, else xlsx).
    #[arg(long = "format", value_enum)]
    pub format: Option<ReportFormatArg>,

    /// Print the summary without writing a report.
    #[arg(long = "no-export")]
    pub no_export: bool,

    /// Exit with status 1 when any divergence or unreadable document is found.
    #[arg(long = "fail-on-divergence")]
    pub fail_on_divergence: bool,
}

#[derive(Parser)]
pub struct RulesArgs {
    #[command(flatten)]
    pub source: RuleSourceArgs,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormatArg {
    Xlsx,
    Csv,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
