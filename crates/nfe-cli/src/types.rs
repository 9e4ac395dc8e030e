use std::path::{Path, PathBuf};

use nfe_report::{DEFAULT_REPORT_FILE, ReportFormat};
use nfe_validate::AuditOutcome;

/// Options for one audit run, gathered from the command line.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub rules_path: PathBuf,
    pub sheet: Option<String>,
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: Option<ReportFormat>,
    /// Write a report file when divergences exist.
    pub export: bool,
    pub fail_on_divergence: bool,
    /// Allow invoice values in debug logs.
    pub log_data: bool,
}

impl AuditConfig {
    pub fn new(rules_path: impl Into<PathBuf>, inputs: Vec<PathBuf>) -> Self {
        Self {
            rules_path: rules_path.into(),
            sheet: None,
            inputs,
            output: None,
            format: None,
            export: true,
            fail_on_divergence: false,
            log_data: false,
        }
    }

    /// Explicit format, else the output extension, else xlsx.
    pub fn report_format(&self) -> ReportFormat {
        self.format
            .or_else(|| self.output.as_deref().and_then(ReportFormat::from_path))
            .unwrap_or_default()
    }

    /// Explicit output path, else the default file name with the format's
    /// extension.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            Path::new(DEFAULT_REPORT_FILE).with_extension(self.report_format().extension())
        })
    }
}

#[derive(Debug)]
pub struct AuditResult {
    pub rules_path: PathBuf,
    pub rule_count: usize,
    pub documents_found: usize,
    pub outcome: AuditOutcome,
    /// Report written for this run, if any.
    pub report: Option<PathBuf>,
    pub fail_on_divergence: bool,
}

impl AuditResult {
    pub fn exit_code(&self) -> i32 {
        if self.fail_on_divergence && !self.outcome.is_clean() {
            1
        } else {
            0
        }
    }
}
