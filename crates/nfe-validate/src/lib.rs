//! NF-e tax code reconciliation.
//!
//! Every invoice line is looked up in the rule table by its normalized CFOP
//! and checked in a fixed order:
//!
//! - **Regime**: a Simples Nacional code (`CSOSN`) on a Lucro Presumido
//!   taxpayer, flagged with or without a matching rule
//! - **ICMS**: observed CST against the rule's expected CST
//! - **PIS** and **COFINS**: observed CST against the shared expected CST
//!
//! A line with at least one finding yields a [`Divergence`].
//!
//! # Example
//!
//! ```ignore
//! use nfe_validate::{Auditor, reconcile};
//!
//! let divergences = reconcile(&rules, &lines);
//! let outcome = Auditor::new(rules).audit(documents);
//! ```

mod audit;
mod checks;
mod divergence;
mod engine;

pub use audit::{AuditOutcome, Auditor, REDACTED_VALUE};
pub use divergence::{Divergence, DivergenceReason, REASON_SEPARATOR};
pub use engine::{evaluate_line, reconcile};
