//! CLI library components for the NF-e auditor.

pub mod logging;
pub mod pipeline;
pub mod types;
