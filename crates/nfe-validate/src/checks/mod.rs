//! Individual reconciliation checks.
//!
//! Each check looks at one line and its matched rule (if any) and returns
//! at most one reason.

pub mod contribution;
pub mod icms;
pub mod regime;
