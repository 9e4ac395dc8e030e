use std::fmt;

use serde::{Deserialize, Serialize};

/// A document that could not be audited. Reported next to the divergences,
/// never fatal to the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentError {
    /// Document identifier (usually the file name).
    pub document: String,
    pub message: String,
}

impl DocumentError {
    pub fn new(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.document, self.message)
    }
}
