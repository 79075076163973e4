//! Result types returned by the session.

use serde::{Deserialize, Serialize};

/// Text pulled out of a PDF, page texts concatenated in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub text: String,
    pub page_count: usize,
}

impl ExtractedDocument {
    /// Length in characters, the unit of the condensation threshold.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub text: String,
    pub duration_ms: u64,
}
