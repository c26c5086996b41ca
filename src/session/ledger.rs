// src/session/ledger.rs

use std::collections::HashMap;

/// The candidate's current answer per question. Supports partial
/// completion; no history is kept.
#[derive(Debug, Default)]
pub struct AnswerLedger {
    answers: HashMap<i64, String>,
}

impl AnswerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a selection, overwriting any prior one for the same
    /// question. Unknown ids are accepted: the caller passes ids learned
    /// from the question set.
    pub fn record(&mut self, question_id: i64, option: impl Into<String>) {
        self.answers.insert(question_id, option.into());
    }

    /// Number of distinct answered question ids.
    pub fn completion_count(&self) -> usize {
        self.answers.len()
    }

    /// Immutable copy of the full mapping, for submission.
    pub fn snapshot(&self) -> HashMap<i64, String> {
        self.answers.clone()
    }
}
