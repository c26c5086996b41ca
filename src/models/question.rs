// src/models/question.rs

use serde::{Deserialize, Serialize};

/// One generated assessment question, as delivered to the candidate.
///
/// Carries no correct-answer information; the answer key never leaves the
/// scoring service. Immutable for the life of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// Skill the question was generated for (e.g., "Python", "SQL").
    pub skill: String,

    /// Question kind. Serialized as 'type' since `type` is a reserved
    /// keyword in Rust.
    #[serde(rename = "type")]
    pub kind: QuestionKind,

    /// The question text. Wire name kept from the assessment API.
    #[serde(rename = "question")]
    pub prompt: String,

    /// Candidate-visible options, in display order.
    pub options: Vec<String>,
}

/// Question kinds the generator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "MCQ")]
    MultipleChoice,
    #[serde(rename = "SYNTAX")]
    CodeSyntax,
}
