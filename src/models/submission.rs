// src/models/submission.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::question::Question;

/// Session descriptor from the test-generation collaborator.
///
/// A session cannot run without a session id and a non-empty question set;
/// `validate()` enforces both before the controller accepts the plan.
#[derive(Debug, Clone, Validate)]
pub struct TestPlan {
    #[validate(range(min = 1, message = "session id missing"))]
    pub session_id: i64,

    #[validate(length(min = 1, message = "question set is empty"))]
    pub questions: Vec<Question>,

    #[validate(range(min = 1, message = "duration must be positive"))]
    pub duration_seconds: u32,
}

/// Anti-cheat counters accumulated while the session is active.
///
/// Monotonically non-decreasing; never reset except by starting a new
/// session. Field names match the scoring API wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustMetrics {
    pub tab_switches: u32,
    pub copy_attempts: u32,
}

/// The single artifact sent to the scoring service.
///
/// Frozen at the moment the session enters `Submitting`; manual retries
/// reuse the same snapshot, so violations arriving during the network
/// round-trip can never leak into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionPayload {
    pub session_id: i64,
    pub answers: HashMap<i64, String>,
    pub trust_metrics: TrustMetrics,
}

/// Graded outcome from the scoring service. Consumed read-only and handed
/// to the results collaborator unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedResult {
    /// Correctness score, 0-100.
    pub score: f64,
    /// Integrity score, 0-100. The deduction policy lives server-side.
    pub trust_score: f64,
    pub correct_count: u32,
    pub total: u32,
    pub details: Vec<AnswerDetail>,
}

/// Per-question grading detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerDetail {
    pub question: String,
    pub selected: String,
    pub correct: String,
    pub is_correct: bool,
    #[serde(default)]
    pub skill: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionKind;

    fn sample_question() -> Question {
        Question {
            id: 1,
            skill: "Rust".to_string(),
            kind: QuestionKind::MultipleChoice,
            prompt: "What does Vec::new allocate?".to_string(),
            options: vec!["Nothing".to_string(), "One page".to_string()],
        }
    }

    #[test]
    fn plan_with_questions_and_id_is_valid() {
        let plan = TestPlan {
            session_id: 5,
            questions: vec![sample_question()],
            duration_seconds: 1800,
        };
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn plan_without_session_id_is_rejected() {
        let plan = TestPlan {
            session_id: 0,
            questions: vec![sample_question()],
            duration_seconds: 1800,
        };
        assert!(plan.validate().is_err());
    }

    #[test]
    fn plan_with_empty_question_set_is_rejected() {
        let plan = TestPlan {
            session_id: 5,
            questions: vec![],
            duration_seconds: 1800,
        };
        assert!(plan.validate().is_err());
    }

    #[test]
    fn plan_with_zero_duration_is_rejected() {
        let plan = TestPlan {
            session_id: 5,
            questions: vec![sample_question()],
            duration_seconds: 0,
        };
        assert!(plan.validate().is_err());
    }

    #[test]
    fn payload_serializes_answers_with_string_keys() {
        let mut answers = HashMap::new();
        answers.insert(7, "B".to_string());

        let payload = SubmissionPayload {
            session_id: 12,
            answers,
            trust_metrics: TrustMetrics {
                tab_switches: 2,
                copy_attempts: 1,
            },
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["answers"]["7"], "B");
        assert_eq!(value["trust_metrics"]["tab_switches"], 2);
        assert_eq!(value["trust_metrics"]["copy_attempts"], 1);
    }
}
