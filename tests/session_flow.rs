// tests/session_flow.rs

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use proctor_session::config::Config;
use proctor_session::error::SessionError;
use proctor_session::gateway::SubmissionGateway;
use proctor_session::models::question::{Question, QuestionKind};
use proctor_session::models::submission::{GradedResult, SubmissionPayload, TestPlan};
use proctor_session::notify::{AlwaysConfirm, TracingNotify};
use proctor_session::session::controller::SessionController;
use proctor_session::session::{SessionCommand, SessionState, SignalKind};
use proctor_session::state::SessionContext;
use tokio::sync::mpsc;

struct MockGateway {
    submissions: Mutex<Vec<SubmissionPayload>>,
}

impl MockGateway {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            submissions: Mutex::new(Vec::new()),
        })
    }

    fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    fn last_payload(&self) -> SubmissionPayload {
        self.submissions.lock().unwrap().last().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionGateway for MockGateway {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<GradedResult, SessionError> {
        self.submissions.lock().unwrap().push(payload.clone());
        Ok(GradedResult {
            score: 50.0,
            trust_score: 80.0,
            correct_count: 1,
            total: payload.answers.len() as u32,
            details: vec![],
        })
    }
}

fn test_config() -> Config {
    Config {
        api_base_url: "http://localhost:8000/".to_string(),
        api_token: None,
        rust_log: "error".to_string(),
        test_duration_seconds: 1800,
        submit_timeout_seconds: 5,
        submit_retry_limit: 2,
        submit_retry_backoff_ms: 10,
    }
}

fn context() -> SessionContext {
    SessionContext::new(
        test_config(),
        Arc::new(TracingNotify),
        Arc::new(AlwaysConfirm),
    )
}

fn plan(question_count: usize, duration_seconds: u32) -> TestPlan {
    let questions = (1..=question_count as i64)
        .map(|id| Question {
            id,
            skill: "SQL".to_string(),
            kind: QuestionKind::MultipleChoice,
            prompt: format!("Question {id}"),
            options: vec!["A".to_string(), "B".to_string()],
        })
        .collect();

    TestPlan {
        session_id: 21,
        questions,
        duration_seconds,
    }
}

#[tokio::test]
async fn full_session_over_the_command_channel() {
    let gateway = MockGateway::new();
    let controller =
        SessionController::begin(context(), plan(2, 600), gateway.clone()).expect("valid plan");

    let (commands, inbox) = mpsc::unbounded_channel();
    let session = tokio::spawn(controller.run(inbox));

    commands
        .send(SessionCommand::Answer {
            question_id: 1,
            option: "A".to_string(),
        })
        .unwrap();
    commands
        .send(SessionCommand::Signal(SignalKind::VisibilityLost))
        .unwrap();
    commands
        .send(SessionCommand::Answer {
            question_id: 2,
            option: "B".to_string(),
        })
        .unwrap();
    commands.send(SessionCommand::Finish).unwrap();

    let final_state = session.await.unwrap();
    assert!(matches!(final_state, SessionState::Completed { .. }));

    let payload = gateway.last_payload();
    assert_eq!(payload.session_id, 21);
    assert_eq!(payload.answers.len(), 2);
    assert_eq!(payload.trust_metrics.tab_switches, 1);
}

#[tokio::test(start_paused = true)]
async fn timer_expiry_auto_submits_through_the_run_loop() {
    let gateway = MockGateway::new();
    let controller =
        SessionController::begin(context(), plan(3, 3), gateway.clone()).expect("valid plan");

    let (commands, inbox) = mpsc::unbounded_channel();
    let session = tokio::spawn(controller.run(inbox));

    commands
        .send(SessionCommand::Answer {
            question_id: 1,
            option: "A".to_string(),
        })
        .unwrap();

    // No finish command: the countdown runs out and submits on its own,
    // with the ledger exactly as it stood.
    let final_state = session.await.unwrap();
    assert!(matches!(final_state, SessionState::Completed { .. }));

    assert_eq!(gateway.submission_count(), 1);
    let payload = gateway.last_payload();
    assert_eq!(payload.answers.len(), 1);
    assert_eq!(payload.answers.get(&1).map(String::as_str), Some("A"));
}

#[tokio::test]
async fn abandon_command_tears_the_session_down() {
    let gateway = MockGateway::new();
    let controller =
        SessionController::begin(context(), plan(2, 600), gateway.clone()).expect("valid plan");

    let (commands, inbox) = mpsc::unbounded_channel();
    let session = tokio::spawn(controller.run(inbox));

    commands
        .send(SessionCommand::Answer {
            question_id: 1,
            option: "A".to_string(),
        })
        .unwrap();
    commands.send(SessionCommand::Abandon).unwrap();

    let final_state = session.await.unwrap();
    assert_eq!(final_state, SessionState::Invalid);
    assert_eq!(gateway.submission_count(), 0);
}

#[tokio::test]
async fn dropping_every_command_handle_abandons_the_session() {
    let gateway = MockGateway::new();
    let controller =
        SessionController::begin(context(), plan(1, 600), gateway.clone()).expect("valid plan");

    let (commands, inbox) = mpsc::unbounded_channel();
    let session = tokio::spawn(controller.run(inbox));

    drop(commands);

    let final_state = session.await.unwrap();
    assert_eq!(final_state, SessionState::Invalid);
    assert_eq!(gateway.submission_count(), 0);
}
