// src/main.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dotenvy::dotenv;
use proctor_session::config::Config;
use proctor_session::gateway::{HttpApi, TestProvider};
use proctor_session::notify::{ConfirmSubmit, Notify};
use proctor_session::session::controller::SessionController;
use proctor_session::session::{SessionCommand, SessionState, SignalKind};
use proctor_session::state::SessionContext;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Console notifier: warnings go straight to stdout so they are visible
/// without a log viewer.
struct ConsoleNotify;

impl Notify for ConsoleNotify {
    fn warn(&self, message: &str) {
        println!("[!] {message}");
    }
}

/// Two-step confirmation over the command stream: the first `finish` with
/// unanswered questions is refused with a notice, the second goes through.
struct ConsoleConfirm {
    armed: AtomicBool,
}

#[async_trait]
impl ConfirmSubmit for ConsoleConfirm {
    async fn confirm_submit(&self, unanswered: usize, total: usize) -> bool {
        if self.armed.swap(true, Ordering::SeqCst) {
            true
        } else {
            println!(
                "[?] {unanswered} of {total} questions are unanswered. Type `finish` again to submit anyway."
            );
            false
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let resume_id: i64 = match std::env::args().nth(1).and_then(|arg| arg.parse().ok()) {
        Some(id) => id,
        None => {
            eprintln!("Usage: proctor-session <resume_id>");
            std::process::exit(2);
        }
    };

    let api = match HttpApi::from_config(&config) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            tracing::error!("Failed to configure API client: {}", e);
            std::process::exit(1);
        }
    };

    let plan = match api.generate_test(resume_id).await {
        Ok(plan) => plan,
        Err(e) => {
            tracing::error!("Failed to generate test: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Session {} with {} questions, {} seconds on the clock.",
        plan.session_id,
        plan.questions.len(),
        plan.duration_seconds
    );
    for question in &plan.questions {
        println!("  [{}] ({}) {}", question.id, question.skill, question.prompt);
        for (index, option) in question.options.iter().enumerate() {
            println!("      {}. {}", (b'A' + index as u8) as char, option);
        }
    }

    let ctx = SessionContext::new(
        config,
        Arc::new(ConsoleNotify),
        Arc::new(ConsoleConfirm {
            armed: AtomicBool::new(false),
        }),
    );

    let controller = match SessionController::begin(ctx, plan, api.clone()) {
        Ok(controller) => controller,
        Err(e) => {
            tracing::error!("Cannot start session: {}", e);
            std::process::exit(1);
        }
    };

    let (commands, inbox) = mpsc::unbounded_channel();
    let session = tokio::spawn(controller.run(inbox));

    // Feed stdin lines into the session as commands.
    let input = tokio::spawn(async move {
        println!("Commands: answer <id> <option>, finish, retry, blur, copy, quit");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let parts: Vec<&str> = line.split_whitespace().collect();
            let command = match parts.as_slice() {
                ["answer", id, rest @ ..] if !rest.is_empty() => match id.parse() {
                    Ok(question_id) => SessionCommand::Answer {
                        question_id,
                        option: rest.join(" "),
                    },
                    Err(_) => {
                        println!("[!] question id must be a number");
                        continue;
                    }
                },
                ["finish"] => SessionCommand::Finish,
                ["retry"] => SessionCommand::RetrySubmit,
                ["blur"] => SessionCommand::Signal(SignalKind::VisibilityLost),
                ["copy"] => SessionCommand::Signal(SignalKind::ClipboardOrContext),
                ["quit"] => SessionCommand::Abandon,
                [] => continue,
                _ => {
                    println!("[!] unknown command");
                    continue;
                }
            };

            let stop = matches!(command, SessionCommand::Abandon);
            if commands.send(command).is_err() || stop {
                break;
            }
        }
    });

    let final_state = session.await.unwrap_or(SessionState::Invalid);
    input.abort();

    match final_state {
        SessionState::Completed { result } => {
            println!(
                "Score: {:.0}/100, trust: {:.0}/100 ({} of {} correct)",
                result.score, result.trust_score, result.correct_count, result.total
            );
            for detail in &result.details {
                let mark = if detail.is_correct { "+" } else { "-" };
                println!(
                    "  {} {} (answered: {}, correct: {})",
                    mark, detail.question, detail.selected, detail.correct
                );
            }
        }
        SessionState::Error { reason, .. } => {
            eprintln!("Submission failed: {reason}");
            std::process::exit(1);
        }
        other => {
            tracing::info!(?other, "session ended without a result");
        }
    }
}
