// src/config.rs

use dotenvy::dotenv;
use std::env;

/// How many visibility-loss warnings the candidate sees before counting
/// continues silently.
pub const VISIBILITY_WARNING_LIMIT: u32 = 3;

/// Assessment length used when the test provider does not declare one.
pub const DEFAULT_DURATION_SECONDS: u32 = 30 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the assessment API (test generation + scoring).
    pub api_base_url: String,

    /// Optional bearer token for the API. Carried explicitly per session,
    /// never stored in module-level state.
    pub api_token: Option<String>,

    pub rust_log: String,

    /// Countdown length for a new session, in seconds.
    pub test_duration_seconds: u32,

    /// Hard timeout on each submission request.
    pub submit_timeout_seconds: u64,

    /// Automatic retries after a timer-triggered submission failure.
    /// User-triggered submissions never retry automatically.
    pub submit_retry_limit: u32,

    /// Linear backoff step between automatic retries.
    pub submit_retry_backoff_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let api_base_url = env::var("API_BASE_URL").expect("API_BASE_URL must be set");

        let api_token = env::var("API_TOKEN").ok();

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            api_base_url,
            api_token,
            rust_log,
            test_duration_seconds: parse_env("TEST_DURATION_SECONDS", DEFAULT_DURATION_SECONDS),
            submit_timeout_seconds: parse_env("SUBMIT_TIMEOUT_SECONDS", 30),
            submit_retry_limit: parse_env("SUBMIT_RETRY_LIMIT", 2),
            submit_retry_backoff_ms: parse_env("SUBMIT_RETRY_BACKOFF_MS", 1500),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
