// src/gateway.rs

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::{
    config::Config,
    error::SessionError,
    models::{
        question::Question,
        submission::{GradedResult, SubmissionPayload, TestPlan},
    },
};

/// Test-generation collaborator: exchanges a resume identifier for a
/// session descriptor. Questions arrive without correct-answer
/// information; the answer key stays server-side.
#[async_trait]
pub trait TestProvider: Send + Sync {
    async fn generate_test(&self, resume_id: i64) -> Result<TestPlan, SessionError>;
}

/// Scoring collaborator: exchanges the frozen payload for a graded result.
///
/// The controller calls this at most once per session under normal
/// operation; idempotency beyond that is the gateway's own concern.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<GradedResult, SessionError>;
}

/// Wire shape of a generate response.
#[derive(Debug, Deserialize)]
struct GenerateTestResponse {
    test_id: i64,
    questions: Vec<Question>,
}

/// Wire shape of an API error body.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    detail: String,
}

/// HTTP implementation of both collaborator contracts.
///
/// Carries its bearer token explicitly per instance; nothing
/// module-global. Every request runs under the configured hard timeout.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    default_duration_seconds: u32,
}

impl HttpApi {
    pub fn from_config(config: &Config) -> Result<Self, SessionError> {
        let mut base_url = Url::parse(&config.api_base_url)
            .map_err(|e| SessionError::Provider(format!("invalid API base url: {e}")))?;

        // Url::join replaces the last path segment unless the base ends
        // with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.submit_timeout_seconds))
            .build()
            .map_err(|e| SessionError::Provider(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            token: config.api_token.clone(),
            default_duration_seconds: config.test_duration_seconds,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, SessionError> {
        self.base_url
            .join(path)
            .map_err(|e| SessionError::Provider(format!("bad endpoint {path}: {e}")))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Pulls the server's human-readable `detail` out of a failed
    /// response, falling back to the status line.
    async fn error_reason(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ApiErrorBody>().await {
            Ok(body) => body.detail,
            Err(_) => format!("server returned {status}"),
        }
    }
}

#[async_trait]
impl TestProvider for HttpApi {
    async fn generate_test(&self, resume_id: i64) -> Result<TestPlan, SessionError> {
        let mut url = self.endpoint("tests/generate")?;
        url.query_pairs_mut()
            .append_pair("resume_id", &resume_id.to_string());

        let response = self
            .authorize(self.client.post(url))
            .send()
            .await
            .map_err(|e| SessionError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SessionError::Provider(Self::error_reason(response).await));
        }

        let body: GenerateTestResponse = response
            .json()
            .await
            .map_err(|e| SessionError::Provider(e.to_string()))?;

        // The API does not declare a duration; the session policy does.
        Ok(TestPlan {
            session_id: body.test_id,
            questions: body.questions,
            duration_seconds: self.default_duration_seconds,
        })
    }
}

#[async_trait]
impl SubmissionGateway for HttpApi {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<GradedResult, SessionError> {
        let mut url = self.endpoint("tests/submit")?;
        url.query_pairs_mut()
            .append_pair("test_id", &payload.session_id.to_string());

        let body = serde_json::json!({
            "answers": payload.answers,
            "trust_metrics": payload.trust_metrics,
        });

        let response = self.authorize(self.client.post(url)).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(SessionError::Submission(Self::error_reason(response).await));
        }

        response
            .json::<GradedResult>()
            .await
            .map_err(|e| SessionError::Submission(e.to_string()))
    }
}
