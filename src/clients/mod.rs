// src/clients/mod.rs

//! Request/response calls to the collaborating services.
//!
//! Each collaborator sits behind an `async_trait` so the orchestrator and the
//! calculator receive their handles at construction time. No retries: a failed
//! call surfaces once as a [`ClientError`].

mod marks_service;
mod question_service;
mod test_service;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::models::{question::QuestionSet, test_session::TestSession};

pub use marks_service::HttpMarksService;
pub use question_service::HttpQuestionService;
pub use test_service::HttpTestService;

/// Errors from a call to another portal service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The remote service answered 404.
    #[error("{0}")]
    NotFound(String),

    /// Connection refused, DNS failure and the like.
    #[error("service unreachable: {0}")]
    Unreachable(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("unexpected response (HTTP {status}): {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// The body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

/// Source of question sets (the question service).
#[async_trait]
pub trait QuestionSetSource: Send + Sync {
    async fn get_question_set(&self, id: i64) -> Result<QuestionSet, ClientError>;
}

/// Source of test sessions (the test service).
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn get_session(&self, id: i64) -> Result<TestSession, ClientError>;
}

/// Entry point of the marks service.
#[async_trait]
pub trait MarksTrigger: Send + Sync {
    async fn calculate(&self, test_session_id: i64) -> Result<(), ClientError>;
}

/// One shared connection pool for all outbound calls, with the fixed transport timeout.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ClientError::Build(e.to_string()))
}

/// Connection details shared by the three service clients.
#[derive(Clone)]
struct Endpoint {
    client: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl Endpoint {
    fn new(client: reqwest::Client, mut base_url: Url, timeout: Duration) -> Self {
        // Url::join replaces the last segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            client,
            base_url,
            timeout_secs: timeout.as_secs(),
        }
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Build(format!("bad path '{}': {}", path, e)))
    }

    fn send_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else if err.is_connect() {
            ClientError::Unreachable(format!("{} ({})", self.base_url, err))
        } else {
            ClientError::Unreachable(err.to_string())
        }
    }

    /// GET `path` and decode the JSON body. `what` names the resource for 404s.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, ClientError> {
        let url = self.url(path)?;
        tracing::info!("Fetching {} from: {}", what, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let response = check_status(response, what).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

async fn check_status(
    response: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(format!("{} not found", what)));
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ClientError::UnexpectedStatus {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}
