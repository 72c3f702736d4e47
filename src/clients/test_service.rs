// src/clients/test_service.rs

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{ClientError, Endpoint, SessionSource};
use crate::models::test_session::TestSession;

/// Reads test sessions from the test service.
#[derive(Clone)]
pub struct HttpTestService {
    endpoint: Endpoint,
}

impl HttpTestService {
    pub fn new(client: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            endpoint: Endpoint::new(client, base_url, timeout),
        }
    }
}

#[async_trait]
impl SessionSource for HttpTestService {
    async fn get_session(&self, id: i64) -> Result<TestSession, ClientError> {
        let session: TestSession = self
            .endpoint
            .get_json(
                &format!("api/test-sessions/{}", id),
                &format!("Test session {}", id),
            )
            .await?;

        tracing::info!("Fetched test session for USN: {}", session.usn);
        Ok(session)
    }
}
