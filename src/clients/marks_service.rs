// src/clients/marks_service.rs

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{ClientError, Endpoint, MarksTrigger, check_status};
use crate::models::result::CalculateMarksRequest;

/// Triggers calculations on the marks service.
#[derive(Clone)]
pub struct HttpMarksService {
    endpoint: Endpoint,
}

impl HttpMarksService {
    pub fn new(client: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            endpoint: Endpoint::new(client, base_url, timeout),
        }
    }
}

#[async_trait]
impl MarksTrigger for HttpMarksService {
    async fn calculate(&self, test_session_id: i64) -> Result<(), ClientError> {
        let url = self.endpoint.url("api/marks/calculate")?;
        tracing::info!("Calling Marks Service at: {}", url);

        let response = self
            .endpoint
            .client
            .post(url)
            .json(&CalculateMarksRequest { test_session_id })
            .send()
            .await
            .map_err(|e| self.endpoint.send_error(e))?;

        check_status(response, &format!("Test session {}", test_session_id)).await?;
        Ok(())
    }
}
