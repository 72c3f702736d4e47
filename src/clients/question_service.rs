// src/clients/question_service.rs

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{ClientError, Endpoint, QuestionSetSource};
use crate::models::question::QuestionSet;

/// Reads question sets from the question service.
#[derive(Clone)]
pub struct HttpQuestionService {
    endpoint: Endpoint,
}

impl HttpQuestionService {
    pub fn new(client: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            endpoint: Endpoint::new(client, base_url, timeout),
        }
    }
}

#[async_trait]
impl QuestionSetSource for HttpQuestionService {
    async fn get_question_set(&self, id: i64) -> Result<QuestionSet, ClientError> {
        let set: QuestionSet = self
            .endpoint
            .get_json(
                &format!("api/question-sets/{}", id),
                &format!("Question set {}", id),
            )
            .await?;

        tracing::info!(
            "Fetched question set: {} with {} questions",
            set.name,
            set.questions.len()
        );
        Ok(set)
    }
}
