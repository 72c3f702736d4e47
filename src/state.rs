// src/state.rs

use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::{
    clients::{
        ClientError, HttpMarksService, HttpQuestionService, HttpTestService, MarksTrigger,
        QuestionSetSource, SessionSource, build_http_client,
    },
    config::Config,
    db::{QuestionRepository, ResultRepository, SessionRepository},
    services::{MarksCalculator, SessionOrchestrator},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub questions: QuestionRepository,
    pub orchestrator: Arc<SessionOrchestrator>,
    pub calculator: Arc<MarksCalculator>,
}

impl AppState {
    /// Wires the services to HTTP clients for the collaborator URLs in `config`.
    pub fn new(pool: SqlitePool, config: Config) -> Result<Self, ClientError> {
        let timeout = Duration::from_secs(config.upstream_timeout_secs);
        let client = build_http_client(timeout)?;

        let question_service = Arc::new(HttpQuestionService::new(
            client.clone(),
            config.question_service_url.clone(),
            timeout,
        ));
        let test_service = Arc::new(HttpTestService::new(
            client.clone(),
            config.test_service_url.clone(),
            timeout,
        ));
        let marks_service = Arc::new(HttpMarksService::new(
            client,
            config.marks_service_url.clone(),
            timeout,
        ));

        Ok(Self::with_collaborators(
            pool,
            config,
            question_service,
            test_service,
            marks_service,
        ))
    }

    /// Wires the services to arbitrary collaborator implementations.
    pub fn with_collaborators(
        pool: SqlitePool,
        config: Config,
        question_sets: Arc<dyn QuestionSetSource>,
        sessions: Arc<dyn SessionSource>,
        marks: Arc<dyn MarksTrigger>,
    ) -> Self {
        let orchestrator = SessionOrchestrator::new(
            SessionRepository::new(pool.clone()),
            question_sets.clone(),
            marks,
        );
        let calculator =
            MarksCalculator::new(ResultRepository::new(pool.clone()), sessions, question_sets);

        Self {
            questions: QuestionRepository::new(pool),
            orchestrator: Arc::new(orchestrator),
            calculator: Arc::new(calculator),
            config,
        }
    }
}

impl FromRef<AppState> for QuestionRepository {
    fn from_ref(state: &AppState) -> Self {
        state.questions.clone()
    }
}

impl FromRef<AppState> for Arc<SessionOrchestrator> {
    fn from_ref(state: &AppState) -> Self {
        state.orchestrator.clone()
    }
}

impl FromRef<AppState> for Arc<MarksCalculator> {
    fn from_ref(state: &AppState) -> Self {
        state.calculator.clone()
    }
}
