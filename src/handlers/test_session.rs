// src/handlers/test_session.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::test_session::{StartTestRequest, StartTestResponse, SubmitAnswerRequest},
    services::SessionOrchestrator,
};

/// Starts a test and hands back the questions without their answer key.
pub async fn start_test(
    State(orchestrator): State<Arc<SessionOrchestrator>>,
    Json(mut payload): Json<StartTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.student_name = payload.student_name.trim().to_string();
    payload.validate()?;

    let (session, question_set) = orchestrator.start_test(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(StartTestResponse {
            session,
            question_set: question_set.into(),
        }),
    ))
}

pub async fn get_test_session(
    State(orchestrator): State<Arc<SessionOrchestrator>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let session = orchestrator.get_session(id).await?;
    Ok(Json(session))
}

pub async fn list_sessions_for_student(
    State(orchestrator): State<Arc<SessionOrchestrator>>,
    Path(usn): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let sessions = orchestrator.sessions_for_student(&usn).await?;
    Ok(Json(sessions))
}

pub async fn list_test_sessions(
    State(orchestrator): State<Arc<SessionOrchestrator>>,
) -> Result<impl IntoResponse, AppError> {
    let sessions = orchestrator.all_sessions().await?;
    Ok(Json(sessions))
}

pub async fn submit_answer(
    State(orchestrator): State<Arc<SessionOrchestrator>>,
    Path(id): Path<i64>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let session = orchestrator.submit_answer(id, &payload).await?;
    Ok(Json(session))
}

pub async fn submit_test(
    State(orchestrator): State<Arc<SessionOrchestrator>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let session = orchestrator.submit_test(id).await?;
    Ok(Json(session))
}
