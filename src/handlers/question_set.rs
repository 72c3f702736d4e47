// src/handlers/question_set.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    db::QuestionRepository,
    error::AppError,
    models::question::{BankFilter, CreateQuestionSetRequest, UpdateQuestionSetRequest},
};

fn set_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Question set not found with ID: {}", id))
}

/// Creates a question set, optionally seeded with `questionIds`.
pub async fn create_question_set(
    State(repo): State<QuestionRepository>,
    Json(mut payload): Json<CreateQuestionSetRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.name = payload.name.trim().to_string();
    payload.description = payload.description.as_deref().map(|d| d.trim().to_string());
    payload.department = payload.department.trim().to_ascii_uppercase();
    payload.validate()?;

    tracing::info!(
        "Creating question set '{}' with {} questions",
        payload.name,
        payload.question_ids.len()
    );
    let set = repo.create_set(&payload).await?;

    Ok((StatusCode::CREATED, Json(set)))
}

/// Returns the set with its full questions, answer key included.
/// The test service relies on this to grade and to check eligibility.
pub async fn get_question_set(
    State(repo): State<QuestionRepository>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!("Fetching question set with ID: {}", id);
    let set = repo.get_set(id).await?.ok_or_else(|| set_not_found(id))?;
    Ok(Json(set))
}

pub async fn list_question_sets(
    State(repo): State<QuestionRepository>,
    Query(filter): Query<BankFilter>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!("Listing question sets with filter: {:?}", filter);
    let sets = repo.list_sets(&filter).await?;
    Ok(Json(sets))
}

pub async fn update_question_set(
    State(repo): State<QuestionRepository>,
    Path(id): Path<i64>,
    Json(mut payload): Json<UpdateQuestionSetRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.name = payload.name.trim().to_string();
    payload.description = payload.description.as_deref().map(|d| d.trim().to_string());
    payload.department = payload.department.trim().to_ascii_uppercase();
    payload.validate()?;

    tracing::info!("Updating question set with ID: {}", id);
    let set = repo
        .update_set(id, &payload)
        .await?
        .ok_or_else(|| set_not_found(id))?;

    Ok(Json(set))
}

pub async fn add_question(
    State(repo): State<QuestionRepository>,
    Path((set_id, question_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Adding question {} to set {}", question_id, set_id);
    let set = repo.add_question_to_set(set_id, question_id).await?;
    Ok(Json(set))
}

pub async fn remove_question(
    State(repo): State<QuestionRepository>,
    Path((set_id, question_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Removing question {} from set {}", question_id, set_id);
    let set = repo.remove_question_from_set(set_id, question_id).await?;
    Ok(Json(set))
}

pub async fn delete_question_set(
    State(repo): State<QuestionRepository>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Deleting question set with ID: {}", id);
    if !repo.delete_set(id).await? {
        return Err(set_not_found(id));
    }

    Ok(StatusCode::NO_CONTENT)
}
