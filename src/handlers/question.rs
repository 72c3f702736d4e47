// src/handlers/question.rs

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
    models::question::{BankFilter, QuestionRequest},
};

/// Trims the free text, which is otherwise stored verbatim, and canonicalises
/// the option letter and department.
fn normalize(mut req: QuestionRequest) -> QuestionRequest {
    req.question_text = req.question_text.trim().to_string();
    req.option_a = req.option_a.trim().to_string();
    req.option_b = req.option_b.trim().to_string();
    req.option_c = req.option_c.trim().to_string();
    req.option_d = req.option_d.trim().to_string();
    req.correct_option = req.correct_option.trim().to_ascii_uppercase();
    req.department = req.department.trim().to_ascii_uppercase();
    req
}

/// Creates a question in the bank.
pub async fn create_question(
    State(repo): State<QuestionRepository>,
    Json(payload): Json<QuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payload = normalize(payload);
    payload.validate()?;

    tracing::info!(
        "Creating question for semester {}, department {}",
        payload.semester,
        payload.department
    );
    let question = repo.create_question(&payload).await?;

    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn get_question(
    State(repo): State<QuestionRepository>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!("Fetching question with ID: {}", id);
    let question = repo
        .get_question(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question not found with ID: {}", id)))?;

    Ok(Json(question))
}

/// Lists questions, optionally filtered by `semester` and/or `department`.
pub async fn list_questions(
    State(repo): State<QuestionRepository>,
    Query(filter): Query<BankFilter>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!("Listing questions with filter: {:?}", filter);
    let questions = repo.list_questions(&filter).await?;
    Ok(Json(questions))
}

/// Replaces every field of an existing question.
pub async fn update_question(
    State(repo): State<QuestionRepository>,
    Path(id): Path<i64>,
    Json(payload): Json<QuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payload = normalize(payload);
    payload.validate()?;

    tracing::info!("Updating question with ID: {}", id);
    let question = repo
        .update_question(id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question not found with ID: {}", id)))?;

    Ok(Json(question))
}

pub async fn delete_question(
    State(repo): State<QuestionRepository>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Deleting question with ID: {}", id);
    if !repo.delete_question(id).await? {
        return Err(AppError::NotFound(format!("Question not found with ID: {}", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_letters_and_keeps_text_verbatim() {
        let req = normalize(QuestionRequest {
            question_text: "  Is 3 < 5 && 5 > 2? ".into(),
            option_a: "<div>".into(),
            option_b: "Yes & no".into(),
            option_c: "5".into(),
            option_d: "22".into(),
            correct_option: " b".into(),
            semester: 1,
            department: "cs ".into(),
        });

        assert_eq!(req.question_text, "Is 3 < 5 && 5 > 2?");
        assert_eq!(req.option_a, "<div>");
        assert_eq!(req.option_b, "Yes & no");
        assert_eq!(req.correct_option, "B");
        assert_eq!(req.department, "CS");
    }
}
