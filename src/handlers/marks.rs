// src/handlers/marks.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::result::{CalculateMarksRequest, ResultFilter},
    services::MarksCalculator,
};

/// Grades a session. Repeat calls return the stored result, still with 201.
pub async fn calculate_marks(
    State(calculator): State<Arc<MarksCalculator>>,
    Json(payload): Json<CalculateMarksRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = calculator.calculate(payload.test_session_id).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn get_result_for_session(
    State(calculator): State<Arc<MarksCalculator>>,
    Path(test_session_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = calculator.result_for_session(test_session_id).await?;
    Ok(Json(result))
}

pub async fn list_results_for_student(
    State(calculator): State<Arc<MarksCalculator>>,
    Path(usn): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let results = calculator
        .list(&ResultFilter {
            usn: Some(usn),
            ..Default::default()
        })
        .await?;
    Ok(Json(results))
}

/// Lists results, optionally filtered by `usn`, `semester` and `department`.
pub async fn list_results(
    State(calculator): State<Arc<MarksCalculator>>,
    Query(filter): Query<ResultFilter>,
) -> Result<impl IntoResponse, AppError> {
    let results = calculator.list(&filter).await?;
    Ok(Json(results))
}

/// Statistics over every result.
pub async fn dashboard(
    State(calculator): State<Arc<MarksCalculator>>,
) -> Result<impl IntoResponse, AppError> {
    let stats = calculator.dashboard(&ResultFilter::default()).await?;
    Ok(Json(stats))
}

pub async fn dashboard_for_student(
    State(calculator): State<Arc<MarksCalculator>>,
    Path(usn): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let stats = calculator
        .dashboard(&ResultFilter {
            usn: Some(usn),
            ..Default::default()
        })
        .await?;
    Ok(Json(stats))
}

pub async fn dashboard_for_department(
    State(calculator): State<Arc<MarksCalculator>>,
    Path(department): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let stats = calculator
        .dashboard(&ResultFilter {
            department: Some(department),
            ..Default::default()
        })
        .await?;
    Ok(Json(stats))
}

pub async fn dashboard_for_semester(
    State(calculator): State<Arc<MarksCalculator>>,
    Path(semester): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let stats = calculator
        .dashboard(&ResultFilter {
            semester: Some(semester),
            ..Default::default()
        })
        .await?;
    Ok(Json(stats))
}
