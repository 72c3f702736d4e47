// src/models/result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'results' table: the single graded outcome of one test session.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub id: i64,

    /// Unique: at most one result per test session.
    pub test_session_id: i64,

    // Copied from the session at calculation time.
    pub usn: String,
    pub student_name: String,
    pub semester: i32,
    pub department: String,
    pub question_set_id: i64,

    pub total_questions: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    /// Same as `correct_answers`.
    pub score: i32,
    pub percentage: f64,

    pub created_at: DateTime<Utc>,
}

/// Column values for inserting a result.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExamResult {
    pub test_session_id: i64,
    pub usn: String,
    pub student_name: String,
    pub semester: i32,
    pub department: String,
    pub question_set_id: i64,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub score: i32,
    pub percentage: f64,
}

/// DTO for triggering a calculation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateMarksRequest {
    pub test_session_id: i64,
}

/// Optional `?usn=&semester=&department=` filters over results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultFilter {
    pub usn: Option<String>,
    pub semester: Option<i32>,
    pub department: Option<String>,
}

/// Aggregated statistics over a subset of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_tests: i64,
    pub average_score: f64,
    pub average_percentage: f64,
    pub highest_score: i32,
    pub lowest_score: i32,
}

impl DashboardStats {
    /// Zeroes for an empty subset.
    pub fn from_results(results: &[ExamResult]) -> Self {
        if results.is_empty() {
            return Self {
                total_tests: 0,
                average_score: 0.0,
                average_percentage: 0.0,
                highest_score: 0,
                lowest_score: 0,
            };
        }

        let count = results.len() as f64;
        let score_sum: i64 = results.iter().map(|r| i64::from(r.score)).sum();
        let percentage_sum: f64 = results.iter().map(|r| r.percentage).sum();

        Self {
            total_tests: results.len() as i64,
            average_score: score_sum as f64 / count,
            average_percentage: percentage_sum / count,
            highest_score: results.iter().map(|r| r.score).max().unwrap_or(0),
            lowest_score: results.iter().map(|r| r.score).min().unwrap_or(0),
        }
    }
}
