// src/models/test_session.rs

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::question::PublicQuestionSet;

/// Student answers keyed by stringified question id, e.g. `{"1": "B"}`.
pub type AnswerMap = BTreeMap<String, String>;

/// Lifecycle of a test session. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    InProgress,
    Completed,
}

impl TestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::InProgress => "IN_PROGRESS",
            TestStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_PROGRESS" => Ok(TestStatus::InProgress),
            "COMPLETED" => Ok(TestStatus::Completed),
            other => Err(format!("unknown test status '{}'", other)),
        }
    }
}

impl TryFrom<String> for TestStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Represents the 'test_sessions' table: one row per attempt.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSession {
    pub id: i64,

    /// University Seat Number of the student.
    pub usn: String,
    pub student_name: String,
    pub semester: i32,

    /// Parsed from the USN.
    pub department: String,
    /// Parsed from the USN.
    pub year_of_admission: String,

    pub question_set_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,

    /// Answer map stored (and sent over the wire) as a JSON object string.
    #[serde(default = "empty_answers", deserialize_with = "answers_from_wire")]
    pub answers: String,

    #[sqlx(try_from = "String")]
    pub status: TestStatus,

    pub submitted_at: Option<DateTime<Utc>>,
}

impl TestSession {
    /// Decodes the stored answers. Anything unreadable counts as no answers at all.
    pub fn answer_map(&self) -> AnswerMap {
        decode_answers(&self.answers).unwrap_or_else(|e| {
            tracing::warn!(
                "Malformed answers on test session {}, treating as empty: {}",
                self.id,
                e
            );
            AnswerMap::new()
        })
    }

    pub fn is_completed(&self) -> bool {
        self.status == TestStatus::Completed
    }
}

/// Column values for inserting a fresh session.
#[derive(Debug, Clone)]
pub struct NewTestSession {
    pub usn: String,
    pub student_name: String,
    pub semester: i32,
    pub department: String,
    pub year_of_admission: String,
    pub question_set_id: i64,
    pub start_time: DateTime<Utc>,
}

pub fn decode_answers(raw: &str) -> Result<AnswerMap, serde_json::Error> {
    serde_json::from_str(raw)
}

pub fn encode_answers(answers: &AnswerMap) -> String {
    // A string-to-string map always serializes.
    serde_json::to_string(answers).unwrap_or_else(|_| empty_answers())
}

fn empty_answers() -> String {
    "{}".to_string()
}

/// Accepts the canonical JSON-string form, a bare JSON object, or null.
fn answers_from_wire<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(raw) => raw,
        serde_json::Value::Null => empty_answers(),
        other => other.to_string(),
    })
}

/// DTO for starting a test.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartTestRequest {
    #[validate(length(min = 1, max = 20, message = "USN is required."))]
    pub usn: String,
    #[validate(length(min = 1, max = 100, message = "Student name is required."))]
    pub student_name: String,
    #[validate(range(min = 1, max = 8, message = "Semester must be between 1 and 8."))]
    pub semester: i32,
    pub question_set_id: i64,
}

/// DTO for recording one answer.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub question_id: i64,
    /// Normally 'A'-'D'; not checked.
    #[validate(length(min = 1, max = 10, message = "Selected option is required."))]
    pub selected_option: String,
}

/// Response for a started test: the session plus the questions to answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTestResponse {
    pub session: TestSession,
    pub question_set: PublicQuestionSet,
}
