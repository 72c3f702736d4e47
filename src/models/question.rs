// src/models/question.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,

    /// The text content of the question.
    pub question_text: String,

    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    /// Letter of the correct option: 'A', 'B', 'C' or 'D'.
    pub correct_option: String,

    /// Semester the question targets (1-8).
    pub semester: i32,

    /// Department code, e.g. 'CS', 'EC', 'ME'.
    pub department: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Represents the 'question_sets' table together with its member questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSet {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub semester: i32,
    pub department: String,

    /// Member questions, unique by id.
    #[serde(default)]
    pub questions: Vec<Question>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Row of the 'question_sets' table without its members.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionSetRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub semester: i32,
    pub department: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl QuestionSetRow {
    pub fn with_questions(self, questions: Vec<Question>) -> QuestionSet {
        QuestionSet {
            id: self.id,
            name: self.name,
            description: self.description,
            semester: self.semester,
            department: self.department,
            questions,
            created_at: self.created_at,
        }
    }
}

/// DTO for sending a question to a student (excludes the correct option).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: i64,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text,
            option_a: q.option_a,
            option_b: q.option_b,
            option_c: q.option_c,
            option_d: q.option_d,
        }
    }
}

/// DTO for sending a question set to a student taking the test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestionSet {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub semester: i32,
    pub department: String,
    pub questions: Vec<PublicQuestion>,
}

impl From<QuestionSet> for PublicQuestionSet {
    fn from(set: QuestionSet) -> Self {
        Self {
            id: set.id,
            name: set.name,
            description: set.description,
            semester: set.semester,
            department: set.department,
            questions: set.questions.into_iter().map(PublicQuestion::from).collect(),
        }
    }
}

/// DTO for creating or replacing a question.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    #[validate(length(min = 1, max = 1000, message = "Question text is required (max 1000 characters)."))]
    pub question_text: String,
    #[validate(length(min = 1, max = 500, message = "Option A is required."))]
    pub option_a: String,
    #[validate(length(min = 1, max = 500, message = "Option B is required."))]
    pub option_b: String,
    #[validate(length(min = 1, max = 500, message = "Option C is required."))]
    pub option_c: String,
    #[validate(length(min = 1, max = 500, message = "Option D is required."))]
    pub option_d: String,
    #[validate(custom(function = validate_option_letter))]
    pub correct_option: String,
    #[validate(range(min = 1, max = 8, message = "Semester must be between 1 and 8."))]
    pub semester: i32,
    #[validate(length(min = 1, max = 10, message = "Department is required (max 10 characters)."))]
    pub department: String,
}

/// DTO for creating a question set, optionally with its initial members.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionSetRequest {
    #[validate(length(min = 1, max = 255, message = "Question set name is required."))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 8, message = "Semester must be between 1 and 8."))]
    pub semester: i32,
    #[validate(length(min = 1, max = 10, message = "Department is required (max 10 characters)."))]
    pub department: String,
    #[serde(default)]
    pub question_ids: Vec<i64>,
}

/// DTO for updating a question set's own fields. Members are edited separately.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionSetRequest {
    #[validate(length(min = 1, max = 255, message = "Question set name is required."))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 8, message = "Semester must be between 1 and 8."))]
    pub semester: i32,
    #[validate(length(min = 1, max = 10, message = "Department is required (max 10 characters)."))]
    pub department: String,
}

/// Optional `?semester=&department=` filters shared by the list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BankFilter {
    pub semester: Option<i32>,
    pub department: Option<String>,
}

fn validate_option_letter(option: &str) -> Result<(), validator::ValidationError> {
    match option.trim().to_ascii_uppercase().as_str() {
        "A" | "B" | "C" | "D" => Ok(()),
        _ => Err(validator::ValidationError::new("correct_option_must_be_a_to_d")),
    }
}
