// src/db/sessions.rs

use sqlx::SqlitePool;

use crate::{
    db::db_error,
    error::AppError,
    models::test_session::{NewTestSession, TestSession, TestStatus},
};

const SESSION_COLUMNS: &str = "id, usn, student_name, semester, department, year_of_admission, \
     question_set_id, start_time, end_time, answers, status, submitted_at";

/// Store for test sessions, owned by the test service.
#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts an in-progress session with no answers.
    pub async fn create(&self, session: &NewTestSession) -> Result<TestSession, AppError> {
        let sql = format!(
            "INSERT INTO test_sessions \
             (usn, student_name, semester, department, year_of_admission, question_set_id, start_time, answers, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?, '{{}}', ?) \
             RETURNING {SESSION_COLUMNS}"
        );

        sqlx::query_as::<_, TestSession>(&sql)
            .bind(&session.usn)
            .bind(&session.student_name)
            .bind(session.semester)
            .bind(&session.department)
            .bind(&session.year_of_admission)
            .bind(session.question_set_id)
            .bind(session.start_time)
            .bind(TestStatus::InProgress.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to create test session"))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<TestSession>, AppError> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM test_sessions WHERE id = ?");

        sqlx::query_as::<_, TestSession>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch test session"))
    }

    pub async fn list_by_student(&self, usn: &str) -> Result<Vec<TestSession>, AppError> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM test_sessions WHERE usn = ? ORDER BY id");

        sqlx::query_as::<_, TestSession>(&sql)
            .bind(usn)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list test sessions for student"))
    }

    pub async fn list_all(&self) -> Result<Vec<TestSession>, AppError> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM test_sessions ORDER BY id");

        sqlx::query_as::<_, TestSession>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list test sessions"))
    }

    /// Writes the mutable fields back (last write wins). Only rows that are
    /// still in progress accept writes, so a completed session never moves
    /// back. Returns false when no in-progress row matched.
    pub async fn update(&self, session: &TestSession) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE test_sessions \
             SET answers = ?, status = ?, end_time = ?, submitted_at = ? \
             WHERE id = ? AND status = ?",
        )
        .bind(&session.answers)
        .bind(session.status.as_str())
        .bind(session.end_time)
        .bind(session.submitted_at)
        .bind(session.id)
        .bind(TestStatus::InProgress.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update test session"))?;

        Ok(result.rows_affected() > 0)
    }
}
