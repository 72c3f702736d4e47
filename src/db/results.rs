// src/db/results.rs

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    db::db_error,
    error::AppError,
    models::result::{ExamResult, NewExamResult, ResultFilter},
};

const RESULT_COLUMNS: &str = "id, test_session_id, usn, student_name, semester, department, \
     question_set_id, total_questions, correct_answers, wrong_answers, score, percentage, created_at";

/// Store for graded results, owned by the marks service.
#[derive(Clone)]
pub struct ResultRepository {
    pool: SqlitePool,
}

impl ResultRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_test_session(
        &self,
        test_session_id: i64,
    ) -> Result<Option<ExamResult>, AppError> {
        let sql = format!("SELECT {RESULT_COLUMNS} FROM results WHERE test_session_id = ?");

        sqlx::query_as::<_, ExamResult>(&sql)
            .bind(test_session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch result"))
    }

    /// Inserts the result unless one already exists for the session, then
    /// returns whichever row is stored. Concurrent callers all get the same row.
    pub async fn insert_once(&self, result: &NewExamResult) -> Result<ExamResult, AppError> {
        sqlx::query(
            "INSERT INTO results \
             (test_session_id, usn, student_name, semester, department, question_set_id, \
              total_questions, correct_answers, wrong_answers, score, percentage, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(test_session_id) DO NOTHING",
        )
        .bind(result.test_session_id)
        .bind(&result.usn)
        .bind(&result.student_name)
        .bind(result.semester)
        .bind(&result.department)
        .bind(result.question_set_id)
        .bind(result.total_questions)
        .bind(result.correct_answers)
        .bind(result.wrong_answers)
        .bind(result.score)
        .bind(result.percentage)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert result"))?;

        self.find_by_test_session(result.test_session_id)
            .await?
            .ok_or_else(|| {
                AppError::InternalServerError(format!(
                    "result for test session {} vanished after insert",
                    result.test_session_id
                ))
            })
    }

    /// Every result matching the filter; an empty filter matches all.
    pub async fn list(&self, filter: &ResultFilter) -> Result<Vec<ExamResult>, AppError> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {RESULT_COLUMNS} FROM results WHERE 1 = 1"));

        if let Some(usn) = &filter.usn {
            builder.push(" AND usn = ");
            builder.push_bind(usn.clone());
        }
        if let Some(semester) = filter.semester {
            builder.push(" AND semester = ");
            builder.push_bind(semester);
        }
        if let Some(department) = &filter.department {
            builder.push(" AND department = ");
            builder.push_bind(department.trim().to_ascii_uppercase());
        }
        builder.push(" ORDER BY id");

        builder
            .build_query_as::<ExamResult>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list results"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    fn new_result(test_session_id: i64, usn: &str, department: &str, score: i32) -> NewExamResult {
        NewExamResult {
            test_session_id,
            usn: usn.into(),
            student_name: "Asha".into(),
            semester: 6,
            department: department.into(),
            question_set_id: 1,
            total_questions: 3,
            correct_answers: score,
            wrong_answers: 3 - score,
            score,
            percentage: score as f64 * 100.0 / 3.0,
        }
    }

    #[tokio::test]
    async fn second_insert_returns_the_first_row() {
        let repo = ResultRepository::new(connect_in_memory().await.unwrap());
        let first = repo.insert_once(&new_result(1, "1MS22CS023", "CS", 2)).await.unwrap();
        let second = repo.insert_once(&new_result(1, "1MS22CS023", "CS", 3)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.score, 2);
        assert_eq!(repo.list(&ResultFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn filters_compose() {
        let repo = ResultRepository::new(connect_in_memory().await.unwrap());
        repo.insert_once(&new_result(1, "1MS22CS023", "CS", 2)).await.unwrap();
        repo.insert_once(&new_result(2, "1MS22CS023", "CS", 3)).await.unwrap();
        repo.insert_once(&new_result(3, "1MS21EC001", "EC", 1)).await.unwrap();

        let by_student = repo
            .list(&ResultFilter {
                usn: Some("1MS22CS023".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_student.len(), 2);

        let ec_sem6 = repo
            .list(&ResultFilter {
                usn: None,
                semester: Some(6),
                department: Some("ec".into()),
            })
            .await
            .unwrap();
        assert_eq!(ec_sem6.len(), 1);
        assert_eq!(ec_sem6[0].test_session_id, 3);
    }
}
