// src/db/questions.rs

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    db::db_error,
    error::AppError,
    models::question::{
        BankFilter, CreateQuestionSetRequest, Question, QuestionRequest, QuestionSet,
        QuestionSetRow, UpdateQuestionSetRequest,
    },
};

const QUESTION_COLUMNS: &str = "id, question_text, option_a, option_b, option_c, option_d, \
     correct_option, semester, department, created_at";

const SET_COLUMNS: &str = "id, name, description, semester, department, created_at";

/// Store for questions and question sets, owned by the question service.
#[derive(Clone)]
pub struct QuestionRepository {
    pool: SqlitePool,
}

impl QuestionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_question(&self, req: &QuestionRequest) -> Result<Question, AppError> {
        let sql = format!(
            "INSERT INTO questions \
             (question_text, option_a, option_b, option_c, option_d, correct_option, semester, department, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {QUESTION_COLUMNS}"
        );

        sqlx::query_as::<_, Question>(&sql)
            .bind(&req.question_text)
            .bind(&req.option_a)
            .bind(&req.option_b)
            .bind(&req.option_c)
            .bind(&req.option_d)
            .bind(&req.correct_option)
            .bind(req.semester)
            .bind(&req.department)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to create question"))
    }

    pub async fn get_question(&self, id: i64) -> Result<Option<Question>, AppError> {
        let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?");

        sqlx::query_as::<_, Question>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch question"))
    }

    pub async fn list_questions(&self, filter: &BankFilter) -> Result<Vec<Question>, AppError> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE 1 = 1"));
        push_bank_filter(&mut builder, filter);
        builder.push(" ORDER BY id");

        builder
            .build_query_as::<Question>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list questions"))
    }

    /// Replaces every editable field. `None` when the question does not exist.
    pub async fn update_question(
        &self,
        id: i64,
        req: &QuestionRequest,
    ) -> Result<Option<Question>, AppError> {
        let sql = format!(
            "UPDATE questions SET \
             question_text = ?, option_a = ?, option_b = ?, option_c = ?, option_d = ?, \
             correct_option = ?, semester = ?, department = ? \
             WHERE id = ? \
             RETURNING {QUESTION_COLUMNS}"
        );

        sqlx::query_as::<_, Question>(&sql)
            .bind(&req.question_text)
            .bind(&req.option_a)
            .bind(&req.option_b)
            .bind(&req.option_c)
            .bind(&req.option_d)
            .bind(&req.correct_option)
            .bind(req.semester)
            .bind(&req.department)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to update question"))
    }

    /// Returns false when nothing was deleted.
    pub async fn delete_question(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete question"))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_questions(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count questions"))
    }

    /// Creates a set and its initial members atomically.
    pub async fn create_set(&self, req: &CreateQuestionSetRequest) -> Result<QuestionSet, AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO question_sets (name, description, semester, department, created_at) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING {SET_COLUMNS}"
        );
        let row = sqlx::query_as::<_, QuestionSetRow>(&sql)
            .bind(&req.name)
            .bind(&req.description)
            .bind(req.semester)
            .bind(&req.department)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to create question set"))?;

        for question_id in &req.question_ids {
            let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM questions WHERE id = ?")
                .bind(question_id)
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                return Err(AppError::NotFound(format!(
                    "Question not found with ID: {}",
                    question_id
                )));
            }

            sqlx::query(
                "INSERT OR IGNORE INTO question_set_questions (question_set_id, question_id) VALUES (?, ?)",
            )
            .bind(row.id)
            .bind(question_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to add question to new set"))?;
        }

        tx.commit().await?;

        let questions = self.set_members(row.id).await?;
        Ok(row.with_questions(questions))
    }

    pub async fn get_set(&self, id: i64) -> Result<Option<QuestionSet>, AppError> {
        let sql = format!("SELECT {SET_COLUMNS} FROM question_sets WHERE id = ?");
        let row = sqlx::query_as::<_, QuestionSetRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch question set"))?;

        match row {
            Some(row) => {
                let questions = self.set_members(row.id).await?;
                Ok(Some(row.with_questions(questions)))
            }
            None => Ok(None),
        }
    }

    pub async fn list_sets(&self, filter: &BankFilter) -> Result<Vec<QuestionSet>, AppError> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {SET_COLUMNS} FROM question_sets WHERE 1 = 1"));
        push_bank_filter(&mut builder, filter);
        builder.push(" ORDER BY id");

        let rows = builder
            .build_query_as::<QuestionSetRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list question sets"))?;

        let mut sets = Vec::with_capacity(rows.len());
        for row in rows {
            let questions = self.set_members(row.id).await?;
            sets.push(row.with_questions(questions));
        }
        Ok(sets)
    }

    /// Updates the set's own fields; membership is untouched.
    pub async fn update_set(
        &self,
        id: i64,
        req: &UpdateQuestionSetRequest,
    ) -> Result<Option<QuestionSet>, AppError> {
        let result = sqlx::query(
            "UPDATE question_sets SET name = ?, description = ?, semester = ?, department = ? WHERE id = ?",
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.semester)
        .bind(&req.department)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update question set"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_set(id).await
    }

    /// Adding a question that is already a member keeps a single copy.
    pub async fn add_question_to_set(
        &self,
        set_id: i64,
        question_id: i64,
    ) -> Result<QuestionSet, AppError> {
        self.require_set(set_id).await?;
        if self.get_question(question_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Question not found with ID: {}",
                question_id
            )));
        }

        sqlx::query(
            "INSERT OR IGNORE INTO question_set_questions (question_set_id, question_id) VALUES (?, ?)",
        )
        .bind(set_id)
        .bind(question_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to add question to set"))?;

        self.require_set(set_id).await
    }

    pub async fn remove_question_from_set(
        &self,
        set_id: i64,
        question_id: i64,
    ) -> Result<QuestionSet, AppError> {
        self.require_set(set_id).await?;

        sqlx::query("DELETE FROM question_set_questions WHERE question_set_id = ? AND question_id = ?")
            .bind(set_id)
            .bind(question_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to remove question from set"))?;

        self.require_set(set_id).await
    }

    pub async fn delete_set(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM question_sets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete question set"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn require_set(&self, id: i64) -> Result<QuestionSet, AppError> {
        self.get_set(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question set not found with ID: {}", id)))
    }

    async fn set_members(&self, set_id: i64) -> Result<Vec<Question>, AppError> {
        sqlx::query_as::<_, Question>(
            "SELECT q.id, q.question_text, q.option_a, q.option_b, q.option_c, q.option_d, \
             q.correct_option, q.semester, q.department, q.created_at \
             FROM questions q \
             JOIN question_set_questions m ON m.question_id = q.id \
             WHERE m.question_set_id = ? \
             ORDER BY q.id",
        )
        .bind(set_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch question set members"))
    }
}

fn push_bank_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &BankFilter) {
    if let Some(semester) = filter.semester {
        builder.push(" AND semester = ");
        builder.push_bind(semester);
    }
    if let Some(department) = &filter.department {
        builder.push(" AND department = ");
        builder.push_bind(department.trim().to_ascii_uppercase());
    }
}
