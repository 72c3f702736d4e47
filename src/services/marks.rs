// src/services/marks.rs

use std::sync::Arc;

use crate::{
    clients::{QuestionSetSource, SessionSource},
    db::ResultRepository,
    error::AppError,
    models::{
        question::Question,
        result::{DashboardStats, ExamResult, NewExamResult, ResultFilter},
        test_session::AnswerMap,
    },
};

/// Counts produced by grading one answer sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grade {
    pub total_questions: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub percentage: f64,
}

/// Grades answers against the set's key.
///
/// Matching is case-insensitive. Unanswered questions are neither correct nor
/// wrong, and answers to questions outside the set are ignored. The total is
/// the size of the set, so an empty set scores exactly 0.0 percent.
pub fn grade(questions: &[Question], answers: &AnswerMap) -> Grade {
    let mut correct = 0;
    let mut wrong = 0;

    for question in questions {
        match answers.get(&question.id.to_string()) {
            Some(answer) if answer.eq_ignore_ascii_case(&question.correct_option) => {
                correct += 1
            }
            Some(_) => wrong += 1,
            None => {}
        }
    }

    let total = questions.len() as i32;
    let percentage = if total > 0 {
        f64::from(correct) * 100.0 / f64::from(total)
    } else {
        0.0
    };

    Grade {
        total_questions: total,
        correct_answers: correct,
        wrong_answers: wrong,
        percentage,
    }
}

/// Grades completed sessions and serves the stored results.
pub struct MarksCalculator {
    results: ResultRepository,
    sessions: Arc<dyn SessionSource>,
    question_sets: Arc<dyn QuestionSetSource>,
}

impl MarksCalculator {
    pub fn new(
        results: ResultRepository,
        sessions: Arc<dyn SessionSource>,
        question_sets: Arc<dyn QuestionSetSource>,
    ) -> Self {
        Self {
            results,
            sessions,
            question_sets,
        }
    }

    /// Returns the session's result, computing and storing it on first call.
    /// Later calls return the stored row unchanged.
    pub async fn calculate(&self, test_session_id: i64) -> Result<ExamResult, AppError> {
        tracing::info!("Calculating marks for test session: {}", test_session_id);

        if let Some(existing) = self.results.find_by_test_session(test_session_id).await? {
            tracing::warn!(
                "Result already exists for test session: {}, returning stored result",
                test_session_id
            );
            return Ok(existing);
        }

        let session = self.sessions.get_session(test_session_id).await.map_err(|e| {
            tracing::error!("Failed to fetch test session {}: {}", test_session_id, e);
            AppError::from(e)
        })?;
        if !session.is_completed() {
            tracing::warn!(
                "Grading test session {} while it is still {}",
                session.id,
                session.status
            );
        }

        let question_set = self
            .question_sets
            .get_question_set(session.question_set_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to fetch question set {}: {}",
                    session.question_set_id,
                    e
                );
                AppError::from(e)
            })?;

        let grade = grade(&question_set.questions, &session.answer_map());

        let result = self
            .results
            .insert_once(&NewExamResult {
                test_session_id: session.id,
                usn: session.usn,
                student_name: session.student_name,
                semester: session.semester,
                department: session.department,
                question_set_id: session.question_set_id,
                total_questions: grade.total_questions,
                correct_answers: grade.correct_answers,
                wrong_answers: grade.wrong_answers,
                score: grade.correct_answers,
                percentage: grade.percentage,
            })
            .await?;

        tracing::info!(
            "Marks calculated for session {}: {}/{} ({:.2}%)",
            test_session_id,
            result.score,
            result.total_questions,
            result.percentage
        );
        Ok(result)
    }

    pub async fn result_for_session(&self, test_session_id: i64) -> Result<ExamResult, AppError> {
        tracing::debug!("Fetching result for test session: {}", test_session_id);
        self.results
            .find_by_test_session(test_session_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Result not found for test session: {}",
                    test_session_id
                ))
            })
    }

    pub async fn list(&self, filter: &ResultFilter) -> Result<Vec<ExamResult>, AppError> {
        tracing::debug!("Listing results with filter: {:?}", filter);
        self.results.list(filter).await
    }

    pub async fn dashboard(&self, filter: &ResultFilter) -> Result<DashboardStats, AppError> {
        let results = self.results.list(filter).await?;
        Ok(DashboardStats::from_results(&results))
    }
}
