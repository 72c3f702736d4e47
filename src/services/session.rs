// src/services/session.rs

use std::sync::Arc;

use chrono::Utc;

use crate::{
    clients::{MarksTrigger, QuestionSetSource},
    db::SessionRepository,
    error::AppError,
    models::{
        question::QuestionSet,
        test_session::{
            NewTestSession, StartTestRequest, SubmitAnswerRequest, TestSession, TestStatus,
            encode_answers,
        },
    },
    utils::usn,
};

/// Owns the test-session lifecycle: IN_PROGRESS on start, COMPLETED on submit.
pub struct SessionOrchestrator {
    sessions: SessionRepository,
    question_sets: Arc<dyn QuestionSetSource>,
    marks: Arc<dyn MarksTrigger>,
}

impl SessionOrchestrator {
    pub fn new(
        sessions: SessionRepository,
        question_sets: Arc<dyn QuestionSetSource>,
        marks: Arc<dyn MarksTrigger>,
    ) -> Self {
        Self {
            sessions,
            question_sets,
            marks,
        }
    }

    /// Starts a new attempt after checking the student is eligible for the set.
    ///
    /// Every call creates an independent session: a student may hold several
    /// in-progress attempts on the same set. Returns the fetched question set
    /// alongside the session so callers need not fetch it twice.
    pub async fn start_test(
        &self,
        req: &StartTestRequest,
    ) -> Result<(TestSession, QuestionSet), AppError> {
        tracing::info!(
            "Starting test for USN: {}, Question Set: {}",
            req.usn,
            req.question_set_id
        );

        if !usn::is_valid(&req.usn) {
            return Err(AppError::BadRequest(format!("Invalid USN format: {}", req.usn)));
        }
        let year = usn::parse_year(&req.usn).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let department =
            usn::parse_department(&req.usn).map_err(|e| AppError::BadRequest(e.to_string()))?;

        let question_set = self
            .question_sets
            .get_question_set(req.question_set_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch question set {}: {}", req.question_set_id, e);
                AppError::from(e)
            })?;

        if question_set.semester != req.semester {
            return Err(AppError::BadRequest(format!(
                "Question set is for semester {}, but student is in semester {}",
                question_set.semester, req.semester
            )));
        }
        if !question_set.department.eq_ignore_ascii_case(department) {
            return Err(AppError::BadRequest(format!(
                "Question set is for department {}, but student is from department {}",
                question_set.department, department
            )));
        }

        let session = self
            .sessions
            .create(&NewTestSession {
                usn: req.usn.clone(),
                student_name: req.student_name.clone(),
                semester: req.semester,
                department: department.to_string(),
                year_of_admission: year.to_string(),
                question_set_id: req.question_set_id,
                start_time: Utc::now(),
            })
            .await?;

        tracing::info!("Test session created with ID: {}", session.id);
        Ok((session, question_set))
    }

    pub async fn get_session(&self, id: i64) -> Result<TestSession, AppError> {
        tracing::debug!("Fetching test session with ID: {}", id);
        self.sessions
            .get_by_id(id)
            .await?
            .ok_or_else(|| session_not_found(id))
    }

    pub async fn sessions_for_student(&self, usn: &str) -> Result<Vec<TestSession>, AppError> {
        tracing::debug!("Fetching test sessions for USN: {}", usn);
        self.sessions.list_by_student(usn).await
    }

    pub async fn all_sessions(&self) -> Result<Vec<TestSession>, AppError> {
        tracing::debug!("Fetching all test sessions");
        self.sessions.list_all().await
    }

    /// Records (or overwrites) the answer to one question. Neither the question
    /// id nor the option letter is checked against the set; grading ignores
    /// keys it does not know.
    pub async fn submit_answer(
        &self,
        session_id: i64,
        req: &SubmitAnswerRequest,
    ) -> Result<TestSession, AppError> {
        tracing::info!(
            "Submitting answer for session {}, question {}",
            session_id,
            req.question_id
        );

        let mut session = self.in_progress_session(session_id).await?;

        let mut answers = session.answer_map();
        answers.insert(req.question_id.to_string(), req.selected_option.clone());
        session.answers = encode_answers(&answers);

        self.write(&session).await?;
        tracing::debug!("Answer saved for question {}", req.question_id);
        Ok(session)
    }

    /// Completes the session, then asks the marks service to grade it.
    ///
    /// The grading call is best effort: a failure is logged and swallowed,
    /// completion is never rolled back and nothing is retried. Grading can be
    /// triggered again later through the marks service.
    pub async fn submit_test(&self, session_id: i64) -> Result<TestSession, AppError> {
        tracing::info!("Submitting test for session: {}", session_id);

        let mut session = self.in_progress_session(session_id).await?;

        let now = Utc::now();
        session.status = TestStatus::Completed;
        session.end_time = Some(now);
        session.submitted_at = Some(now);
        self.write(&session).await?;

        match self.marks.calculate(session_id).await {
            Ok(()) => tracing::info!("Marks calculation initiated for session: {}", session_id),
            Err(e) => tracing::error!(
                "Failed to call Marks Service for session {}: {}",
                session_id,
                e
            ),
        }

        Ok(session)
    }

    async fn in_progress_session(&self, id: i64) -> Result<TestSession, AppError> {
        let session = self.get_session(id).await?;
        if session.is_completed() {
            return Err(already_completed(id));
        }
        Ok(session)
    }

    /// The store refuses writes to completed rows; a racing submit lands here.
    async fn write(&self, session: &TestSession) -> Result<(), AppError> {
        if self.sessions.update(session).await? {
            Ok(())
        } else {
            match self.sessions.get_by_id(session.id).await? {
                Some(_) => Err(already_completed(session.id)),
                None => Err(session_not_found(session.id)),
            }
        }
    }
}

fn session_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Test session not found with ID: {}", id))
}

fn already_completed(id: i64) -> AppError {
    AppError::InvalidState(format!("Test session {} is already completed", id))
}
