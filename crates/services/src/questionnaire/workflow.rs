use std::sync::Arc;

use storage::repository::{DraftRepository, StorageError, SubmissionRepository, SubmissionRow};
use tracing::{debug, info, warn};
use trip_core::model::{AnswerValue, DraftId, PlannedQuestion, Submission, SubmissionId};

use super::progress::QuestionnaireProgress;
use super::session::QuestionnaireSession;
use crate::Clock;
use crate::error::QuestionnaireError;

/// Result of answering a single question in a persisted session.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionnaireAnswerResult {
    pub question: PlannedQuestion,
    pub progress: QuestionnaireProgress,
}

/// Orchestrates questionnaire start, persisted answering, and submission.
#[derive(Clone)]
pub struct QuestionnaireLoopService {
    clock: Clock,
    drafts: Arc<dyn DraftRepository>,
    submissions: Arc<dyn SubmissionRepository>,
}

impl QuestionnaireLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        drafts: Arc<dyn DraftRepository>,
        submissions: Arc<dyn SubmissionRepository>,
    ) -> Self {
        Self {
            clock,
            drafts,
            submissions,
        }
    }

    /// Start a new questionnaire backed by a fresh draft.
    ///
    /// # Errors
    ///
    /// Returns `QuestionnaireError::Storage` if the draft cannot be created.
    pub async fn start(&self) -> Result<QuestionnaireSession, QuestionnaireError> {
        let draft = self.drafts.create_draft(self.clock.now()).await?;
        info!(draft_id = %draft.id(), "questionnaire started");
        Ok(QuestionnaireSession::from_draft(&draft))
    }

    /// Resume a questionnaire from its stored draft.
    ///
    /// # Errors
    ///
    /// Returns `QuestionnaireError::Storage` if the draft is missing or unreadable.
    pub async fn resume(&self, draft_id: DraftId) -> Result<QuestionnaireSession, QuestionnaireError> {
        let draft = self.drafts.get_draft(draft_id).await?;
        let session = QuestionnaireSession::from_draft(&draft);
        debug!(
            draft_id = %draft_id,
            step = session.current_step(),
            total = session.total_steps(),
            "questionnaire resumed"
        );
        Ok(session)
    }

    /// Answer the current question and persist the draft.
    ///
    /// `session` is left untouched if the draft cannot be saved.
    ///
    /// # Errors
    ///
    /// Returns `QuestionnaireError::Completed` on the finalization step, or
    /// `QuestionnaireError::Storage` if the draft cannot be saved.
    pub async fn answer_current(
        &self,
        session: &mut QuestionnaireSession,
        value: impl Into<AnswerValue>,
    ) -> Result<QuestionnaireAnswerResult, QuestionnaireError> {
        let mut next = session.clone();
        let question = next.answer_current(value, self.clock.now())?;
        self.commit(session, next).await?;

        let progress = session.progress();
        debug!(
            draft_id = %session.draft_id(),
            question = %question.key,
            step = progress.current_step,
            total = progress.total_steps,
            milestone = %progress.milestone_key,
            "answer recorded"
        );
        Ok(QuestionnaireAnswerResult { question, progress })
    }

    /// Overwrite an answer by key without moving, then persist the draft.
    ///
    /// # Errors
    ///
    /// Returns `QuestionnaireError` for completed sessions or storage failures.
    pub async fn record_answer(
        &self,
        session: &mut QuestionnaireSession,
        key: &str,
        value: impl Into<AnswerValue>,
    ) -> Result<QuestionnaireProgress, QuestionnaireError> {
        let mut next = session.clone();
        next.record_answer(key, value, self.clock.now())?;
        self.commit(session, next).await?;
        debug!(draft_id = %session.draft_id(), key, "answer overwritten");
        Ok(session.progress())
    }

    /// Step back once and persist the new position.
    ///
    /// # Errors
    ///
    /// Returns `QuestionnaireError::Storage` if the draft cannot be saved.
    pub async fn go_back(
        &self,
        session: &mut QuestionnaireSession,
    ) -> Result<QuestionnaireProgress, QuestionnaireError> {
        if session.is_submitted() {
            return Err(QuestionnaireError::Completed);
        }
        let mut next = session.clone();
        next.go_back(self.clock.now());
        self.commit(session, next).await?;
        Ok(session.progress())
    }

    /// Submit a finished questionnaire.
    ///
    /// Submitting twice returns the stored id, also from a session resumed
    /// from a draft that outlived its submission. The draft is removed after
    /// a successful append; a failure to remove it is logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns `QuestionnaireError::NotFinished` before the final step, or
    /// `QuestionnaireError::Storage` if the submission cannot be appended.
    pub async fn submit(
        &self,
        session: &mut QuestionnaireSession,
    ) -> Result<SubmissionId, QuestionnaireError> {
        if let Some(id) = session.submission_id() {
            return Ok(id);
        }

        let submission = session.build_submission(self.clock.now())?;
        let id = match self.submissions.append_submission(&submission).await {
            Ok(id) => id,
            Err(StorageError::Conflict) => self
                .submissions
                .find_by_draft(session.draft_id())
                .await?
                .ok_or(StorageError::Conflict)?,
            Err(err) => return Err(err.into()),
        };
        session.set_submission_id(id);

        if let Err(err) = self.drafts.delete_draft(session.draft_id()).await {
            warn!(draft_id = %session.draft_id(), error = %err, "failed to remove submitted draft");
        }

        info!(
            draft_id = %session.draft_id(),
            submission_id = %id,
            questions = submission.question_count(),
            "questionnaire submitted"
        );
        Ok(id)
    }

    /// Fetch a stored submission.
    ///
    /// # Errors
    ///
    /// Returns `QuestionnaireError::Storage` if it is missing or unreadable.
    pub async fn get_submission(&self, id: SubmissionId) -> Result<Submission, QuestionnaireError> {
        Ok(self.submissions.get_submission(id).await?)
    }

    /// List recent submissions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QuestionnaireError::Storage` on storage failures.
    pub async fn list_submissions(
        &self,
        limit: u32,
    ) -> Result<Vec<SubmissionRow>, QuestionnaireError> {
        Ok(self.submissions.list_submissions(limit).await?)
    }

    async fn commit(
        &self,
        session: &mut QuestionnaireSession,
        next: QuestionnaireSession,
    ) -> Result<(), QuestionnaireError> {
        self.drafts.save_draft(&next.to_draft()?).await?;
        *session = next;
        Ok(())
    }
}
