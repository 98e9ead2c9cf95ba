use chrono::{DateTime, Utc};
use trip_core::model::{
    AnswerSet, AnswerValue, DraftId, Milestone, MilestoneKey, PlannedQuestion, QuestionnaireDraft,
    Submission, SubmissionId,
};
use trip_core::progress::{MilestonePosition, locate, overall_percent};
use trip_core::{QuestionPlan, plan_questions};

use super::progress::QuestionnaireProgress;
use crate::error::QuestionnaireError;

/// In-memory state of one questionnaire run.
///
/// Owns the answer set and re-plans the question sequence after every change.
/// The current step is 1-based and never exceeds the finalization step of the
/// latest plan.
#[derive(Debug, Clone)]
pub struct QuestionnaireSession {
    draft_id: DraftId,
    answers: AnswerSet,
    plan: QuestionPlan,
    current_step: u32,
    started_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    submission_id: Option<SubmissionId>,
}

impl QuestionnaireSession {
    /// Fresh session on step 1 with no answers.
    #[must_use]
    pub fn new(draft_id: DraftId, started_at: DateTime<Utc>) -> Self {
        Self::from_draft(&QuestionnaireDraft::new(draft_id, started_at))
    }

    /// Resume a session from a stored draft.
    ///
    /// A stored step beyond the re-computed plan is clamped to the final step.
    #[must_use]
    pub fn from_draft(draft: &QuestionnaireDraft) -> Self {
        let answers = draft.answers().clone();
        let plan = plan_questions(&answers);
        let current_step = draft.current_step().clamp(1, plan.total_steps());
        Self {
            draft_id: draft.id(),
            answers,
            plan,
            current_step,
            started_at: draft.started_at(),
            updated_at: draft.updated_at(),
            submission_id: None,
        }
    }

    #[must_use]
    pub fn draft_id(&self) -> DraftId {
        self.draft_id
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    #[must_use]
    pub fn plan(&self) -> &QuestionPlan {
        &self.plan
    }

    #[must_use]
    pub fn milestones(&self) -> &[Milestone] {
        self.plan.milestones()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn submission_id(&self) -> Option<SubmissionId> {
        self.submission_id
    }

    pub(crate) fn set_submission_id(&mut self, id: SubmissionId) {
        self.submission_id = Some(id);
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submission_id.is_some()
    }

    #[must_use]
    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    #[must_use]
    pub fn total_steps(&self) -> u32 {
        self.plan.total_steps()
    }

    /// Question asked at the current step; `None` on the finalization step.
    #[must_use]
    pub fn current_question(&self) -> Option<PlannedQuestion> {
        self.plan.question_at(self.current_step).copied()
    }

    #[must_use]
    pub fn is_at_finalization(&self) -> bool {
        self.current_step >= self.plan.finalization_step()
    }

    /// Active milestone and completion within it.
    #[must_use]
    pub fn position(&self) -> Option<MilestonePosition> {
        locate(self.plan.milestones(), self.current_step)
    }

    /// Returns a summary of the current questionnaire progress.
    #[must_use]
    pub fn progress(&self) -> QuestionnaireProgress {
        let (milestone_index, milestone_key, phase_percent) = self.position().map_or(
            (0, MilestoneKey::Finalization, 0.0),
            |p| (p.index, p.key, p.phase_percent),
        );
        QuestionnaireProgress {
            current_step: self.current_step,
            total_steps: self.total_steps(),
            overall_percent: overall_percent(self.current_step, self.total_steps()),
            milestone_index,
            milestone_key,
            phase_percent,
            is_at_finalization: self.is_at_finalization(),
        }
    }

    /// Answer the current question and advance one step.
    ///
    /// `answered_at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `QuestionnaireError::Completed` on the finalization step or
    /// after submission.
    pub fn answer_current(
        &mut self,
        value: impl Into<AnswerValue>,
        answered_at: DateTime<Utc>,
    ) -> Result<PlannedQuestion, QuestionnaireError> {
        if self.is_submitted() {
            return Err(QuestionnaireError::Completed);
        }
        let Some(question) = self.current_question() else {
            return Err(QuestionnaireError::Completed);
        };

        self.answers.set(question.key.as_str(), value);
        self.replan(answered_at);
        self.current_step = (self.current_step + 1).min(self.total_steps());
        Ok(question)
    }

    /// Store an answer under any key without moving the cursor.
    ///
    /// # Errors
    ///
    /// Returns `QuestionnaireError::Completed` after submission.
    pub fn record_answer(
        &mut self,
        key: &str,
        value: impl Into<AnswerValue>,
        answered_at: DateTime<Utc>,
    ) -> Result<(), QuestionnaireError> {
        if self.is_submitted() {
            return Err(QuestionnaireError::Completed);
        }
        self.answers.set(key, value);
        self.replan(answered_at);
        Ok(())
    }

    /// Move one step back. Stays on step 1.
    pub fn go_back(&mut self, at: DateTime<Utc>) -> u32 {
        self.go_to(self.current_step.saturating_sub(1), at)
    }

    /// Jump to `step`, clamped to the current plan.
    pub fn go_to(&mut self, step: u32, at: DateTime<Utc>) -> u32 {
        self.current_step = step.clamp(1, self.total_steps());
        self.touch(at);
        self.current_step
    }

    /// Snapshot for persistence.
    ///
    /// # Errors
    ///
    /// Returns `DraftError` if the snapshot is inconsistent.
    pub fn to_draft(&self) -> Result<QuestionnaireDraft, QuestionnaireError> {
        Ok(QuestionnaireDraft::from_parts(
            self.draft_id,
            self.answers.clone(),
            self.current_step,
            self.started_at,
            self.updated_at,
        )?)
    }

    /// Build the final record. Only allowed on the finalization step.
    ///
    /// # Errors
    ///
    /// Returns `QuestionnaireError::NotFinished` before the last step and
    /// `QuestionnaireError::Submission` if the record fails validation.
    pub fn build_submission(
        &self,
        submitted_at: DateTime<Utc>,
    ) -> Result<Submission, QuestionnaireError> {
        if !self.is_at_finalization() {
            return Err(QuestionnaireError::NotFinished {
                current: self.current_step,
                total: self.total_steps(),
            });
        }
        let question_count = u32::try_from(self.plan.questions().len()).unwrap_or(u32::MAX);
        Ok(Submission::new(
            self.draft_id,
            self.answers.clone(),
            self.started_at,
            submitted_at,
            question_count,
        )?)
    }

    fn replan(&mut self, at: DateTime<Utc>) {
        self.plan = plan_questions(&self.answers);
        self.current_step = self.current_step.clamp(1, self.plan.total_steps());
        self.touch(at);
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        if at > self.updated_at {
            self.updated_at = at;
        }
    }
}
