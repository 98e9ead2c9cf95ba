use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AnswerSet, DraftId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DraftError {
    #[error("current step must be >= 1")]
    InvalidStep,

    #[error("updated_at is before started_at")]
    InvalidTimeRange,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("submitted_at is before started_at")]
    InvalidTimeRange,

    #[error("cannot submit an empty questionnaire")]
    EmptyAnswers,
}

/// Resumable state of one questionnaire run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireDraft {
    id: DraftId,
    answers: AnswerSet,
    current_step: u32,
    started_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl QuestionnaireDraft {
    /// Empty draft positioned on the first step.
    #[must_use]
    pub fn new(id: DraftId, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            answers: AnswerSet::new(),
            current_step: 1,
            started_at,
            updated_at: started_at,
        }
    }

    /// Assemble a draft from stored or in-progress state.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::InvalidStep` for a zero step and
    /// `DraftError::InvalidTimeRange` if `updated_at` precedes `started_at`.
    pub fn from_parts(
        id: DraftId,
        answers: AnswerSet,
        current_step: u32,
        started_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DraftError> {
        if current_step == 0 {
            return Err(DraftError::InvalidStep);
        }
        if updated_at < started_at {
            return Err(DraftError::InvalidTimeRange);
        }
        Ok(Self {
            id,
            answers,
            current_step,
            started_at,
            updated_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> DraftId {
        self.id
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    #[must_use]
    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Final record of a completed questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    draft_id: DraftId,
    answers: AnswerSet,
    started_at: DateTime<Utc>,
    submitted_at: DateTime<Utc>,
    question_count: u32,
}

impl Submission {
    /// Build a submission from the answers of a finished run.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::InvalidTimeRange` if `submitted_at` is before
    /// `started_at`, or `SubmissionError::EmptyAnswers` if nothing was answered.
    pub fn new(
        draft_id: DraftId,
        answers: AnswerSet,
        started_at: DateTime<Utc>,
        submitted_at: DateTime<Utc>,
        question_count: u32,
    ) -> Result<Self, SubmissionError> {
        if submitted_at < started_at {
            return Err(SubmissionError::InvalidTimeRange);
        }
        if answers.is_empty() {
            return Err(SubmissionError::EmptyAnswers);
        }
        Ok(Self {
            draft_id,
            answers,
            started_at,
            submitted_at,
            question_count,
        })
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
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn draft_rejects_zero_step() {
        let now = fixed_now();
        let err = QuestionnaireDraft::from_parts(DraftId::new(1), AnswerSet::new(), 0, now, now)
            .unwrap_err();
        assert_eq!(err, DraftError::InvalidStep);
    }

    #[test]
    fn submission_rejects_time_travel() {
        let now = fixed_now();
        let answers = AnswerSet::new().with("travelGroup", "solo");
        let err = Submission::new(
            DraftId::new(1),
            answers,
            now,
            now - chrono::Duration::minutes(1),
            5,
        )
        .unwrap_err();
        assert_eq!(err, SubmissionError::InvalidTimeRange);
    }

    #[test]
    fn submission_requires_answers() {
        let now = fixed_now();
        let err = Submission::new(DraftId::new(1), AnswerSet::new(), now, now, 0).unwrap_err();
        assert_eq!(err, SubmissionError::EmptyAnswers);
    }
}
