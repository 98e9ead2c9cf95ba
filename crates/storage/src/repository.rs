use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use trip_core::model::{DraftId, QuestionnaireDraft, Submission, SubmissionId};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Stored submission together with its assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRow {
    pub id: SubmissionId,
    pub submission: Submission,
}

impl SubmissionRow {
    #[must_use]
    pub fn new(id: SubmissionId, submission: Submission) -> Self {
        Self { id, submission }
    }
}

/// Repository contract for in-progress questionnaires.
#[async_trait]
pub trait DraftRepository: Send + Sync {
    /// Create an empty draft and assign it an id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the draft cannot be stored.
    async fn create_draft(
        &self,
        started_at: DateTime<Utc>,
    ) -> Result<QuestionnaireDraft, StorageError>;

    /// Overwrite the stored state of an existing draft.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the draft does not exist.
    async fn save_draft(&self, draft: &QuestionnaireDraft) -> Result<(), StorageError>;

    /// Fetch a draft by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_draft(&self, id: DraftId) -> Result<QuestionnaireDraft, StorageError>;

    /// Remove a draft. Removing a missing draft is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete query fails.
    async fn delete_draft(&self, id: DraftId) -> Result<(), StorageError>;
}

/// Repository contract for finished questionnaires.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Append a submission and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the draft was already submitted,
    /// or other storage errors.
    async fn append_submission(&self, submission: &Submission)
    -> Result<SubmissionId, StorageError>;

    /// Id of the submission recorded for `draft_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query or decoding failures.
    async fn find_by_draft(&self, draft_id: DraftId) -> Result<Option<SubmissionId>, StorageError>;

    /// Fetch a submission by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_submission(&self, id: SubmissionId) -> Result<Submission, StorageError>;

    /// List the most recent submissions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query or decoding failures.
    async fn list_submissions(&self, limit: u32) -> Result<Vec<SubmissionRow>, StorageError>;
}

#[derive(Default)]
struct InMemoryState {
    drafts: BTreeMap<DraftId, QuestionnaireDraft>,
    submissions: BTreeMap<SubmissionId, Submission>,
    next_draft: u64,
    next_submission: u64,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl DraftRepository for InMemoryRepository {
    async fn create_draft(
        &self,
        started_at: DateTime<Utc>,
    ) -> Result<QuestionnaireDraft, StorageError> {
        let mut guard = self.lock()?;
        guard.next_draft += 1;
        let draft = QuestionnaireDraft::new(DraftId::new(guard.next_draft), started_at);
        guard.drafts.insert(draft.id(), draft.clone());
        Ok(draft)
    }

    async fn save_draft(&self, draft: &QuestionnaireDraft) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let slot = guard
            .drafts
            .get_mut(&draft.id())
            .ok_or(StorageError::NotFound)?;
        *slot = draft.clone();
        Ok(())
    }

    async fn get_draft(&self, id: DraftId) -> Result<QuestionnaireDraft, StorageError> {
        let guard = self.lock()?;
        guard.drafts.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn delete_draft(&self, id: DraftId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.drafts.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryRepository {
    async fn append_submission(
        &self,
        submission: &Submission,
    ) -> Result<SubmissionId, StorageError> {
        let mut guard = self.lock()?;
        if guard
            .submissions
            .values()
            .any(|s| s.draft_id() == submission.draft_id())
        {
            return Err(StorageError::Conflict);
        }
        guard.next_submission += 1;
        let id = SubmissionId::new(guard.next_submission);
        guard.submissions.insert(id, submission.clone());
        Ok(id)
    }

    async fn find_by_draft(&self, draft_id: DraftId) -> Result<Option<SubmissionId>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .submissions
            .iter()
            .find(|(_, s)| s.draft_id() == draft_id)
            .map(|(id, _)| *id))
    }

    async fn get_submission(&self, id: SubmissionId) -> Result<Submission, StorageError> {
        let guard = self.lock()?;
        guard
            .submissions
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_submissions(&self, limit: u32) -> Result<Vec<SubmissionRow>, StorageError> {
        let guard = self.lock()?;
        let mut rows: Vec<SubmissionRow> = guard
            .submissions
            .iter()
            .map(|(id, s)| SubmissionRow::new(*id, s.clone()))
            .collect();
        rows.sort_by(|a, b| {
            b.submission
                .submitted_at()
                .cmp(&a.submission.submitted_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

/// Aggregates draft and submission repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub drafts: Arc<dyn DraftRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let drafts: Arc<dyn DraftRepository> = Arc::new(repo.clone());
        let submissions: Arc<dyn SubmissionRepository> = Arc::new(repo);
        Self {
            drafts,
            submissions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trip_core::model::AnswerSet;
    use trip_core::time::fixed_now;

    fn build_submission(draft: u64, minutes: i64) -> Submission {
        let now = fixed_now();
        Submission::new(
            DraftId::new(draft),
            AnswerSet::new().with("travelGroup", "solo"),
            now,
            now + chrono::Duration::minutes(minutes),
            6,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn draft_round_trips_with_answers() {
        let repo = InMemoryRepository::new();
        let draft = repo.create_draft(fixed_now()).await.unwrap();
        assert_eq!(draft.current_step(), 1);

        let updated = QuestionnaireDraft::from_parts(
            draft.id(),
            AnswerSet::new().with("travelGroup", "couple"),
            2,
            draft.started_at(),
            fixed_now() + chrono::Duration::seconds(30),
        )
        .unwrap();
        repo.save_draft(&updated).await.unwrap();

        let fetched = repo.get_draft(draft.id()).await.unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn saving_unknown_draft_is_not_found() {
        let repo = InMemoryRepository::new();
        let ghost = QuestionnaireDraft::new(DraftId::new(99), fixed_now());
        let err = repo.save_draft(&ghost).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn delete_draft_is_idempotent() {
        let repo = InMemoryRepository::new();
        let draft = repo.create_draft(fixed_now()).await.unwrap();
        repo.delete_draft(draft.id()).await.unwrap();
        repo.delete_draft(draft.id()).await.unwrap();
        assert!(matches!(
            repo.get_draft(draft.id()).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn lists_newest_submissions_first() {
        let repo = InMemoryRepository::new();
        let older = repo.append_submission(&build_submission(1, 1)).await.unwrap();
        let newer = repo.append_submission(&build_submission(2, 5)).await.unwrap();

        let rows = repo.list_submissions(10).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![newer, older]);

        let limited = repo.list_submissions(1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, newer);
    }

    #[tokio::test]
    async fn second_submission_for_a_draft_conflicts() {
        let repo = InMemoryRepository::new();
        let id = repo.append_submission(&build_submission(7, 1)).await.unwrap();

        let err = repo
            .append_submission(&build_submission(7, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
        assert_eq!(repo.find_by_draft(DraftId::new(7)).await.unwrap(), Some(id));
        assert_eq!(repo.find_by_draft(DraftId::new(8)).await.unwrap(), None);
        assert_eq!(repo.list_submissions(10).await.unwrap().len(), 1);
    }
}
