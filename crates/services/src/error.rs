//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use trip_core::model::{DraftError, SubmissionError};

/// Errors emitted by questionnaire services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionnaireError {
    #[error("questionnaire already completed")]
    Completed,
    #[error("questionnaire is not at its final step (step {current} of {total})")]
    NotFinished { current: u32, total: u32 },
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
