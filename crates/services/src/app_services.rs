use std::sync::Arc;

use storage::repository::Storage;
use tracing::info;

use crate::Clock;
use crate::error::AppServicesError;
use crate::questionnaire::QuestionnaireLoopService;

/// Assembles app-facing services over a storage backend.
#[derive(Clone)]
pub struct AppServices {
    questionnaire: Arc<QuestionnaireLoopService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        info!(db_url, "sqlite storage ready");
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services over volatile in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let questionnaire = Arc::new(QuestionnaireLoopService::new(
            clock,
            Arc::clone(&storage.drafts),
            Arc::clone(&storage.submissions),
        ));
        Self { questionnaire }
    }

    #[must_use]
    pub fn questionnaire(&self) -> Arc<QuestionnaireLoopService> {
        Arc::clone(&self.questionnaire)
    }
}
