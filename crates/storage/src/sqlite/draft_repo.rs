use chrono::{DateTime, Utc};
use trip_core::model::{DraftId, QuestionnaireDraft};

use super::SqliteRepository;
use super::mapping::{answers_to_json, conn, draft_id_from_i64, id_to_i64, map_draft_row};
use crate::repository::{DraftRepository, StorageError};

#[async_trait::async_trait]
impl DraftRepository for SqliteRepository {
    async fn create_draft(
        &self,
        started_at: DateTime<Utc>,
    ) -> Result<QuestionnaireDraft, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO questionnaire_drafts (answers, current_step, started_at, updated_at)
                VALUES ('{}', 1, ?1, ?1)
            ",
        )
        .bind(started_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        let id = draft_id_from_i64(res.last_insert_rowid())?;
        Ok(QuestionnaireDraft::new(id, started_at))
    }

    async fn save_draft(&self, draft: &QuestionnaireDraft) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
                UPDATE questionnaire_drafts
                SET answers = ?2, current_step = ?3, updated_at = ?4
                WHERE id = ?1
            ",
        )
        .bind(id_to_i64("draft_id", draft.id().value())?)
        .bind(answers_to_json(draft.answers())?)
        .bind(i64::from(draft.current_step()))
        .bind(draft.updated_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_draft(&self, id: DraftId) -> Result<QuestionnaireDraft, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, answers, current_step, started_at, updated_at
                FROM questionnaire_drafts
                WHERE id = ?1
            ",
        )
        .bind(id_to_i64("draft_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_draft_row(&row)
    }

    async fn delete_draft(&self, id: DraftId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM questionnaire_drafts WHERE id = ?1")
            .bind(id_to_i64("draft_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
