use trip_core::model::{DraftId, Submission, SubmissionId};

use super::SqliteRepository;
use super::mapping::{
    answers_to_json, conn, id_to_i64, insert_err, map_submission_row,
    map_submission_row_with_id, submission_id_from_i64,
};
use crate::repository::{StorageError, SubmissionRepository, SubmissionRow};

#[async_trait::async_trait]
impl SubmissionRepository for SqliteRepository {
    async fn append_submission(
        &self,
        submission: &Submission,
    ) -> Result<SubmissionId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO submissions (
                    draft_id, answers, started_at, submitted_at, question_count
                )
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(id_to_i64("draft_id", submission.draft_id().value())?)
        .bind(answers_to_json(submission.answers())?)
        .bind(submission.started_at())
        .bind(submission.submitted_at())
        .bind(i64::from(submission.question_count()))
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;

        submission_id_from_i64(res.last_insert_rowid())
    }

    async fn find_by_draft(&self, draft_id: DraftId) -> Result<Option<SubmissionId>, StorageError> {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM submissions WHERE draft_id = ?1")
            .bind(id_to_i64("draft_id", draft_id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        id.map(submission_id_from_i64).transpose()
    }

    async fn get_submission(&self, id: SubmissionId) -> Result<Submission, StorageError> {
        let row = sqlx::query(
            r"
                SELECT draft_id, answers, started_at, submitted_at, question_count
                FROM submissions
                WHERE id = ?1
            ",
        )
        .bind(id_to_i64("submission_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_submission_row(&row)
    }

    async fn list_submissions(&self, limit: u32) -> Result<Vec<SubmissionRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, draft_id, answers, started_at, submitted_at, question_count
                FROM submissions
                ORDER BY submitted_at DESC, id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_submission_row_with_id(&row)?);
        }
        Ok(out)
    }
}
