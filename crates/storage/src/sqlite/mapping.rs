use sqlx::Row;
use trip_core::model::{AnswerSet, DraftId, QuestionnaireDraft, Submission, SubmissionId};

use crate::repository::{StorageError, SubmissionRow};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Like `conn`, but a unique-key violation becomes `Conflict`.
pub(crate) fn insert_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => conn(e),
    }
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn draft_id_from_i64(v: i64) -> Result<DraftId, StorageError> {
    Ok(DraftId::new(i64_to_u64("draft_id", v)?))
}

pub(crate) fn submission_id_from_i64(v: i64) -> Result<SubmissionId, StorageError> {
    Ok(SubmissionId::new(i64_to_u64("submission_id", v)?))
}

/// Answer sets are stored as a flat JSON object.
pub(crate) fn answers_to_json(answers: &AnswerSet) -> Result<String, StorageError> {
    serde_json::to_string(answers).map_err(ser)
}

pub(crate) fn answers_from_json(raw: &str) -> Result<AnswerSet, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_draft_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuestionnaireDraft, StorageError> {
    let answers = answers_from_json(&row.try_get::<String, _>("answers").map_err(ser)?)?;
    let current_step = i64_to_u32(
        "current_step",
        row.try_get::<i64, _>("current_step").map_err(ser)?,
    )?;

    QuestionnaireDraft::from_parts(
        draft_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        answers,
        current_step,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_submission_row(row: &sqlx::sqlite::SqliteRow) -> Result<Submission, StorageError> {
    let answers = answers_from_json(&row.try_get::<String, _>("answers").map_err(ser)?)?;
    let question_count = i64_to_u32(
        "question_count",
        row.try_get::<i64, _>("question_count").map_err(ser)?,
    )?;

    Submission::new(
        draft_id_from_i64(row.try_get::<i64, _>("draft_id").map_err(ser)?)?,
        answers,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("submitted_at").map_err(ser)?,
        question_count,
    )
    .map_err(ser)
}

pub(crate) fn map_submission_row_with_id(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SubmissionRow, StorageError> {
    let id = submission_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    Ok(SubmissionRow::new(id, map_submission_row(row)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use trip_core::model::AnswerValue;

    #[test]
    fn answers_json_round_trip_keeps_shapes() {
        let answers = AnswerSet::new()
            .with("travelGroup", "family")
            .with("helpWith", AnswerValue::list(["flights", "activities"]))
            .with("budgetAmount", 2500.0);
        let json = answers_to_json(&answers).unwrap();
        assert_eq!(answers_from_json(&json).unwrap(), answers);
    }

    #[test]
    fn corrupt_answers_are_serialization_errors() {
        let err = answers_from_json("[1, 2").unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn negative_ids_are_rejected() {
        assert!(draft_id_from_i64(-1).is_err());
        assert_eq!(submission_id_from_i64(7).unwrap(), SubmissionId::new(7));
    }
}
