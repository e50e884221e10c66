use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Feedback;
use crate::db::types::FeedbackDirection;

const COLUMNS: &str = "\
    id, direction, sender_id, sender_name, recipient_id, message, subject, created_at";

pub(crate) struct CreateFeedback<'a> {
    pub id: &'a str,
    pub direction: FeedbackDirection,
    pub sender_id: Option<&'a str>,
    pub sender_name: &'a str,
    pub recipient_id: &'a str,
    pub message: &'a str,
    pub subject: &'a str,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateFeedback<'_>,
) -> Result<Feedback, sqlx::Error> {
    sqlx::query_as::<_, Feedback>(&format!(
        "INSERT INTO feedback (
            id, direction, sender_id, sender_name, recipient_id, message, subject, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.direction)
    .bind(params.sender_id)
    .bind(params.sender_name)
    .bind(params.recipient_id)
    .bind(params.message.trim())
    .bind(params.subject)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

/// Feedback addressed to one user in one direction, newest first.
pub(crate) async fn list_for_recipient(
    pool: &PgPool,
    recipient_id: &str,
    direction: FeedbackDirection,
) -> Result<Vec<Feedback>, sqlx::Error> {
    sqlx::query_as::<_, Feedback>(&format!(
        "SELECT {COLUMNS} FROM feedback
         WHERE recipient_id = $1 AND direction = $2 AND BTRIM(message) <> ''
         ORDER BY created_at DESC"
    ))
    .bind(recipient_id)
    .bind(direction)
    .fetch_all(pool)
    .await
}
