use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::Subject;

const COLUMNS: &str = "id, name, teacher_id, created_at, updated_at";

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(&format!("SELECT {COLUMNS} FROM subjects WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_name(
    executor: impl sqlx::PgExecutor<'_>,
    name: &str,
) -> Result<Option<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(&format!(
        "SELECT {COLUMNS} FROM subjects WHERE LOWER(name) = LOWER($1) ORDER BY created_at LIMIT 1"
    ))
    .bind(name.trim())
    .fetch_optional(executor)
    .await
}

pub(crate) struct CreateSubject<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub teacher_id: Option<&'a str>,
    pub now: PrimitiveDateTime,
}

/// Inserts the subject unless the name is taken, ignoring case. `None` means another row already owns it.
pub(crate) async fn create_if_absent(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateSubject<'_>,
) -> Result<Option<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(&format!(
        "INSERT INTO subjects (id, name, teacher_id, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $4)
         ON CONFLICT ((LOWER(name))) DO NOTHING
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.name.trim())
    .bind(params.teacher_id)
    .bind(params.now)
    .fetch_optional(executor)
    .await
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct SubjectWithTeacherRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) teacher_id: Option<String>,
    pub(crate) teacher_username: Option<String>,
    pub(crate) teacher_email: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn list_with_teachers(
    pool: &PgPool,
) -> Result<Vec<SubjectWithTeacherRow>, sqlx::Error> {
    sqlx::query_as::<_, SubjectWithTeacherRow>(
        "SELECT s.id, s.name, s.teacher_id,
                t.username AS teacher_username, t.email AS teacher_email,
                s.created_at
         FROM subjects s
         LEFT JOIN users t ON t.id = s.teacher_id
         ORDER BY s.name",
    )
    .fetch_all(pool)
    .await
}

pub(crate) async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subjects").fetch_one(pool).await
}
