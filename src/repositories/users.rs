use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::User;
use crate::db::types::UserRole;

const COLUMNS: &str = "\
    id, username, email, hashed_password, role, subjects, teaching_subjects, \
    ARRAY(SELECT st.teacher_id FROM student_teachers st \
          WHERE st.student_id = users.id ORDER BY st.position) AS teacher_ids, \
    created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_id_and_role(
    pool: &PgPool,
    id: &str,
    role: UserRole,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND role = $2"))
        .bind(id)
        .bind(role)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
    ))
    .bind(email.trim())
    .fetch_optional(pool)
    .await
}

pub(crate) async fn exists_by_email(
    executor: impl sqlx::PgExecutor<'_>,
    email: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE LOWER(email) = LOWER($1)")
        .bind(email.trim())
        .fetch_optional(executor)
        .await
}

/// Case-insensitive username lookup; students are additionally pinned to an email.
pub(crate) async fn find_by_username(
    pool: &PgPool,
    username: &str,
    role: UserRole,
    email: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users
         WHERE LOWER(username) = LOWER($1)
           AND role = $2
           AND ($3::TEXT IS NULL OR LOWER(email) = LOWER($3))
         ORDER BY created_at
         LIMIT 1"
    ))
    .bind(username.trim())
    .bind(role)
    .bind(email.map(str::trim))
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_many_by_ids(
    pool: &PgPool,
    ids: &[String],
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE id = ANY($1) ORDER BY array_position($1, id)"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_role(pool: &PgPool, role: UserRole) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE role = $1 ORDER BY created_at"
    ))
    .bind(role)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_teachers_for_subject(
    pool: &PgPool,
    subject_name: &str,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users
         WHERE role = $1
           AND EXISTS (
               SELECT 1 FROM unnest(teaching_subjects) AS taught(name)
               WHERE LOWER(taught.name) = LOWER($2)
           )
         ORDER BY username"
    ))
    .bind(UserRole::Teacher)
    .bind(subject_name.trim())
    .fetch_all(pool)
    .await
}

/// How many of `ids` name existing teacher accounts.
pub(crate) async fn count_teachers_among(
    executor: impl sqlx::PgExecutor<'_>,
    ids: &[String],
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = $1 AND id = ANY($2)")
        .bind(UserRole::Teacher)
        .bind(ids)
        .fetch_one(executor)
        .await
}

pub(crate) async fn count_by_role(pool: &PgPool, role: UserRole) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = $1")
        .bind(role)
        .fetch_one(pool)
        .await
}

pub(crate) struct CreateUser<'a> {
    pub id: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub hashed_password: String,
    pub role: UserRole,
    pub subjects: Vec<String>,
    pub teaching_subjects: Vec<String>,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateUser<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (
            id, username, email, hashed_password, role, subjects, teaching_subjects,
            created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)",
    )
    .bind(params.id)
    .bind(params.username.trim())
    .bind(params.email.trim())
    .bind(params.hashed_password)
    .bind(params.role)
    .bind(params.subjects)
    .bind(params.teaching_subjects)
    .bind(params.created_at)
    .bind(params.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Rewrites a student's teacher links, keeping the given order.
pub(crate) async fn replace_teachers(
    executor: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    student_id: &str,
    teacher_ids: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM student_teachers WHERE student_id = $1")
        .bind(student_id)
        .execute(&mut **executor)
        .await?;

    for (position, teacher_id) in teacher_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO student_teachers (student_id, teacher_id, position)
             VALUES ($1, $2, $3)
             ON CONFLICT (student_id, teacher_id) DO NOTHING",
        )
        .bind(student_id)
        .bind(teacher_id)
        .bind(position as i32)
        .execute(&mut **executor)
        .await?;
    }

    Ok(())
}

pub(crate) async fn update_subjects(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    subjects: Option<Vec<String>>,
    updated_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users SET
            subjects = COALESCE($1, subjects),
            updated_at = $2
         WHERE id = $3",
    )
    .bind(subjects)
    .bind(updated_at)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn update_password(
    pool: &PgPool,
    id: &str,
    hashed_password: &str,
    updated_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET hashed_password = $1, updated_at = $2 WHERE id = $3")
        .bind(hashed_password)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub(crate) async fn fetch_one_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_one(executor)
        .await
}

/// A student joined with their quiz totals.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct StudentSummaryRow {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) subjects: Vec<String>,
    pub(crate) teacher_ids: Vec<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) completed_quizzes: i64,
    pub(crate) average_score: Option<f64>,
}

pub(crate) async fn list_student_summaries(
    pool: &PgPool,
    teacher_id: Option<&str>,
) -> Result<Vec<StudentSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentSummaryRow>(
        "SELECT u.id, u.username, u.email, u.subjects,
                ARRAY(SELECT st.teacher_id FROM student_teachers st
                      WHERE st.student_id = u.id ORDER BY st.position) AS teacher_ids,
                u.created_at,
                COUNT(qa.id) AS completed_quizzes,
                AVG(qa.score)::DOUBLE PRECISION AS average_score
         FROM users u
         LEFT JOIN quiz_answers qa ON qa.student_id = u.id
         WHERE u.role = $1
           AND ($2::TEXT IS NULL OR EXISTS (
               SELECT 1 FROM student_teachers link
               WHERE link.student_id = u.id AND link.teacher_id = $2
           ))
         GROUP BY u.id
         ORDER BY u.created_at DESC",
    )
    .bind(UserRole::Student)
    .bind(teacher_id)
    .fetch_all(pool)
    .await
}
