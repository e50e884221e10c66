use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::{Quiz, QuizQuestion};

const COLUMNS: &str =
    "id, title, subject_id, teacher_id, due_date, questions, created_at, updated_at";

const DETAIL_SELECT: &str = "\
    SELECT q.id, q.title, q.subject_id, s.name AS subject_name, \
           q.teacher_id, t.username AS teacher_username, \
           q.due_date, q.questions, q.created_at \
    FROM quizzes q \
    LEFT JOIN subjects s ON s.id = q.subject_id \
    LEFT JOIN users t ON t.id = q.teacher_id";

/// A quiz with its subject and teacher labels resolved.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct QuizDetailRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) subject_id: Option<String>,
    pub(crate) subject_name: Option<String>,
    pub(crate) teacher_id: Option<String>,
    pub(crate) teacher_username: Option<String>,
    pub(crate) due_date: Option<PrimitiveDateTime>,
    pub(crate) questions: Json<Vec<QuizQuestion>>,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) struct CreateQuiz<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub subject_id: Option<&'a str>,
    pub teacher_id: Option<&'a str>,
    pub due_date: Option<PrimitiveDateTime>,
    pub questions: Vec<QuizQuestion>,
    pub now: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuiz<'_>,
) -> Result<Quiz, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "INSERT INTO quizzes (
            id, title, subject_id, teacher_id, due_date, questions, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$7)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.title.trim())
    .bind(params.subject_id)
    .bind(params.teacher_id)
    .bind(params.due_date)
    .bind(Json(params.questions))
    .bind(params.now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!("SELECT {COLUMNS} FROM quizzes WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_detail(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<QuizDetailRow>, sqlx::Error> {
    sqlx::query_as::<_, QuizDetailRow>(&format!("{DETAIL_SELECT} WHERE q.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Every quiz, soonest due first; undated quizzes last.
pub(crate) async fn list_details(pool: &PgPool) -> Result<Vec<QuizDetailRow>, sqlx::Error> {
    sqlx::query_as::<_, QuizDetailRow>(&format!(
        "{DETAIL_SELECT} ORDER BY q.due_date ASC NULLS LAST, q.created_at ASC"
    ))
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct RecentQuizRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) subject_name: Option<String>,
    pub(crate) due_date: Option<PrimitiveDateTime>,
    pub(crate) question_count: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) result_count: i64,
    pub(crate) avg_score: Option<f64>,
}

pub(crate) async fn recent_for_teacher(
    pool: &PgPool,
    teacher_id: &str,
    limit: i64,
) -> Result<Vec<RecentQuizRow>, sqlx::Error> {
    sqlx::query_as::<_, RecentQuizRow>(
        "SELECT q.id, q.title, s.name AS subject_name, q.due_date,
                jsonb_array_length(q.questions)::INTEGER AS question_count,
                q.created_at,
                COUNT(qa.id) AS result_count,
                AVG(qa.score)::DOUBLE PRECISION AS avg_score
         FROM quizzes q
         LEFT JOIN subjects s ON s.id = q.subject_id
         LEFT JOIN quiz_answers qa ON qa.quiz_id = q.id
         WHERE q.teacher_id = $1
         GROUP BY q.id, s.name
         ORDER BY q.created_at DESC
         LIMIT $2",
    )
    .bind(teacher_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
