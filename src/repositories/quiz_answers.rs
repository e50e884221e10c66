use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::{AnswerEntry, QuizAnswer};

const COLUMNS: &str = "\
    id, quiz_id, student_id, answers, score, total_questions, correct_answers, \
    completed_at, created_at, updated_at";

pub(crate) struct UpsertQuizAnswer<'a> {
    pub id: &'a str,
    pub quiz_id: &'a str,
    pub student_id: &'a str,
    pub answers: Vec<AnswerEntry>,
    pub score: i32,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub now: PrimitiveDateTime,
}

/// Inserts the submission or overwrites the existing one for the same (quiz, student).
/// The unique constraint serializes concurrent resubmissions.
pub(crate) async fn upsert(
    executor: impl sqlx::PgExecutor<'_>,
    params: UpsertQuizAnswer<'_>,
) -> Result<QuizAnswer, sqlx::Error> {
    sqlx::query_as::<_, QuizAnswer>(&format!(
        "INSERT INTO quiz_answers (
            id, quiz_id, student_id, answers, score, total_questions, correct_answers,
            completed_at, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$8,$8)
         ON CONFLICT (quiz_id, student_id) DO UPDATE SET
            answers = EXCLUDED.answers,
            score = EXCLUDED.score,
            total_questions = EXCLUDED.total_questions,
            correct_answers = EXCLUDED.correct_answers,
            completed_at = EXCLUDED.completed_at,
            updated_at = EXCLUDED.updated_at
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.quiz_id)
    .bind(params.student_id)
    .bind(Json(params.answers))
    .bind(params.score)
    .bind(params.total_questions)
    .bind(params.correct_answers)
    .bind(params.now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_for_quiz_student(
    pool: &PgPool,
    quiz_id: &str,
    student_id: &str,
) -> Result<Option<QuizAnswer>, sqlx::Error> {
    sqlx::query_as::<_, QuizAnswer>(&format!(
        "SELECT {COLUMNS} FROM quiz_answers WHERE quiz_id = $1 AND student_id = $2"
    ))
    .bind(quiz_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

#[cfg(test)]
pub(crate) async fn count_for_quiz_student(
    pool: &PgPool,
    quiz_id: &str,
    student_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM quiz_answers WHERE quiz_id = $1 AND student_id = $2",
    )
    .bind(quiz_id)
    .bind(student_id)
    .fetch_one(pool)
    .await
}

/// One of a student's submissions with the quiz labels needed for display and analytics.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct StudentAnswerRow {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) quiz_title: String,
    pub(crate) subject_id: Option<String>,
    pub(crate) subject_name: Option<String>,
    pub(crate) teacher_id: Option<String>,
    pub(crate) teacher_username: Option<String>,
    pub(crate) score: i32,
    pub(crate) correct_answers: i32,
    pub(crate) total_questions: i32,
    pub(crate) completed_at: PrimitiveDateTime,
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<StudentAnswerRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentAnswerRow>(
        "SELECT qa.id, qa.quiz_id, q.title AS quiz_title,
                q.subject_id, s.name AS subject_name,
                q.teacher_id, t.username AS teacher_username,
                qa.score, qa.correct_answers, qa.total_questions, qa.completed_at
         FROM quiz_answers qa
         JOIN quizzes q ON q.id = qa.quiz_id
         LEFT JOIN subjects s ON s.id = q.subject_id
         LEFT JOIN users t ON t.id = q.teacher_id
         WHERE qa.student_id = $1
         ORDER BY qa.completed_at DESC",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct QuizResultRow {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) quiz_title: String,
    pub(crate) student_id: String,
    pub(crate) student_username: String,
    pub(crate) student_email: String,
    pub(crate) score: i32,
    pub(crate) correct_answers: i32,
    pub(crate) total_questions: i32,
    pub(crate) completed_at: PrimitiveDateTime,
}

pub(crate) async fn list_for_quiz(
    pool: &PgPool,
    quiz_id: &str,
) -> Result<Vec<QuizResultRow>, sqlx::Error> {
    sqlx::query_as::<_, QuizResultRow>(
        "SELECT qa.id, qa.quiz_id, q.title AS quiz_title,
                qa.student_id, u.username AS student_username, u.email AS student_email,
                qa.score, qa.correct_answers, qa.total_questions, qa.completed_at
         FROM quiz_answers qa
         JOIN quizzes q ON q.id = qa.quiz_id
         JOIN users u ON u.id = qa.student_id
         WHERE qa.quiz_id = $1
         ORDER BY qa.completed_at DESC",
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}

/// A submission with every label the results tables fall back through.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ResultRow {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) quiz_title: String,
    pub(crate) subject_name: Option<String>,
    pub(crate) teacher_id: Option<String>,
    pub(crate) teacher_username: Option<String>,
    pub(crate) teacher_subjects: Option<Vec<String>>,
    pub(crate) student_id: String,
    pub(crate) student_username: String,
    pub(crate) student_email: String,
    pub(crate) student_subjects: Vec<String>,
    pub(crate) score: i32,
    pub(crate) correct_answers: i32,
    pub(crate) total_questions: i32,
    pub(crate) completed_at: PrimitiveDateTime,
}

/// All submissions, newest first, optionally limited to one teacher's quizzes.
pub(crate) async fn list_results(
    pool: &PgPool,
    teacher_id: Option<&str>,
) -> Result<Vec<ResultRow>, sqlx::Error> {
    sqlx::query_as::<_, ResultRow>(
        "SELECT qa.id, qa.quiz_id, q.title AS quiz_title, s.name AS subject_name,
                q.teacher_id, t.username AS teacher_username,
                t.teaching_subjects AS teacher_subjects,
                qa.student_id, u.username AS student_username, u.email AS student_email,
                u.subjects AS student_subjects,
                qa.score, qa.correct_answers, qa.total_questions, qa.completed_at
         FROM quiz_answers qa
         JOIN quizzes q ON q.id = qa.quiz_id
         JOIN users u ON u.id = qa.student_id
         LEFT JOIN subjects s ON s.id = q.subject_id
         LEFT JOIN users t ON t.id = q.teacher_id
         WHERE ($1::TEXT IS NULL OR q.teacher_id = $1)
         ORDER BY qa.completed_at DESC",
    )
    .bind(teacher_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn completed_quiz_ids(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT quiz_id FROM quiz_answers WHERE student_id = $1")
        .bind(student_id)
        .fetch_all(pool)
        .await
}
