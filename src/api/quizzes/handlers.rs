use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::helpers::{
    completed_entry, record_attempt, require_quiz, student_answers, upcoming_entry,
    upcoming_quizzes,
};
use crate::api::errors::ApiError;
use crate::api::extract::ApiJson;
use crate::api::lookups::{fetch_user_with_role, require_student};
use crate::api::validation::{require_text, validate_payload};
use crate::core::state::AppState;
use crate::core::time::{format_primitive, parse_datetime_flexible, primitive_now_utc};
use crate::db::models::Subject;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::quiz::{
    QuizCreate, QuizResponse, QuizSubmitRequest, QuizSubmitResponse, RecentQuizResponse,
    ResultResponse, StudentQuizEntry, UNKNOWN_SUBJECT,
};
use crate::services::analytics::{score_summary, ScorePoint, ScoreSummary};

const RECENT_QUIZ_LIMIT: i64 = 10;

pub(super) async fn create_quiz(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<QuizCreate>,
) -> Result<(StatusCode, Json<QuizResponse>), ApiError> {
    validate_payload(&payload)?;

    let teacher = match payload.teacher_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(teacher_id) => Some(
            fetch_user_with_role(&state, teacher_id, UserRole::Teacher)
                .await?
                .ok_or_else(|| ApiError::bad_request("Teacher does not exist"))?,
        ),
        None => None,
    };

    let due_date = match payload.date.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => Some(
            parse_datetime_flexible(raw)
                .ok_or_else(|| ApiError::bad_request(format!("Invalid quiz date: {raw}")))?,
        ),
        None => None,
    };

    let now = primitive_now_utc();
    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to begin quiz"))?;

    let subject = resolve_subject(
        &mut tx,
        payload.subject_id.as_deref(),
        payload.subject.as_deref(),
        teacher.as_ref().map(|teacher| teacher.id.as_str()),
    )
    .await?;

    let quiz = repositories::quizzes::create(
        &mut *tx,
        repositories::quizzes::CreateQuiz {
            id: &Uuid::new_v4().to_string(),
            title: &payload.title,
            subject_id: subject.as_ref().map(|subject| subject.id.as_str()),
            teacher_id: teacher.as_ref().map(|teacher| teacher.id.as_str()),
            due_date,
            questions: payload.questions,
            now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create quiz"))?;

    let detail = repositories::quizzes::find_detail(&mut *tx, &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load quiz"))?
        .ok_or_else(|| ApiError::Internal("Created quiz is missing".to_string()))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit quiz"))?;

    tracing::info!(
        quiz_id = %quiz.id,
        questions = quiz.questions.0.len(),
        subject_id = ?quiz.subject_id,
        teacher_id = ?quiz.teacher_id,
        "Quiz created"
    );

    Ok((StatusCode::CREATED, Json(QuizResponse::from_row(detail))))
}

/// Subject by id, else by name (created on first use and owned by the author).
async fn resolve_subject(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    subject_id: Option<&str>,
    subject_name: Option<&str>,
    teacher_id: Option<&str>,
) -> Result<Option<Subject>, ApiError> {
    if let Ok(subject_id) = require_text(subject_id, "subject_id") {
        return repositories::subjects::find_by_id(&mut **tx, subject_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch subject"))?
            .ok_or_else(|| ApiError::bad_request("Subject does not exist"))
            .map(Some);
    }

    let Ok(name) = require_text(subject_name, "subject") else {
        return Ok(None);
    };

    if let Some(existing) = repositories::subjects::find_by_name(&mut **tx, name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch subject"))?
    {
        return Ok(Some(existing));
    }

    let created = repositories::subjects::create_if_absent(
        &mut **tx,
        repositories::subjects::CreateSubject {
            id: &Uuid::new_v4().to_string(),
            name,
            teacher_id,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create subject"))?;

    match created {
        Some(subject) => Ok(Some(subject)),
        None => repositories::subjects::find_by_name(&mut **tx, name)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch subject")),
    }
}

pub(super) async fn get_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<QuizResponse>, ApiError> {
    let detail = repositories::quizzes::find_detail(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?
        .ok_or_else(|| ApiError::not_found("Quiz not found"))?;
    Ok(Json(QuizResponse::from_row(detail)))
}

pub(super) async fn upcoming_for_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<QuizResponse>>, ApiError> {
    let student = require_student(&state, &student_id).await?;
    let quizzes = upcoming_quizzes(&state, &student).await?;
    Ok(Json(quizzes.into_iter().map(QuizResponse::from_row).collect()))
}

pub(super) async fn student_results(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<StudentQuizEntry>>, ApiError> {
    let student = require_student(&state, &student_id).await?;
    let completed = student_answers(&state, &student.id).await?;
    let upcoming = upcoming_quizzes(&state, &student).await?;

    let entries = completed
        .iter()
        .map(completed_entry)
        .chain(upcoming.iter().map(upcoming_entry))
        .collect();
    Ok(Json(entries))
}

pub(super) async fn student_score_trend(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<ScoreSummary>, ApiError> {
    let student = require_student(&state, &student_id).await?;
    let rows = student_answers(&state, &student.id).await?;

    let points = rows
        .into_iter()
        .map(|row| ScorePoint {
            quiz_id: row.quiz_id,
            quiz_title: row.quiz_title,
            subject: row.subject_name.unwrap_or_else(|| UNKNOWN_SUBJECT.to_string()),
            score: row.score,
            completed_at: format_primitive(row.completed_at),
            completed_at_raw: row.completed_at,
        })
        .collect();

    Ok(Json(score_summary(points)))
}

pub(super) async fn submit_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    ApiJson(payload): ApiJson<QuizSubmitRequest>,
) -> Result<Json<QuizSubmitResponse>, ApiError> {
    let student_id = require_text(payload.student_id.as_deref(), "student_id")?;
    let quiz = require_quiz(&state, &quiz_id).await?;
    let student = require_student(&state, student_id).await?;

    let scored = record_attempt(&state, &quiz, &student, &payload.answers, "quiz_submit").await?;

    Ok(Json(QuizSubmitResponse {
        message: "Quiz submitted successfully".to_string(),
        score: scored.score,
        answers: scored.selections(),
    }))
}

pub(super) async fn all_results(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResultResponse>>, ApiError> {
    results(&state, None).await.map(Json)
}

pub(super) async fn teacher_results(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> Result<Json<Vec<ResultResponse>>, ApiError> {
    results(&state, Some(&teacher_id)).await.map(Json)
}

async fn results(state: &AppState, teacher_id: Option<&str>) -> Result<Vec<ResultResponse>, ApiError> {
    let rows = repositories::quiz_answers::list_results(state.db(), teacher_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list quiz results"))?;
    Ok(rows.into_iter().map(ResultResponse::from_row).collect())
}

pub(super) async fn recent_for_teacher(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> Result<Json<Vec<RecentQuizResponse>>, ApiError> {
    let rows = repositories::quizzes::recent_for_teacher(state.db(), &teacher_id, RECENT_QUIZ_LIMIT)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list recent quizzes"))?;
    Ok(Json(rows.into_iter().map(RecentQuizResponse::from_row).collect()))
}
