use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::extract::ApiJson;
use crate::api::lookups::{require_student, require_teacher};
use crate::api::quizzes::helpers::student_answers;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::ai::{AnalyticsResponse, TipsPayload, TipsResponse};
use crate::services::analytics::{build_report, AttemptRecord, WeakAreaPolicy};
use crate::services::study_tips::TipsRequest;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/student/:student_id/analytics", get(student_analytics))
        .route("/teacher/:teacher_id/analytics", get(teacher_analytics))
        .route("/tips", post(study_tips))
}

fn weak_area_policy(state: &AppState) -> WeakAreaPolicy {
    let analytics = state.settings().analytics();
    WeakAreaPolicy {
        threshold: i32::try_from(analytics.weak_accuracy_threshold).unwrap_or(i32::MAX),
        limit: analytics.weak_area_limit,
    }
}

fn analytics_response(state: &AppState, records: Vec<AttemptRecord>) -> AnalyticsResponse {
    AnalyticsResponse {
        attempts: records.len(),
        report: build_report(&records, weak_area_policy(state)),
    }
}

async fn student_analytics(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let student = require_student(&state, &student_id).await?;
    let records = student_answers(&state, &student.id)
        .await?
        .into_iter()
        .map(|row| AttemptRecord {
            subject: row.subject_name,
            title: Some(row.quiz_title),
            score: Some(row.score),
            correct_answers: Some(row.correct_answers),
            total_questions: Some(row.total_questions),
        })
        .collect();

    Ok(Json(analytics_response(&state, records)))
}

/// Class-wide view: every attempt at the teacher's quizzes.
async fn teacher_analytics(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let teacher = require_teacher(&state, &teacher_id).await?;
    let records = repositories::quiz_answers::list_results(state.db(), Some(&teacher.id))
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list quiz results"))?
        .into_iter()
        .map(|row| AttemptRecord {
            subject: row.subject_name,
            title: Some(row.quiz_title),
            score: Some(row.score),
            correct_answers: Some(row.correct_answers),
            total_questions: Some(row.total_questions),
        })
        .collect();

    Ok(Json(analytics_response(&state, records)))
}

async fn study_tips(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TipsPayload>,
) -> Result<Json<TipsResponse>, ApiError> {
    let request = TipsRequest {
        weak_subjects: payload.weak_subjects,
        weakest_topics: payload.weakest_topics,
    };
    let outcome = state.tips().tips(&request).await;
    Ok(Json(TipsResponse { tips: outcome.tips, model: outcome.model }))
}
