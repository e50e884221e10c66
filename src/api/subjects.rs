use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::ApiJson;
use crate::api::validation::require_text;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::subject::{
    SubjectCreate, SubjectListItem, SubjectResponse, SubjectTeacherResponse,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_subjects))
        .route("/create", post(create_subject))
        .route("/teachers/:subject_name", get(teachers_for_subject))
}

/// Idempotent by name: an existing subject is returned with 200 instead of 201.
async fn create_subject(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SubjectCreate>,
) -> Result<(StatusCode, Json<SubjectResponse>), ApiError> {
    let (Ok(name), Ok(teacher_id)) = (
        require_text(payload.name.as_deref(), "name"),
        require_text(payload.teacher.as_deref(), "teacher"),
    ) else {
        return Err(ApiError::bad_request("Name and teacher are required"));
    };

    if let Some(existing) = repositories::subjects::find_by_name(state.db(), name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to look up subject"))?
    {
        return Ok((StatusCode::OK, Json(SubjectResponse::from_db(existing))));
    }

    let teacher = crate::api::lookups::require_teacher(&state, teacher_id).await?;

    let created = repositories::subjects::create_if_absent(
        state.db(),
        repositories::subjects::CreateSubject {
            id: &Uuid::new_v4().to_string(),
            name,
            teacher_id: Some(&teacher.id),
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create subject"))?;

    match created {
        Some(subject) => {
            tracing::info!(subject_id = %subject.id, teacher_id = %teacher.id, "Subject created");
            Ok((StatusCode::CREATED, Json(SubjectResponse::from_db(subject))))
        }
        None => {
            // Lost a race with a concurrent create of the same name.
            let existing = repositories::subjects::find_by_name(state.db(), name)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to look up subject"))?
                .ok_or_else(|| ApiError::Internal("Subject vanished after conflict".to_string()))?;
            Ok((StatusCode::OK, Json(SubjectResponse::from_db(existing))))
        }
    }
}

async fn list_subjects(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubjectListItem>>, ApiError> {
    let rows = repositories::subjects::list_with_teachers(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list subjects"))?;
    Ok(Json(rows.into_iter().map(SubjectListItem::from_row).collect()))
}

async fn teachers_for_subject(
    State(state): State<AppState>,
    Path(subject_name): Path<String>,
) -> Result<Json<Vec<SubjectTeacherResponse>>, ApiError> {
    let teachers = repositories::users::list_teachers_for_subject(state.db(), &subject_name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list teachers"))?;
    Ok(Json(teachers.into_iter().map(SubjectTeacherResponse::from_db).collect()))
}

#[cfg(test)]
mod tests;
