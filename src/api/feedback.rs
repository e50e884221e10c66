use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::Duration;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::ApiJson;
use crate::api::lookups::{fetch_user_with_role, require_student, require_teacher};
use crate::api::validation::require_text;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Feedback;
use crate::db::types::{FeedbackDirection, UserRole};
use crate::repositories;
use crate::schemas::feedback::{
    FeedbackResponse, FeedbackSentResponse, SampleFeedbackRequest, SampleFeedbackResponse,
    StudentFeedbackRequest, TeacherFeedbackRequest, DEFAULT_SUBJECT, SYSTEM_TEACHER,
};

const EMPTY_MESSAGE: &str = "Feedback message cannot be empty";

/// Canned entries for demo accounts: (sender, subject, message, days ago).
const SAMPLE_FEEDBACK: [(&str, &str, &str, i64); 3] = [
    (
        "Prof. ADBMS",
        "ADBMS",
        "Great progress in database concepts! Your understanding of normalization is \
         excellent. Keep practicing complex queries.",
        2,
    ),
    (
        "Prof. STQA",
        "STQA",
        "Your test case design skills are improving. Focus more on edge cases and boundary \
         value analysis.",
        1,
    ),
    (
        "Prof. DevOps",
        "DevOps",
        "Excellent work on CI/CD pipeline setup! Your Docker containerization approach is \
         very clean.",
        0,
    ),
];

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/send", post(send_to_student))
        .route("/student/:student_id", get(student_feedback))
        .route("/student-to-teacher", post(send_to_teacher))
        .route("/teacher/:teacher_id", get(teacher_feedback))
        .route("/create-sample", post(create_sample))
}

fn subject_or_default(subject: Option<&str>) -> &str {
    subject.map(str::trim).filter(|subject| !subject.is_empty()).unwrap_or(DEFAULT_SUBJECT)
}

async fn send_to_student(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TeacherFeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackSentResponse>), ApiError> {
    let message = require_text(payload.message.as_deref(), "message")
        .map_err(|_| ApiError::bad_request(EMPTY_MESSAGE))?;
    let student_id = payload.student_id.as_deref().map(str::trim).unwrap_or_default();
    let student = require_student(&state, student_id).await?;

    // Unknown or non-teacher senders are attributed to the system.
    let teacher = match payload.teacher_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(teacher_id) => fetch_user_with_role(&state, teacher_id, UserRole::Teacher).await?,
        None => None,
    };
    let (sender_id, sender_name) = match &teacher {
        Some(teacher) => (Some(teacher.id.as_str()), teacher.username.as_str()),
        None => (None, SYSTEM_TEACHER),
    };

    let feedback = repositories::feedback::create(
        state.db(),
        repositories::feedback::CreateFeedback {
            id: &Uuid::new_v4().to_string(),
            direction: FeedbackDirection::TeacherToStudent,
            sender_id,
            sender_name,
            recipient_id: &student.id,
            message,
            subject: subject_or_default(payload.subject.as_deref()),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to save feedback"))?;

    tracing::info!(
        feedback_id = %feedback.id,
        student_id = %student.id,
        sender = %feedback.sender_name,
        "Feedback sent to student"
    );

    Ok((
        StatusCode::CREATED,
        Json(FeedbackSentResponse {
            message: "Feedback sent successfully".to_string(),
            feedback: FeedbackResponse::from_db(feedback),
        }),
    ))
}

async fn student_feedback(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<FeedbackResponse>>, ApiError> {
    let student = require_student(&state, &student_id).await?;
    received(&state, &student.id, FeedbackDirection::TeacherToStudent).await.map(Json)
}

async fn send_to_teacher(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<StudentFeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackSentResponse>), ApiError> {
    let message = require_text(payload.message.as_deref(), "message")
        .map_err(|_| ApiError::bad_request(EMPTY_MESSAGE))?;
    let teacher_id = payload.teacher_id.as_deref().map(str::trim).unwrap_or_default();
    let teacher = require_teacher(&state, teacher_id).await?;
    let student_id = payload.student_id.as_deref().map(str::trim).unwrap_or_default();
    let student = require_student(&state, student_id).await?;

    let sender_name = payload
        .student_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(student.username.as_str());

    let feedback = repositories::feedback::create(
        state.db(),
        repositories::feedback::CreateFeedback {
            id: &Uuid::new_v4().to_string(),
            direction: FeedbackDirection::StudentToTeacher,
            sender_id: Some(&student.id),
            sender_name,
            recipient_id: &teacher.id,
            message,
            subject: subject_or_default(payload.subject.as_deref()),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to save feedback"))?;

    tracing::info!(
        feedback_id = %feedback.id,
        student_id = %student.id,
        teacher_id = %teacher.id,
        "Feedback sent to teacher"
    );

    Ok((
        StatusCode::CREATED,
        Json(FeedbackSentResponse {
            message: "Feedback sent to teacher successfully".to_string(),
            feedback: FeedbackResponse::from_db(feedback),
        }),
    ))
}

async fn teacher_feedback(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> Result<Json<Vec<FeedbackResponse>>, ApiError> {
    let teacher = require_teacher(&state, &teacher_id).await?;
    received(&state, &teacher.id, FeedbackDirection::StudentToTeacher).await.map(Json)
}

async fn received(
    state: &AppState,
    recipient_id: &str,
    direction: FeedbackDirection,
) -> Result<Vec<FeedbackResponse>, ApiError> {
    let rows = repositories::feedback::list_for_recipient(state.db(), recipient_id, direction)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list feedback"))?;
    Ok(rows.into_iter().map(FeedbackResponse::from_db).collect())
}

async fn create_sample(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SampleFeedbackRequest>,
) -> Result<(StatusCode, Json<SampleFeedbackResponse>), ApiError> {
    let student_id = payload.student_id.as_deref().map(str::trim).unwrap_or_default();
    let student = require_student(&state, student_id).await?;

    let now = primitive_now_utc();
    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to begin feedback"))?;

    let mut created: Vec<Feedback> = Vec::with_capacity(SAMPLE_FEEDBACK.len());
    for (sender_name, subject, message, days_ago) in SAMPLE_FEEDBACK {
        let feedback = repositories::feedback::create(
            &mut *tx,
            repositories::feedback::CreateFeedback {
                id: &Uuid::new_v4().to_string(),
                direction: FeedbackDirection::TeacherToStudent,
                sender_id: None,
                sender_name,
                recipient_id: &student.id,
                message,
                subject,
                created_at: now - Duration::days(days_ago),
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to save sample feedback"))?;
        created.push(feedback);
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit feedback"))?;

    Ok((
        StatusCode::CREATED,
        Json(SampleFeedbackResponse {
            message: "Sample feedback created successfully".to_string(),
            feedbacks: created.into_iter().map(FeedbackResponse::from_db).collect(),
        }),
    ))
}
