use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::ApiJson;
use crate::api::guards::CurrentUser;
use crate::api::lookups::{require_student, require_teacher};
use crate::api::validation::{require_role, require_text, validate_password_len, validate_payload};
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::auth::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, SignupRequest, UserDataRequest,
    VerifyEmailRequest,
};
use crate::schemas::user::{
    StudentProfileResponse, StudentSummaryResponse, StudentUpdate, StudentUpdateResponse,
    TeacherDetail, TeacherProfileResponse, UserDataEnvelope, UserDataResponse, UserResponse,
};
use crate::schemas::MessageResponse;
use crate::services::login_claims::{check_login_claims, LoginClaims};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/getUserData", post(get_user_data))
        .route("/verify-email", post(verify_email))
        .route("/forgot-password", post(forgot_password))
        .route("/teacher/:id", get(get_teacher))
        .route("/student/:id", get(get_student).put(update_student))
        .route("/students", get(list_students))
        .route("/students/teacher/:teacher_id", get(list_students_for_teacher))
}

async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    validate_payload(&payload)?;
    validate_password_len(&payload.password)?;
    let role = require_role(payload.role.as_deref())?;

    let (subjects, teacher_ids, teaching_subjects) = match role {
        UserRole::Student => (payload.subject, dedupe(payload.teacher_id), Vec::new()),
        UserRole::Teacher => (Vec::new(), Vec::new(), payload.teacher_subject),
        UserRole::Parent => (Vec::new(), Vec::new(), Vec::new()),
    };

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to begin signup"))?;

    let existing = repositories::users::exists_by_email(&mut *tx, &payload.email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
    if existing.is_some() {
        return Err(ApiError::bad_request("User already exists"));
    }

    if !teacher_ids.is_empty() {
        let known = repositories::users::count_teachers_among(&mut *tx, &teacher_ids)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to verify teachers"))?;
        if known != teacher_ids.len() as i64 {
            return Err(ApiError::bad_request("One or more teachers do not exist"));
        }
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    let now = primitive_now_utc();
    let user_id = Uuid::new_v4().to_string();

    repositories::users::create(
        &mut *tx,
        repositories::users::CreateUser {
            id: &user_id,
            username: &payload.username,
            email: &payload.email,
            hashed_password,
            role,
            subjects,
            teaching_subjects,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::bad_request("User already exists")
        } else {
            ApiError::internal(e, "Failed to create user")
        }
    })?;

    repositories::users::replace_teachers(&mut tx, &user_id, &teacher_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to link teachers"))?;

    let user = repositories::users::fetch_one_by_id(&mut *tx, &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load created user"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit signup"))?;

    tracing::info!(user_id = %user.id, role = role.as_str(), "User registered");

    let response = issue_token(&state, user, "User registered successfully")?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    validate_payload(&payload)?;
    let role = require_role(payload.role.as_deref())?;

    let user = repositories::users::find_by_email(state.db(), &payload.email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or_else(|| ApiError::bad_request("Invalid credentials"))?;

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|_| ApiError::bad_request("Invalid credentials"))?;
    if !verified {
        return Err(ApiError::bad_request("Invalid credentials"));
    }

    if user.role != role {
        return Err(ApiError::bad_request("Role mismatch"));
    }

    let claims = LoginClaims {
        subjects: &payload.subject,
        teacher_ids: &payload.teacher_id,
        teaching_subjects: &payload.teacher_subject,
    };
    check_login_claims(&user, claims).map_err(ApiError::BadRequest)?;

    Ok(Json(issue_token(&state, user, "Login successful")?))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(user))
}

async fn get_user_data(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UserDataRequest>,
) -> Result<Json<UserDataEnvelope>, ApiError> {
    let (username, role) = match (payload.username.as_deref(), payload.role.as_deref()) {
        (Some(username), Some(_)) if !username.trim().is_empty() => {
            (username, require_role(payload.role.as_deref())?)
        }
        _ => return Err(ApiError::bad_request("Username and role are required")),
    };

    let email = match role {
        UserRole::Student => Some(
            require_text(payload.email.as_deref(), "email")
                .map_err(|_| ApiError::bad_request("Email is required for student accounts"))?,
        ),
        _ => None,
    };

    let user = repositories::users::find_by_username(state.db(), username, role, email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or_else(|| ApiError::not_found("User not found with provided credentials"))?;

    let mut response = UserDataResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
        subjects: None,
        teacher_ids: None,
        teacher_details: None,
        teacher_subjects: None,
    };

    match role {
        UserRole::Student => {
            let teachers = repositories::users::find_many_by_ids(state.db(), &user.teacher_ids)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load teachers"))?;
            response.teacher_details = Some(
                teachers
                    .into_iter()
                    .filter(|teacher| teacher.role == UserRole::Teacher)
                    .map(|teacher| TeacherDetail {
                        id: teacher.id,
                        username: teacher.username,
                        email: teacher.email,
                        teacher_subjects: teacher.teaching_subjects,
                    })
                    .collect(),
            );
            response.subjects = Some(user.subjects);
            response.teacher_ids = Some(user.teacher_ids);
        }
        UserRole::Teacher => response.teacher_subjects = Some(user.teaching_subjects),
        UserRole::Parent => {}
    }

    Ok(Json(UserDataEnvelope { success: true, user: response }))
}

async fn verify_email(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = require_text(payload.email.as_deref(), "email")?;
    find_by_email_or_404(&state, email).await?;
    Ok(Json(MessageResponse::new("Email verified")))
}

async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (Some(email), Some(new_password)) = (
        payload.email.as_deref().map(str::trim).filter(|value| !value.is_empty()),
        payload.new_password.as_deref().filter(|value| !value.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Email and new password required"));
    };
    validate_password_len(new_password)?;

    let user = find_by_email_or_404(&state, email).await?;
    let hashed_password = security::hash_password(new_password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    repositories::users::update_password(
        state.db(),
        &user.id,
        &hashed_password,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update password"))?;

    tracing::info!(user_id = %user.id, "Password reset");
    Ok(Json(MessageResponse::new("Password reset successfully")))
}

async fn get_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TeacherProfileResponse>, ApiError> {
    let teacher = require_teacher(&state, &id).await?;
    Ok(Json(TeacherProfileResponse::from_db(teacher)))
}

async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudentProfileResponse>, ApiError> {
    let student = require_student(&state, &id).await?;
    Ok(Json(StudentProfileResponse::from_db(student)))
}

async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<StudentUpdate>,
) -> Result<Json<StudentUpdateResponse>, ApiError> {
    let student = require_student(&state, &id).await?;

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to begin update"))?;

    if let Some(teacher_ids) = payload.teacher_id {
        let teacher_ids = dedupe(teacher_ids);
        let known = repositories::users::count_teachers_among(&mut *tx, &teacher_ids)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to verify teachers"))?;
        if known != teacher_ids.len() as i64 {
            return Err(ApiError::bad_request("One or more teachers do not exist"));
        }
        repositories::users::replace_teachers(&mut tx, &student.id, &teacher_ids)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update teachers"))?;
    }

    repositories::users::update_subjects(&mut *tx, &student.id, payload.subject, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update subjects"))?;

    let updated = repositories::users::fetch_one_by_id(&mut *tx, &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load student"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit update"))?;

    Ok(Json(StudentUpdateResponse {
        msg: "Subjects updated successfully".to_string(),
        student: StudentProfileResponse::from_db(updated),
    }))
}

async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentSummaryResponse>>, ApiError> {
    student_summaries(&state, None).await.map(Json)
}

async fn list_students_for_teacher(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> Result<Json<Vec<StudentSummaryResponse>>, ApiError> {
    student_summaries(&state, Some(&teacher_id)).await.map(Json)
}

async fn student_summaries(
    state: &AppState,
    teacher_id: Option<&str>,
) -> Result<Vec<StudentSummaryResponse>, ApiError> {
    let rows = repositories::users::list_student_summaries(state.db(), teacher_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list students"))?;
    Ok(rows.into_iter().map(StudentSummaryResponse::from_row).collect())
}

async fn find_by_email_or_404(state: &AppState, email: &str) -> Result<User, ApiError> {
    repositories::users::find_by_email(state.db(), email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

fn issue_token(state: &AppState, user: User, msg: &str) -> Result<AuthResponse, ApiError> {
    let token = security::create_access_token(&user.id, user.role, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok(AuthResponse {
        msg: msg.to_string(),
        access_token: token,
        token_type: "bearer".to_string(),
        user: UserResponse::from_db(user),
    })
}

fn dedupe(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values.into_iter().filter(|value| seen.insert(value.clone())).collect()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error().is_some_and(|db| db.is_unique_violation())
}
