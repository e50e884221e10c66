use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;

pub(crate) async fn fetch_user_with_role(
    state: &AppState,
    id: &str,
    role: UserRole,
) -> Result<Option<User>, ApiError> {
    repositories::users::find_by_id_and_role(state.db(), id, role)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))
}

pub(crate) async fn require_student(state: &AppState, id: &str) -> Result<User, ApiError> {
    fetch_user_with_role(state, id, UserRole::Student)
        .await?
        .ok_or_else(|| ApiError::not_found("Student not found"))
}

pub(crate) async fn require_teacher(state: &AppState, id: &str) -> Result<User, ApiError> {
    fetch_user_with_role(state, id, UserRole::Teacher)
        .await?
        .ok_or_else(|| ApiError::not_found("Teacher not found"))
}
