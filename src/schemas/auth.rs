use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schemas::one_or_many;
use crate::schemas::user::UserResponse;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SignupRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "username is required"))]
    pub(crate) username: String,
    #[serde(default)]
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) password: String,
    #[serde(default)]
    pub(crate) role: Option<String>,
    #[serde(default, alias = "subjects", deserialize_with = "one_or_many")]
    pub(crate) subject: Vec<String>,
    #[serde(default, alias = "teacherId", alias = "teacherIds", deserialize_with = "one_or_many")]
    pub(crate) teacher_id: Vec<String>,
    #[serde(
        default,
        alias = "teacherSubject",
        alias = "teacherSubjects",
        deserialize_with = "one_or_many"
    )]
    pub(crate) teacher_subject: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    pub(crate) email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub(crate) password: String,
    #[serde(default)]
    pub(crate) role: Option<String>,
    #[serde(default, alias = "subjects", deserialize_with = "one_or_many")]
    pub(crate) subject: Vec<String>,
    #[serde(default, alias = "teacherId", alias = "teacherIds", deserialize_with = "one_or_many")]
    pub(crate) teacher_id: Vec<String>,
    #[serde(
        default,
        alias = "teacherSubject",
        alias = "teacherSubjects",
        deserialize_with = "one_or_many"
    )]
    pub(crate) teacher_subject: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AuthResponse {
    pub(crate) msg: String,
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserDataRequest {
    #[serde(default)]
    pub(crate) username: Option<String>,
    #[serde(default)]
    pub(crate) role: Option<String>,
    #[serde(default)]
    pub(crate) email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyEmailRequest {
    #[serde(default)]
    pub(crate) email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForgotPasswordRequest {
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(default, alias = "newPassword")]
    pub(crate) new_password: Option<String>,
}
