use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories::users::StudentSummaryRow;
use crate::schemas::optional_one_or_many;

/// Placeholder subject list for students that never picked one.
const NOT_ASSIGNED: &str = "Not Assigned";

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) role: UserRole,
    pub(crate) subjects: Vec<String>,
    pub(crate) teacher_ids: Vec<String>,
    pub(crate) teacher_subjects: Vec<String>,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            subjects: user.subjects,
            teacher_ids: user.teacher_ids,
            teacher_subjects: user.teaching_subjects,
            created_at: format_primitive(user.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TeacherProfileResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) teacher_subjects: Vec<String>,
}

impl TeacherProfileResponse {
    pub(crate) fn from_db(teacher: User) -> Self {
        Self {
            id: teacher.id,
            username: teacher.username,
            email: teacher.email,
            teacher_subjects: teacher.teaching_subjects,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentProfileResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) subjects: Vec<String>,
    pub(crate) teacher_ids: Vec<String>,
}

impl StudentProfileResponse {
    pub(crate) fn from_db(student: User) -> Self {
        Self {
            id: student.id,
            username: student.username,
            email: student.email,
            subjects: student.subjects,
            teacher_ids: student.teacher_ids,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentUpdate {
    #[serde(default, alias = "subjects", deserialize_with = "optional_one_or_many")]
    pub(crate) subject: Option<Vec<String>>,
    #[serde(
        default,
        alias = "teacherId",
        alias = "teacher_ids",
        alias = "teacherIds",
        deserialize_with = "optional_one_or_many"
    )]
    pub(crate) teacher_id: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentUpdateResponse {
    pub(crate) msg: String,
    pub(crate) student: StudentProfileResponse,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentSummaryResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) subjects: Vec<String>,
    pub(crate) teacher_ids: Vec<String>,
    pub(crate) created_at: String,
    pub(crate) completed_quizzes: i64,
    pub(crate) average_score: i32,
}

impl StudentSummaryResponse {
    pub(crate) fn from_row(row: StudentSummaryRow) -> Self {
        let subjects =
            if row.subjects.is_empty() { vec![NOT_ASSIGNED.to_string()] } else { row.subjects };
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            subjects,
            teacher_ids: row.teacher_ids,
            created_at: format_primitive(row.created_at),
            completed_quizzes: row.completed_quizzes,
            average_score: row.average_score.map(|avg| avg.round() as i32).unwrap_or(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TeacherDetail {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) teacher_subjects: Vec<String>,
}

/// Profile used to pre-fill the login form. Role-specific fields are omitted
/// for the other roles.
#[derive(Debug, Serialize)]
pub(crate) struct UserDataResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) subjects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) teacher_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) teacher_details: Option<Vec<TeacherDetail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) teacher_subjects: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserDataEnvelope {
    pub(crate) success: bool,
    pub(crate) user: UserDataResponse,
}
