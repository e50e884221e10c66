use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::{Subject, User};
use crate::repositories::subjects::SubjectWithTeacherRow;

#[derive(Debug, Deserialize)]
pub(crate) struct SubjectCreate {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default, alias = "teacherId", alias = "teacher_id")]
    pub(crate) teacher: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) teacher_id: Option<String>,
    pub(crate) created_at: String,
}

impl SubjectResponse {
    pub(crate) fn from_db(subject: Subject) -> Self {
        Self {
            id: subject.id,
            name: subject.name,
            teacher_id: subject.teacher_id,
            created_at: format_primitive(subject.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectTeacher {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectListItem {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) teacher: Option<SubjectTeacher>,
    pub(crate) created_at: String,
}

impl SubjectListItem {
    pub(crate) fn from_row(row: SubjectWithTeacherRow) -> Self {
        let teacher = match (row.teacher_id, row.teacher_username, row.teacher_email) {
            (Some(id), Some(username), Some(email)) => Some(SubjectTeacher { id, username, email }),
            _ => None,
        };
        Self { id: row.id, name: row.name, teacher, created_at: format_primitive(row.created_at) }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectTeacherResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) teacher_subjects: Vec<String>,
}

impl SubjectTeacherResponse {
    pub(crate) fn from_db(teacher: User) -> Self {
        Self {
            id: teacher.id,
            username: teacher.username,
            email: teacher.email,
            teacher_subjects: teacher.teaching_subjects,
        }
    }
}
