use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::time::format_primitive;
use crate::db::models::QuizQuestion;
use crate::repositories::quiz_answers::ResultRow;
use crate::repositories::quizzes::{QuizDetailRow, RecentQuizRow};

pub(crate) const UNKNOWN_SUBJECT: &str = "Unknown Subject";
pub(crate) const UNKNOWN_TEACHER: &str = "Unknown Teacher";

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuizCreate {
    #[serde(default)]
    #[validate(custom(function = "validate_title"))]
    pub(crate) title: String,
    #[serde(default, alias = "subjectId")]
    pub(crate) subject_id: Option<String>,
    /// Subject by name; created on first use.
    #[serde(default)]
    pub(crate) subject: Option<String>,
    #[serde(default, alias = "teacherId")]
    pub(crate) teacher_id: Option<String>,
    #[serde(default, alias = "dueDate", alias = "due_date")]
    pub(crate) date: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_questions"))]
    pub(crate) questions: Vec<QuizQuestion>,
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::new("title").with_message("title is required".into()));
    }
    Ok(())
}

fn validate_questions(questions: &[QuizQuestion]) -> Result<(), ValidationError> {
    for question in questions {
        if question.question_text.trim().is_empty() {
            return Err(ValidationError::new("question_text")
                .with_message("every question needs text".into()));
        }
        if question.options.len() < 2 {
            return Err(ValidationError::new("options")
                .with_message("every question needs at least two options".into()));
        }
        let in_range = usize::try_from(question.correct_answer)
            .is_ok_and(|index| index < question.options.len());
        if !in_range {
            return Err(ValidationError::new("correct_answer")
                .with_message("correct_answer must point at one of the options".into()));
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectRef {
    pub(crate) id: String,
    pub(crate) name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TeacherRef {
    pub(crate) id: String,
    pub(crate) username: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) subject: Option<SubjectRef>,
    pub(crate) teacher: Option<TeacherRef>,
    pub(crate) due_date: Option<String>,
    pub(crate) questions: Vec<QuizQuestion>,
    pub(crate) created_at: String,
}

impl QuizResponse {
    pub(crate) fn from_row(row: QuizDetailRow) -> Self {
        let subject = match (row.subject_id, row.subject_name) {
            (Some(id), Some(name)) => Some(SubjectRef { id, name }),
            _ => None,
        };
        let teacher = match (row.teacher_id, row.teacher_username) {
            (Some(id), Some(username)) => Some(TeacherRef { id, username }),
            _ => None,
        };
        Self {
            id: row.id,
            title: row.title,
            subject,
            teacher,
            due_date: row.due_date.map(format_primitive),
            questions: row.questions.0,
            created_at: format_primitive(row.created_at),
        }
    }
}

/// Row of the student's quiz list: either a finished attempt or an open quiz.
#[derive(Debug, Serialize)]
pub(crate) struct StudentQuizEntry {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) subject: String,
    pub(crate) teacher: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) completed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) due_date: Option<String>,
    pub(crate) completed: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizSubmitRequest {
    #[serde(default, alias = "studentId")]
    pub(crate) student_id: Option<String>,
    #[serde(default)]
    pub(crate) answers: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizSubmitResponse {
    pub(crate) message: String,
    pub(crate) score: i32,
    pub(crate) answers: Vec<Option<i32>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResultResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) student_email: String,
    pub(crate) quiz_id: String,
    pub(crate) quiz_title: String,
    pub(crate) subject: String,
    pub(crate) score: i32,
    pub(crate) correct_answers: i32,
    pub(crate) total_questions: i32,
    pub(crate) completed_at: String,
    pub(crate) teacher_id: Option<String>,
    pub(crate) teacher_name: String,
}

impl ResultResponse {
    pub(crate) fn from_row(row: ResultRow) -> Self {
        let subject = result_subject(&row);
        Self {
            id: row.id,
            student_id: row.student_id,
            student_name: row.student_username,
            student_email: row.student_email,
            quiz_id: row.quiz_id,
            quiz_title: row.quiz_title,
            subject,
            score: row.score,
            correct_answers: row.correct_answers,
            total_questions: row.total_questions,
            completed_at: format_primitive(row.completed_at),
            teacher_id: row.teacher_id,
            teacher_name: row.teacher_username.unwrap_or_else(|| UNKNOWN_TEACHER.to_string()),
        }
    }
}

/// Quiz subject, else the teacher's subjects, else the student's, else a placeholder.
fn result_subject(row: &ResultRow) -> String {
    if let Some(name) = row.subject_name.as_deref().filter(|name| !name.trim().is_empty()) {
        return name.to_string();
    }
    if let Some(taught) = row.teacher_subjects.as_ref().filter(|taught| !taught.is_empty()) {
        return taught.join(", ");
    }
    if !row.student_subjects.is_empty() {
        return row.student_subjects.join(", ");
    }
    UNKNOWN_SUBJECT.to_string()
}

#[derive(Debug, Serialize)]
pub(crate) struct RecentQuizResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) subject: String,
    pub(crate) due_date: Option<String>,
    pub(crate) question_count: i32,
    pub(crate) created_at: String,
    pub(crate) result_count: i64,
    pub(crate) avg_score: i32,
    pub(crate) status: &'static str,
}

impl RecentQuizResponse {
    pub(crate) fn from_row(row: RecentQuizRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            subject: row.subject_name.unwrap_or_else(|| UNKNOWN_SUBJECT.to_string()),
            due_date: row.due_date.map(format_primitive),
            question_count: row.question_count,
            created_at: format_primitive(row.created_at),
            result_count: row.result_count,
            avg_score: row.avg_score.map(|avg| avg.round() as i32).unwrap_or(0),
            status: if row.result_count > 0 { "completed" } else { "pending" },
        }
    }
}
