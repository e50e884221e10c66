use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{FeedbackDirection, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) role: UserRole,
    pub(crate) subjects: Vec<String>,
    pub(crate) teaching_subjects: Vec<String>,
    /// Assigned teachers in signup order, loaded from `student_teachers`.
    pub(crate) teacher_ids: Vec<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Subject {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) teacher_id: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct QuizQuestion {
    #[serde(alias = "questionText")]
    pub(crate) question_text: String,
    pub(crate) options: Vec<String>,
    #[serde(alias = "correctAnswer")]
    pub(crate) correct_answer: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Quiz {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) subject_id: Option<String>,
    pub(crate) teacher_id: Option<String>,
    pub(crate) due_date: Option<PrimitiveDateTime>,
    pub(crate) questions: Json<Vec<QuizQuestion>>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// One graded question inside a stored submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AnswerEntry {
    pub(crate) question_index: i32,
    pub(crate) selected_option: Option<i32>,
    pub(crate) is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuizAnswer {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) student_id: String,
    pub(crate) answers: Json<Vec<AnswerEntry>>,
    pub(crate) score: i32,
    pub(crate) total_questions: i32,
    pub(crate) correct_answers: i32,
    pub(crate) completed_at: PrimitiveDateTime,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Feedback {
    pub(crate) id: String,
    pub(crate) direction: FeedbackDirection,
    pub(crate) sender_id: Option<String>,
    pub(crate) sender_name: String,
    pub(crate) recipient_id: String,
    pub(crate) message: String,
    pub(crate) subject: String,
    pub(crate) created_at: PrimitiveDateTime,
}
