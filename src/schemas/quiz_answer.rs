use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::{AnswerEntry, QuizAnswer, QuizQuestion};
use crate::repositories::quiz_answers::{QuizResultRow, StudentAnswerRow};
use crate::schemas::quiz::StudentQuizEntry;

pub(crate) const UNKNOWN_QUIZ: &str = "Unknown Quiz";

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerSubmitRequest {
    #[serde(default, alias = "quizId")]
    pub(crate) quiz_id: Option<String>,
    #[serde(default, alias = "studentId")]
    pub(crate) student_id: Option<String>,
    #[serde(default)]
    pub(crate) answers: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerSubmitResponse {
    pub(crate) message: String,
    pub(crate) score: i32,
    pub(crate) correct_answers: i32,
    pub(crate) total_questions: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewQuiz {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) questions: Vec<QuizQuestion>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewStudent {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerReviewResponse {
    pub(crate) id: String,
    pub(crate) quiz: ReviewQuiz,
    pub(crate) student: ReviewStudent,
    pub(crate) answers: Vec<AnswerEntry>,
    pub(crate) score: i32,
    pub(crate) total_questions: i32,
    pub(crate) correct_answers: i32,
    pub(crate) completed_at: String,
}

impl AnswerReviewResponse {
    pub(crate) fn new(answer: QuizAnswer, quiz: ReviewQuiz, student: ReviewStudent) -> Self {
        Self {
            id: answer.id,
            quiz,
            student,
            answers: answer.answers.0,
            score: answer.score,
            total_questions: answer.total_questions,
            correct_answers: answer.correct_answers,
            completed_at: format_primitive(answer.completed_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerQuizRef {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) subject: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentAnswerResponse {
    pub(crate) id: String,
    pub(crate) quiz: AnswerQuizRef,
    pub(crate) score: i32,
    pub(crate) correct_answers: i32,
    pub(crate) total_questions: i32,
    pub(crate) completed_at: String,
}

impl StudentAnswerResponse {
    pub(crate) fn from_row(row: StudentAnswerRow) -> Self {
        Self {
            id: row.id,
            quiz: AnswerQuizRef { id: row.quiz_id, title: row.quiz_title, subject: row.subject_name },
            score: row.score,
            correct_answers: row.correct_answers,
            total_questions: row.total_questions,
            completed_at: format_primitive(row.completed_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizResultResponse {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) quiz_title: String,
    pub(crate) student: ReviewStudent,
    pub(crate) score: i32,
    pub(crate) correct_answers: i32,
    pub(crate) total_questions: i32,
    pub(crate) completed_at: String,
}

impl QuizResultResponse {
    pub(crate) fn from_row(row: QuizResultRow) -> Self {
        Self {
            id: row.id,
            quiz_id: row.quiz_id,
            quiz_title: row.quiz_title,
            student: ReviewStudent {
                id: row.student_id,
                username: row.student_username,
                email: row.student_email,
            },
            score: row.score,
            correct_answers: row.correct_answers,
            total_questions: row.total_questions,
            completed_at: format_primitive(row.completed_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentDashboardResponse {
    pub(crate) completed: Vec<StudentQuizEntry>,
    pub(crate) upcoming: Vec<StudentQuizEntry>,
    pub(crate) total_completed: usize,
    pub(crate) total_upcoming: usize,
    pub(crate) average_score: i32,
}
