use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::db::models::{Quiz, User};
use crate::repositories;
use crate::repositories::quiz_answers::StudentAnswerRow;
use crate::repositories::quizzes::QuizDetailRow;
use crate::schemas::quiz::{StudentQuizEntry, UNKNOWN_SUBJECT, UNKNOWN_TEACHER};
use crate::services::assignment::{is_upcoming, QuizCandidate, StudentAssignment};
use crate::services::scoring::{parse_selections, score_submission, ScoredSubmission};

pub(crate) async fn require_quiz(state: &AppState, quiz_id: &str) -> Result<Quiz, ApiError> {
    repositories::quizzes::find_by_id(state.db(), quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?
        .ok_or_else(|| ApiError::not_found("Quiz not found"))
}

/// Scores `raw_answers` against the stored key and records the attempt,
/// replacing any earlier attempt by the same student.
pub(crate) async fn record_attempt(
    state: &AppState,
    quiz: &Quiz,
    student: &User,
    raw_answers: &serde_json::Value,
    route: &'static str,
) -> Result<ScoredSubmission, ApiError> {
    let scored = score_submission(&quiz.questions.0, &parse_selections(raw_answers));

    repositories::quiz_answers::upsert(
        state.db(),
        repositories::quiz_answers::UpsertQuizAnswer {
            id: &Uuid::new_v4().to_string(),
            quiz_id: &quiz.id,
            student_id: &student.id,
            answers: scored.answers.clone(),
            score: scored.score,
            total_questions: scored.total_questions,
            correct_answers: scored.correct_answers,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to save quiz answers"))?;

    metrics::record_quiz_submission(route, scored.score);
    tracing::info!(
        quiz_id = %quiz.id,
        student_id = %student.id,
        score = scored.score,
        correct = scored.correct_answers,
        total = scored.total_questions,
        "Quiz attempt recorded"
    );

    Ok(scored)
}

pub(crate) async fn student_answers(
    state: &AppState,
    student_id: &str,
) -> Result<Vec<StudentAnswerRow>, ApiError> {
    repositories::quiz_answers::list_for_student(state.db(), student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list quiz answers"))
}

/// Open quizzes assigned to the student, soonest due first.
pub(crate) async fn upcoming_quizzes(
    state: &AppState,
    student: &User,
) -> Result<Vec<QuizDetailRow>, ApiError> {
    let completed = repositories::quiz_answers::completed_quiz_ids(state.db(), &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list completed quizzes"))?;
    let quizzes = repositories::quizzes::list_details(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list quizzes"))?;

    let assignment = StudentAssignment::new(student, &completed);
    let now = primitive_now_utc();

    Ok(quizzes
        .into_iter()
        .filter(|quiz| {
            is_upcoming(
                &assignment,
                QuizCandidate {
                    quiz_id: &quiz.id,
                    subject_id: quiz.subject_id.as_deref(),
                    subject_name: quiz.subject_name.as_deref(),
                    teacher_id: quiz.teacher_id.as_deref(),
                    due_date: quiz.due_date,
                },
                now,
            )
        })
        .collect())
}

pub(crate) fn completed_entry(row: &StudentAnswerRow) -> StudentQuizEntry {
    StudentQuizEntry {
        id: row.quiz_id.clone(),
        title: row.quiz_title.clone(),
        subject: row.subject_name.clone().unwrap_or_else(|| UNKNOWN_SUBJECT.to_string()),
        teacher: row.teacher_username.clone().unwrap_or_else(|| UNKNOWN_TEACHER.to_string()),
        score: Some(row.score),
        completed_at: Some(format_primitive(row.completed_at)),
        due_date: None,
        completed: true,
    }
}

pub(crate) fn upcoming_entry(quiz: &QuizDetailRow) -> StudentQuizEntry {
    StudentQuizEntry {
        id: quiz.id.clone(),
        title: quiz.title.clone(),
        subject: quiz.subject_name.clone().unwrap_or_else(|| UNKNOWN_SUBJECT.to_string()),
        teacher: quiz.teacher_username.clone().unwrap_or_else(|| UNKNOWN_TEACHER.to_string()),
        score: None,
        completed_at: None,
        due_date: quiz.due_date.map(format_primitive),
        completed: false,
    }
}
