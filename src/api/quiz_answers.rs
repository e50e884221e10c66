use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::extract::ApiJson;
use crate::api::lookups::require_student;
use crate::api::quizzes::helpers::{
    completed_entry, record_attempt, require_quiz, student_answers, upcoming_entry,
    upcoming_quizzes,
};
use crate::api::validation::require_text;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::quiz_answer::{
    AnswerReviewResponse, AnswerSubmitRequest, AnswerSubmitResponse, QuizResultResponse,
    ReviewQuiz, ReviewStudent, StudentAnswerResponse, StudentDashboardResponse, UNKNOWN_QUIZ,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/submit", post(submit_answers))
        .route("/student/:student_id", get(answers_for_student))
        .route("/student/:student_id/dashboard", get(student_dashboard))
        .route("/quiz/:quiz_id/results", get(results_for_quiz))
        .route("/:quiz_id/:student_id", get(review_answers))
}

async fn submit_answers(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AnswerSubmitRequest>,
) -> Result<Json<AnswerSubmitResponse>, ApiError> {
    let quiz_id = require_text(payload.quiz_id.as_deref(), "quiz_id")?;
    let student_id = require_text(payload.student_id.as_deref(), "student_id")?;

    let quiz = require_quiz(&state, quiz_id).await?;
    let student = require_student(&state, student_id).await?;

    let scored =
        record_attempt(&state, &quiz, &student, &payload.answers, "quiz_answer_submit").await?;

    Ok(Json(AnswerSubmitResponse {
        message: "Quiz answers submitted successfully".to_string(),
        score: scored.score,
        correct_answers: scored.correct_answers,
        total_questions: scored.total_questions,
    }))
}

async fn review_answers(
    State(state): State<AppState>,
    Path((quiz_id, student_id)): Path<(String, String)>,
) -> Result<Json<AnswerReviewResponse>, ApiError> {
    let answer = repositories::quiz_answers::find_for_quiz_student(state.db(), &quiz_id, &student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz answers"))?
        .ok_or_else(|| ApiError::not_found("Quiz answers not found"))?;

    let quiz = repositories::quizzes::find_by_id(state.db(), &answer.quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?;
    let quiz = match quiz {
        Some(quiz) => ReviewQuiz { id: quiz.id, title: quiz.title, questions: quiz.questions.0 },
        None => ReviewQuiz {
            id: answer.quiz_id.clone(),
            title: UNKNOWN_QUIZ.to_string(),
            questions: Vec::new(),
        },
    };

    let student = repositories::users::find_by_id(state.db(), &answer.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student"))?
        .ok_or_else(|| ApiError::not_found("Student not found"))?;
    let student = ReviewStudent { id: student.id, username: student.username, email: student.email };

    Ok(Json(AnswerReviewResponse::new(answer, quiz, student)))
}

async fn answers_for_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<StudentAnswerResponse>>, ApiError> {
    let rows = student_answers(&state, &student_id).await?;
    Ok(Json(rows.into_iter().map(StudentAnswerResponse::from_row).collect()))
}

async fn results_for_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<Vec<QuizResultResponse>>, ApiError> {
    let rows = repositories::quiz_answers::list_for_quiz(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list quiz results"))?;
    Ok(Json(rows.into_iter().map(QuizResultResponse::from_row).collect()))
}

async fn student_dashboard(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<StudentDashboardResponse>, ApiError> {
    let student = require_student(&state, &student_id).await?;
    let answers = student_answers(&state, &student.id).await?;
    let upcoming = upcoming_quizzes(&state, &student).await?;

    let average_score = if answers.is_empty() {
        0
    } else {
        let sum: i64 = answers.iter().map(|row| i64::from(row.score)).sum();
        (sum as f64 / answers.len() as f64).round() as i32
    };

    let completed: Vec<_> = answers.iter().map(completed_entry).collect();
    let upcoming: Vec<_> = upcoming.iter().map(upcoming_entry).collect();

    Ok(Json(StudentDashboardResponse {
        total_completed: completed.len(),
        total_upcoming: upcoming.len(),
        completed,
        upcoming,
        average_score,
    }))
}

#[cfg(test)]
mod tests;
