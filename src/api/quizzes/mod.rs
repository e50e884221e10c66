mod handlers;
pub(crate) mod helpers;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(handlers::create_quiz))
        .route("/results/all", get(handlers::all_results))
        .route("/results/teacher/:teacher_id", get(handlers::teacher_results))
        .route("/teacher/:teacher_id/recent", get(handlers::recent_for_teacher))
        .route("/student/:student_id", get(handlers::upcoming_for_student))
        .route("/student/:student_id/results", get(handlers::student_results))
        .route("/student/:student_id/analytics", get(handlers::student_score_trend))
        .route("/:quiz_id", get(handlers::get_quiz))
        .route("/:quiz_id/submit", post(handlers::submit_quiz))
}
