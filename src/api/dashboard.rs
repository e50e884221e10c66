use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::lookups::require_student;
use crate::api::quizzes::helpers::student_answers;
use crate::core::state::AppState;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::dashboard::{
    StatsResponse, StudentSubjectEntry, StudentSubjectsResponse, StudentsPerSubject,
    SubjectTeacherRef, TeachersPerSubject, UserRef,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/students-per-subject", get(students_per_subject))
        .route("/teachers-per-subject", get(teachers_per_subject))
        .route("/student/:student_id/subjects", get(student_subjects))
}

async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let students = repositories::users::count_by_role(state.db(), UserRole::Student)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count students"))?;
    let teachers = repositories::users::count_by_role(state.db(), UserRole::Teacher)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count teachers"))?;
    let subjects = repositories::subjects::count(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count subjects"))?;

    Ok(Json(StatsResponse { students, teachers, subjects }))
}

/// Buckets users under each label they carry, in first-seen label order.
fn group_users<'a>(
    users: &'a [User],
    labels: impl Fn(&'a User) -> &'a [String],
) -> Vec<(String, Vec<UserRef>)> {
    let mut groups: Vec<(String, Vec<UserRef>)> = Vec::new();
    for user in users {
        for label in labels(user) {
            let member = UserRef { id: user.id.clone(), username: user.username.clone() };
            match groups.iter_mut().find(|(existing, _)| *existing == *label) {
                Some((_, members)) => members.push(member),
                None => groups.push((label.clone(), vec![member])),
            }
        }
    }
    groups
}

async fn users_with_role(state: &AppState, role: UserRole) -> Result<Vec<User>, ApiError> {
    repositories::users::list_by_role(state.db(), role)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list users"))
}

async fn students_per_subject(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentsPerSubject>>, ApiError> {
    let students = users_with_role(&state, UserRole::Student).await?;
    let groups = group_users(&students, |student| student.subjects.as_slice())
        .into_iter()
        .map(|(name, students)| StudentsPerSubject {
            name,
            student_count: students.len(),
            students,
        })
        .collect();
    Ok(Json(groups))
}

async fn teachers_per_subject(
    State(state): State<AppState>,
) -> Result<Json<Vec<TeachersPerSubject>>, ApiError> {
    let teachers = users_with_role(&state, UserRole::Teacher).await?;
    let groups = group_users(&teachers, |teacher| teacher.teaching_subjects.as_slice())
        .into_iter()
        .map(|(subject, teachers)| TeachersPerSubject {
            subject,
            teacher_count: teachers.len(),
            teachers,
        })
        .collect();
    Ok(Json(groups))
}

/// Each enrolled subject paired with the teacher linked at the same position.
async fn student_subjects(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<StudentSubjectsResponse>, ApiError> {
    let student = require_student(&state, &student_id).await?;

    let teachers = repositories::users::find_many_by_ids(state.db(), &student.teacher_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch teachers"))?;
    let answers = student_answers(&state, &student.id).await?;
    let quizzes = repositories::quizzes::list_details(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list quizzes"))?;

    let same_subject = |candidate: Option<&str>, subject: &str| {
        candidate.is_some_and(|name| name.trim().eq_ignore_ascii_case(subject.trim()))
    };

    let subjects = student
        .subjects
        .iter()
        .enumerate()
        .map(|(index, subject)| {
            let teacher = student
                .teacher_ids
                .get(index)
                .and_then(|teacher_id| teachers.iter().find(|teacher| &teacher.id == teacher_id))
                .map(|teacher| SubjectTeacherRef {
                    id: teacher.id.clone(),
                    username: teacher.username.clone(),
                    email: teacher.email.clone(),
                });

            let scores: Vec<i32> = answers
                .iter()
                .filter(|row| same_subject(row.subject_name.as_deref(), subject))
                .map(|row| row.score)
                .collect();
            let average_score = if scores.is_empty() {
                0
            } else {
                let sum: i64 = scores.iter().map(|score| i64::from(*score)).sum();
                (sum as f64 / scores.len() as f64).round() as i32
            };
            let total_quizzes = quizzes
                .iter()
                .filter(|quiz| same_subject(quiz.subject_name.as_deref(), subject))
                .count();

            StudentSubjectEntry {
                subject: subject.clone(),
                teacher,
                completed_quizzes: scores.len(),
                average_score,
                total_quizzes,
            }
        })
        .collect();

    Ok(Json(StudentSubjectsResponse {
        student: UserRef { id: student.id.clone(), username: student.username.clone() },
        subjects,
    }))
}

#[cfg(test)]
mod tests;
