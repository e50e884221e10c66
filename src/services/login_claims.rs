//! Login-time consistency check between what the login form claims and what
//! the account was registered with.
//!
//! This is input validation only. Identity is established by the password and
//! the bearer token; passing this check grants nothing.

use crate::db::models::User;
use crate::db::types::UserRole;

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoginClaims<'a> {
    pub(crate) subjects: &'a [String],
    pub(crate) teacher_ids: &'a [String],
    pub(crate) teaching_subjects: &'a [String],
}

pub(crate) fn check_login_claims(user: &User, claims: LoginClaims<'_>) -> Result<(), String> {
    match user.role {
        UserRole::Student => check_student(user, claims),
        UserRole::Teacher => check_teacher(user, claims),
        UserRole::Parent => Ok(()),
    }
}

fn check_student(user: &User, claims: LoginClaims<'_>) -> Result<(), String> {
    let claimed_subjects = non_blank(claims.subjects);
    let claimed_teachers = non_blank(claims.teacher_ids);

    if claimed_subjects.is_empty() && claimed_teachers.is_empty() {
        return Ok(());
    }

    let subject_match = intersects_ignore_case(&claimed_subjects, &user.subjects);
    let teacher_match = claimed_teachers
        .iter()
        .any(|claimed| user.teacher_ids.iter().any(|id| id.as_str() == *claimed));

    if subject_match || teacher_match {
        Ok(())
    } else {
        Err("Selected subjects or teachers don't match your registration".to_string())
    }
}

fn check_teacher(user: &User, claims: LoginClaims<'_>) -> Result<(), String> {
    let claimed = non_blank(claims.teaching_subjects);
    if claimed.is_empty() || user.teaching_subjects.is_empty() {
        return Ok(());
    }

    if intersects_ignore_case(&claimed, &user.teaching_subjects) {
        Ok(())
    } else {
        Err("Selected teaching subjects don't match your registration".to_string())
    }
}

fn non_blank(values: &[String]) -> Vec<&str> {
    values.iter().map(|value| value.trim()).filter(|value| !value.is_empty()).collect()
}

fn intersects_ignore_case(claimed: &[&str], stored: &[String]) -> bool {
    claimed
        .iter()
        .any(|claim| stored.iter().any(|value| value.trim().eq_ignore_ascii_case(claim)))
}
