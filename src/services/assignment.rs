use std::collections::HashSet;

use time::PrimitiveDateTime;

use crate::db::models::User;

/// What a student is enrolled in, plus the quizzes they already answered.
pub(crate) struct StudentAssignment<'a> {
    subjects: &'a [String],
    teacher_ids: &'a [String],
    completed: HashSet<&'a str>,
}

impl<'a> StudentAssignment<'a> {
    pub(crate) fn new(student: &'a User, completed_quiz_ids: &'a [String]) -> Self {
        Self {
            subjects: &student.subjects,
            teacher_ids: &student.teacher_ids,
            completed: completed_quiz_ids.iter().map(String::as_str).collect(),
        }
    }

    fn has_subject(&self, subject_id: Option<&str>, subject_name: Option<&str>) -> bool {
        self.subjects.iter().any(|enrolled| {
            let enrolled = enrolled.trim();
            subject_name.is_some_and(|name| enrolled.eq_ignore_ascii_case(name.trim()))
                || subject_id.is_some_and(|id| enrolled == id)
        })
    }

    fn has_teacher(&self, teacher_id: Option<&str>) -> bool {
        teacher_id.is_some_and(|teacher| self.teacher_ids.iter().any(|id| id == teacher))
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct QuizCandidate<'a> {
    pub(crate) quiz_id: &'a str,
    pub(crate) subject_id: Option<&'a str>,
    pub(crate) subject_name: Option<&'a str>,
    pub(crate) teacher_id: Option<&'a str>,
    pub(crate) due_date: Option<PrimitiveDateTime>,
}

/// A quiz is upcoming when it is unanswered, not past due, and assigned to the
/// student through either an enrolled subject or an assigned teacher.
pub(crate) fn is_upcoming(
    student: &StudentAssignment<'_>,
    quiz: QuizCandidate<'_>,
    now: PrimitiveDateTime,
) -> bool {
    if student.completed.contains(quiz.quiz_id) {
        return false;
    }

    if quiz.due_date.is_some_and(|due| due < now) {
        return false;
    }

    student.has_subject(quiz.subject_id, quiz.subject_name) || student.has_teacher(quiz.teacher_id)
}
