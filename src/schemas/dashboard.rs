use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct StatsResponse {
    pub(crate) students: i64,
    pub(crate) teachers: i64,
    pub(crate) subjects: i64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UserRef {
    pub(crate) id: String,
    pub(crate) username: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentsPerSubject {
    pub(crate) name: String,
    pub(crate) student_count: usize,
    pub(crate) students: Vec<UserRef>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TeachersPerSubject {
    pub(crate) subject: String,
    pub(crate) teacher_count: usize,
    pub(crate) teachers: Vec<UserRef>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectTeacherRef {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentSubjectEntry {
    pub(crate) subject: String,
    pub(crate) teacher: Option<SubjectTeacherRef>,
    pub(crate) completed_quizzes: usize,
    pub(crate) average_score: i32,
    pub(crate) total_quizzes: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentSubjectsResponse {
    pub(crate) student: UserRef,
    pub(crate) subjects: Vec<StudentSubjectEntry>,
}
