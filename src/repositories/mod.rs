pub(crate) mod feedback;
pub(crate) mod quiz_answers;
pub(crate) mod quizzes;
pub(crate) mod subjects;
pub(crate) mod users;
