pub(crate) mod ai;
pub(crate) mod auth;
pub(crate) mod dashboard;
pub(crate) mod errors;
pub(crate) mod extract;
pub(crate) mod feedback;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod lookups;
pub(crate) mod quiz_answers;
pub(crate) mod quizzes;
pub(crate) mod router;
pub(crate) mod subjects;
pub(crate) mod validation;
