pub(crate) mod analytics;
pub(crate) mod assignment;
pub(crate) mod login_claims;
pub(crate) mod scoring;
pub(crate) mod study_tips;
