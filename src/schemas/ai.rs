use serde::{Deserialize, Serialize};

use crate::services::analytics::AnalyticsReport;

#[derive(Debug, Serialize)]
pub(crate) struct AnalyticsResponse {
    pub(crate) attempts: usize,
    #[serde(flatten)]
    pub(crate) report: AnalyticsReport,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TipsPayload {
    #[serde(default, alias = "weakSubjects")]
    pub(crate) weak_subjects: Vec<String>,
    #[serde(default, alias = "weakestTopics")]
    pub(crate) weakest_topics: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TipsResponse {
    pub(crate) tips: Vec<String>,
    pub(crate) model: &'static str,
}
