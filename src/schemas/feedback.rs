use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::Feedback;

pub(crate) const DEFAULT_SUBJECT: &str = "General Feedback";
pub(crate) const SYSTEM_TEACHER: &str = "System Teacher";

#[derive(Debug, Deserialize)]
pub(crate) struct TeacherFeedbackRequest {
    #[serde(default, alias = "studentId")]
    pub(crate) student_id: Option<String>,
    #[serde(default, alias = "teacherId")]
    pub(crate) teacher_id: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) subject: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentFeedbackRequest {
    #[serde(default, alias = "studentId")]
    pub(crate) student_id: Option<String>,
    #[serde(default, alias = "teacherId")]
    pub(crate) teacher_id: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) subject: Option<String>,
    #[serde(default, alias = "studentName")]
    pub(crate) student_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SampleFeedbackRequest {
    #[serde(default, alias = "studentId")]
    pub(crate) student_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FeedbackResponse {
    pub(crate) id: String,
    pub(crate) sender_id: Option<String>,
    pub(crate) sender_name: String,
    pub(crate) message: String,
    pub(crate) subject: String,
    pub(crate) created_at: String,
}

impl FeedbackResponse {
    pub(crate) fn from_db(feedback: Feedback) -> Self {
        Self {
            id: feedback.id,
            sender_id: feedback.sender_id,
            sender_name: feedback.sender_name,
            message: feedback.message,
            subject: feedback.subject,
            created_at: format_primitive(feedback.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FeedbackSentResponse {
    pub(crate) message: String,
    pub(crate) feedback: FeedbackResponse,
}

#[derive(Debug, Serialize)]
pub(crate) struct SampleFeedbackResponse {
    pub(crate) message: String,
    pub(crate) feedbacks: Vec<FeedbackResponse>,
}
