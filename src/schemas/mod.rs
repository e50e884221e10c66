use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

pub(crate) mod ai;
pub(crate) mod auth;
pub(crate) mod dashboard;
pub(crate) mod feedback;
pub(crate) mod quiz;
pub(crate) mod quiz_answer;
pub(crate) mod subject;
pub(crate) mod user;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
    pub(crate) api_prefix: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub(crate) msg: String,
}

impl MessageResponse {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<Option<String>>),
}

impl OneOrMany {
    fn into_values(self) -> Vec<String> {
        let values = match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values.into_iter().flatten().collect(),
        };
        values
            .into_iter()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect()
    }
}

/// A string or an array of strings; blanks are dropped and `null` reads as empty.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<OneOrMany>::deserialize(deserializer)?;
    Ok(raw.map(OneOrMany::into_values).unwrap_or_default())
}

/// Like [`one_or_many`], but keeps "field absent or null" distinguishable from "empty".
pub(crate) fn optional_one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<OneOrMany>::deserialize(deserializer)?;
    Ok(raw.map(OneOrMany::into_values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Claims {
        #[serde(default, deserialize_with = "one_or_many")]
        subject: Vec<String>,
        #[serde(default, deserialize_with = "optional_one_or_many")]
        teacher_id: Option<Vec<String>>,
    }

    #[test]
    fn accepts_single_values_and_arrays() {
        let single: Claims = serde_json::from_str(r#"{"subject": "Math"}"#).unwrap();
        assert_eq!(single.subject, vec!["Math"]);
        assert!(single.teacher_id.is_none());

        let many: Claims =
            serde_json::from_str(r#"{"subject": ["Math", " ", null, "Art "], "teacher_id": []}"#)
                .unwrap();
        assert_eq!(many.subject, vec!["Math", "Art"]);
        assert_eq!(many.teacher_id, Some(Vec::new()));
    }

    #[test]
    fn null_and_missing_read_as_empty() {
        let claims: Claims = serde_json::from_str(r#"{"subject": null}"#).unwrap();
        assert!(claims.subject.is_empty());
        assert!(claims.teacher_id.is_none());
    }
}
