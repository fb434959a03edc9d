use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Document;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Worklog {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub started: Option<String>,
    #[serde(default)]
    pub time_spent: Option<String>,
    #[serde(default)]
    pub comment: Option<Value>,
}

impl Worklog {
    /// Plain text of the comment, whether the tracker sent a document or a bare string.
    pub fn comment_text(&self) -> Option<String> {
        match self.comment.as_ref()? {
            Value::String(text) => Some(text.clone()),
            value => serde_json::from_value::<Document>(value.clone())
                .ok()
                .map(|doc| doc.plain_text()),
        }
    }
}

/// Body of `GET /issue/{key}/worklog`.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorklogPage {
    #[serde(default)]
    pub worklogs: Vec<Worklog>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Body of `POST /issue/{key}/worklog`.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorklogCreateRequest {
    pub time_spent: String,
    pub started: String,
    pub comment: Document,
}
