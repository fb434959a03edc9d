use serde::{Deserialize, Serialize};

use super::Document;

#[derive(Debug, Deserialize, Clone)]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<StatusRef>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatusRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl Issue {
    pub fn summary(&self) -> &str {
        self.fields.summary.as_deref().unwrap_or_default()
    }

    pub fn status_name(&self) -> Option<&str> {
        self.fields.status.as_ref().and_then(|status| status.name.as_deref())
    }
}

/// Body of `GET /search`.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Body of `POST /issue`.
#[derive(Debug, Serialize, Clone)]
pub struct IssueCreateRequest {
    pub fields: NewIssueFields,
}

#[derive(Debug, Serialize, Clone)]
pub struct NewIssueFields {
    pub project: KeyRef,
    pub summary: String,
    pub description: Document,
    #[serde(rename = "issuetype")]
    pub issue_type: NameRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<KeyRef>,
    pub assignee: AccountRef,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct KeyRef {
    pub key: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct NameRef {
    pub name: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountRef {
    pub account_id: String,
}

impl IssueCreateRequest {
    pub fn new(
        project_key: impl Into<String>,
        issue_type: impl Into<String>,
        summary: impl Into<String>,
        description: Document,
        assignee_account_id: impl Into<String>,
    ) -> Self {
        Self {
            fields: NewIssueFields {
                project: KeyRef {
                    key: project_key.into(),
                },
                summary: summary.into(),
                description,
                issue_type: NameRef {
                    name: issue_type.into(),
                },
                parent: None,
                assignee: AccountRef {
                    account_id: assignee_account_id.into(),
                },
            },
        }
    }

    pub fn with_parent(mut self, parent_key: impl Into<String>) -> Self {
        self.fields.parent = Some(KeyRef {
            key: parent_key.into(),
        });
        self
    }
}

/// Response of `POST /issue`.
#[derive(Debug, Deserialize, Clone)]
pub struct CreatedIssue {
    pub key: String,
    #[serde(default)]
    pub id: Option<String>,
}
