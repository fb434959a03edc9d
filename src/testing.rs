//! In-memory tracker used by synchronizer tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use jira_api::models::{IssueFields, StatusRef, Transition};
use jira_api::{
    Issue, IssueCreateRequest, IssueQuery, JiraError, StatusCode, Worklog, WorklogCreateRequest,
};

use crate::settings::{
    Settings, ENV_API_TOKEN, ENV_ASSIGNEE, ENV_DOMAIN, ENV_IDENTITY, ENV_PROJECT_KEY, ENV_USERNAME,
};
use crate::tracker::IssueTracker;

pub const DONE_TRANSITION_ID: &str = "31";

pub fn test_settings() -> Settings {
    let vars: HashMap<&str, &str> = HashMap::from([
        (ENV_DOMAIN, "acme.atlassian.net"),
        (ENV_PROJECT_KEY, "TT"),
        (ENV_USERNAME, "jane@acme.io"),
        (ENV_API_TOKEN, "token"),
        (ENV_ASSIGNEE, "acc-42"),
        (ENV_IDENTITY, "Jane D"),
    ]);
    Settings::from_lookup(|name| vars.get(name).map(|value| value.to_string()))
        .expect("test settings are complete")
}

#[derive(Debug, Clone)]
pub struct StoredIssue {
    pub key: String,
    pub project: String,
    pub summary: String,
    pub issue_type: String,
    pub parent: Option<String>,
    pub assignee: String,
    pub status: String,
    pub worklogs: Vec<WorklogCreateRequest>,
}

#[derive(Default)]
struct State {
    next_id: u32,
    issues: Vec<StoredIssue>,
    calls: Vec<String>,
    fail_on: Option<String>,
    stale_done: Vec<String>,
}

/// Tracker double with Jira-like search, workflow and worklog behaviour.
#[derive(Default)]
pub struct FakeTracker {
    state: Mutex<State>,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an issue directly, bypassing the call log. Returns its key.
    pub fn seed(&self, summary: &str, issue_type: &str, parent: Option<&str>) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let key = format!("TT-{}", state.next_id);
        state.issues.push(StoredIssue {
            key: key.clone(),
            project: "TT".to_string(),
            summary: summary.to_string(),
            issue_type: issue_type.to_string(),
            parent: parent.map(str::to_string),
            assignee: "acc-42".to_string(),
            status: "To Do".to_string(),
            worklogs: Vec::new(),
        });
        key
    }

    /// Makes every call whose log entry starts with `prefix` fail with a 500.
    pub fn fail_on(&self, prefix: &str) {
        self.state.lock().unwrap().fail_on = Some(prefix.to_string());
    }

    /// Keeps offering the done transition for `key` after it is closed, like a stale workflow cache.
    pub fn offer_stale_done(&self, key: &str) {
        self.state.lock().unwrap().stale_done.push(key.to_string());
    }

    pub fn set_status(&self, key: &str, status: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(issue) = state.issues.iter_mut().find(|issue| issue.key == key) {
            issue.status = status.to_string();
        }
    }

    pub fn issues(&self) -> Vec<StoredIssue> {
        self.state.lock().unwrap().issues.clone()
    }

    pub fn issue(&self, key: &str) -> StoredIssue {
        self.issues()
            .into_iter()
            .find(|issue| issue.key == key)
            .expect("issue exists")
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of recorded calls starting with `prefix`.
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|call| call.starts_with(prefix)).count()
    }

    fn record(&self, call: String) -> jira_api::Result<()> {
        let mut state = self.state.lock().unwrap();
        let failing = state
            .fail_on
            .as_deref()
            .is_some_and(|prefix| call.starts_with(prefix));
        state.calls.push(call.clone());
        if failing {
            return Err(JiraError::http(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("injected failure: {call}"),
            ));
        }
        Ok(())
    }

    fn matching(&self, query: &IssueQuery) -> Vec<StoredIssue> {
        let state = self.state.lock().unwrap();
        let mut found: Vec<StoredIssue> = state
            .issues
            .iter()
            .filter(|issue| query.project.as_ref().map_or(true, |p| &issue.project == p))
            .filter(|issue| query.parent.as_ref().map_or(true, |p| issue.parent.as_ref() == Some(p)))
            .filter(|issue| {
                query
                    .summary_contains
                    .as_ref()
                    .map_or(true, |text| issue.summary.contains(text.as_str()))
            })
            .filter(|issue| query.issue_type.as_ref().map_or(true, |t| &issue.issue_type == t))
            .cloned()
            .collect();
        if query.order_by_key {
            found.sort_by_key(|issue| key_number(&issue.key));
        }
        found
    }
}

fn key_number(key: &str) -> u32 {
    key.rsplit('-').next().and_then(|n| n.parse().ok()).unwrap_or(0)
}

fn to_issue(stored: &StoredIssue) -> Issue {
    Issue {
        key: stored.key.clone(),
        fields: IssueFields {
            summary: Some(stored.summary.clone()),
            status: Some(StatusRef {
                id: None,
                name: Some(stored.status.clone()),
            }),
        },
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn find_issue(&self, query: &IssueQuery) -> jira_api::Result<Option<String>> {
        self.record(format!("search {}", query.to_jql()))?;
        Ok(self.matching(query).first().map(|issue| issue.key.clone()))
    }

    async fn search_issues(&self, query: &IssueQuery, max_results: u32) -> jira_api::Result<Vec<Issue>> {
        self.record(format!("search {}", query.to_jql()))?;
        Ok(self
            .matching(query)
            .iter()
            .take(max_results as usize)
            .map(to_issue)
            .collect())
    }

    async fn create_issue(&self, request: &IssueCreateRequest) -> jira_api::Result<String> {
        self.record(format!("create {}", request.fields.summary))?;
        let fields = &request.fields;
        let key = self.seed(
            &fields.summary,
            &fields.issue_type.name,
            fields.parent.as_ref().map(|parent| parent.key.as_str()),
        );
        let mut state = self.state.lock().unwrap();
        if let Some(issue) = state.issues.iter_mut().find(|issue| issue.key == key) {
            issue.project = fields.project.key.clone();
            issue.assignee = fields.assignee.account_id.clone();
        }
        Ok(key)
    }

    async fn transitions(&self, issue_key: &str) -> jira_api::Result<Vec<Transition>> {
        self.record(format!("transitions {issue_key}"))?;
        let status = self.issue(issue_key).status;
        let stale = self
            .state
            .lock()
            .unwrap()
            .stale_done
            .iter()
            .any(|key| key == issue_key);
        let transitions = if status == "Done" && !stale {
            vec![Transition {
                id: "41".to_string(),
                name: "Reopen".to_string(),
            }]
        } else {
            vec![
                Transition {
                    id: "21".to_string(),
                    name: "In Progress".to_string(),
                },
                Transition {
                    id: DONE_TRANSITION_ID.to_string(),
                    name: "Done".to_string(),
                },
            ]
        };
        Ok(transitions)
    }

    async fn apply_transition(&self, issue_key: &str, transition_id: &str) -> jira_api::Result<()> {
        self.record(format!("transition {issue_key} {transition_id}"))?;
        let current = self.issue(issue_key).status;
        match (current.as_str(), transition_id) {
            ("Done", DONE_TRANSITION_ID) => Err(JiraError::StaleTransition {
                issue_key: issue_key.to_string(),
                transition_id: transition_id.to_string(),
                message: "Transition id '31' is not valid for this issue.".to_string(),
            }),
            (_, DONE_TRANSITION_ID) => {
                self.set_status(issue_key, "Done");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn worklogs(&self, issue_key: &str) -> jira_api::Result<Vec<Worklog>> {
        self.record(format!("worklogs {issue_key}"))?;
        Ok(self
            .issue(issue_key)
            .worklogs
            .iter()
            .enumerate()
            .map(|(index, entry)| Worklog {
                id: Some(index.to_string()),
                started: Some(entry.started.clone()),
                time_spent: Some(entry.time_spent.clone()),
                comment: serde_json::to_value(&entry.comment).ok(),
            })
            .collect())
    }

    async fn add_worklog(&self, issue_key: &str, entry: &WorklogCreateRequest) -> jira_api::Result<()> {
        self.record(format!("add-worklog {issue_key}"))?;
        let mut state = self.state.lock().unwrap();
        if let Some(issue) = state.issues.iter_mut().find(|issue| issue.key == issue_key) {
            issue.worklogs.push(entry.clone());
        }
        Ok(())
    }
}
