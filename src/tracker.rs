//! The slice of the issue tracker the synchronizers depend on.

use async_trait::async_trait;
use jira_api::models::Transition;
use jira_api::{Issue, IssueCreateRequest, IssueQuery, JiraClient, Worklog, WorklogCreateRequest};

/// Remote issue store. Every call is awaited before the next one is issued.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Key of the first issue matching `query`.
    async fn find_issue(&self, query: &IssueQuery) -> jira_api::Result<Option<String>>;

    async fn search_issues(&self, query: &IssueQuery, max_results: u32) -> jira_api::Result<Vec<Issue>>;

    async fn create_issue(&self, request: &IssueCreateRequest) -> jira_api::Result<String>;

    async fn transitions(&self, issue_key: &str) -> jira_api::Result<Vec<Transition>>;

    async fn apply_transition(&self, issue_key: &str, transition_id: &str) -> jira_api::Result<()>;

    async fn worklogs(&self, issue_key: &str) -> jira_api::Result<Vec<Worklog>>;

    async fn add_worklog(&self, issue_key: &str, entry: &WorklogCreateRequest) -> jira_api::Result<()>;
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn find_issue(&self, query: &IssueQuery) -> jira_api::Result<Option<String>> {
        JiraClient::find_issue(self, query).await
    }

    async fn search_issues(&self, query: &IssueQuery, max_results: u32) -> jira_api::Result<Vec<Issue>> {
        JiraClient::search_issues(self, query, max_results).await
    }

    async fn create_issue(&self, request: &IssueCreateRequest) -> jira_api::Result<String> {
        JiraClient::create_issue(self, request).await
    }

    async fn transitions(&self, issue_key: &str) -> jira_api::Result<Vec<Transition>> {
        self.get_transitions(issue_key).await
    }

    async fn apply_transition(&self, issue_key: &str, transition_id: &str) -> jira_api::Result<()> {
        self.execute_transition(issue_key, transition_id).await
    }

    async fn worklogs(&self, issue_key: &str) -> jira_api::Result<Vec<Worklog>> {
        self.get_worklogs(issue_key).await
    }

    async fn add_worklog(&self, issue_key: &str, entry: &WorklogCreateRequest) -> jira_api::Result<()> {
        JiraClient::add_worklog(self, issue_key, entry).await
    }
}
