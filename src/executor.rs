//! Mutating tracker calls behind a live/dry-run capability.
//!
//! Synchronizers read through [`IssueTracker`] directly and route every write through a
//! [`MutationExecutor`], so a dry run differs from a live run only in the executor it was handed.

use async_trait::async_trait;
use jira_api::models::Transition;
use jira_api::{IssueCreateRequest, WorklogCreateRequest};

use crate::tracker::IssueTracker;

pub const DRY_RUN_PARENT_KEY: &str = "DRY-RUN-PARENT";
pub const DRY_RUN_CHILD_KEY: &str = "DRY-RUN-CHILD";

/// Result of a mutation: either it reached the tracker or it was only simulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied<T> {
    Performed(T),
    Simulated(T),
}

impl<T> Applied<T> {
    pub fn is_simulated(&self) -> bool {
        matches!(self, Applied::Simulated(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Applied::Performed(value) | Applied::Simulated(value) => value,
        }
    }
}

#[async_trait]
pub trait MutationExecutor: Send + Sync {
    fn is_dry_run(&self) -> bool;

    async fn create_issue(&self, request: &IssueCreateRequest) -> jira_api::Result<Applied<String>>;

    async fn apply_transition(
        &self,
        issue_key: &str,
        transition: &Transition,
    ) -> jira_api::Result<Applied<()>>;

    async fn add_worklog(
        &self,
        issue_key: &str,
        entry: &WorklogCreateRequest,
    ) -> jira_api::Result<Applied<()>>;
}

/// Forwards every mutation to the tracker.
pub struct LiveExecutor<'a> {
    tracker: &'a dyn IssueTracker,
}

impl<'a> LiveExecutor<'a> {
    pub fn new(tracker: &'a dyn IssueTracker) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl MutationExecutor for LiveExecutor<'_> {
    fn is_dry_run(&self) -> bool {
        false
    }

    async fn create_issue(&self, request: &IssueCreateRequest) -> jira_api::Result<Applied<String>> {
        self.tracker.create_issue(request).await.map(Applied::Performed)
    }

    async fn apply_transition(
        &self,
        issue_key: &str,
        transition: &Transition,
    ) -> jira_api::Result<Applied<()>> {
        self.tracker
            .apply_transition(issue_key, &transition.id)
            .await
            .map(Applied::Performed)
    }

    async fn add_worklog(
        &self,
        issue_key: &str,
        entry: &WorklogCreateRequest,
    ) -> jira_api::Result<Applied<()>> {
        self.tracker
            .add_worklog(issue_key, entry)
            .await
            .map(Applied::Performed)
    }
}

/// Performs nothing; issue creation yields a placeholder key.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunExecutor;

#[async_trait]
impl MutationExecutor for DryRunExecutor {
    fn is_dry_run(&self) -> bool {
        true
    }

    async fn create_issue(&self, request: &IssueCreateRequest) -> jira_api::Result<Applied<String>> {
        let placeholder = if request.fields.parent.is_some() {
            DRY_RUN_CHILD_KEY
        } else {
            DRY_RUN_PARENT_KEY
        };
        Ok(Applied::Simulated(placeholder.to_string()))
    }

    async fn apply_transition(
        &self,
        _issue_key: &str,
        _transition: &Transition,
    ) -> jira_api::Result<Applied<()>> {
        Ok(Applied::Simulated(()))
    }

    async fn add_worklog(
        &self,
        _issue_key: &str,
        _entry: &WorklogCreateRequest,
    ) -> jira_api::Result<Applied<()>> {
        Ok(Applied::Simulated(()))
    }
}

pub fn executor_for<'a>(dry_run: bool, tracker: &'a dyn IssueTracker) -> Box<dyn MutationExecutor + 'a> {
    if dry_run {
        Box::new(DryRunExecutor)
    } else {
        Box::new(LiveExecutor::new(tracker))
    }
}
