//! Typed Jira Cloud REST client covering issue search, creation, transitions and worklogs.

pub mod client;
pub mod config;
pub mod error;
pub mod jql;
pub mod models;
pub mod pacing;

pub use client::{error_summary, JiraClient, ISSUE_SUMMARY_FIELDS, MAX_SEARCH_RESULTS};
pub use config::JiraConfig;
pub use error::{JiraError, Result};
pub use jql::IssueQuery;
pub use models::{
    Document, Issue, IssueCreateRequest, Project, Transition, User, Worklog, WorklogCreateRequest,
};
pub use pacing::RequestPacer;
pub use reqwest::StatusCode;
