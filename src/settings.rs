//! Environment-backed settings for a timesheet run.
//!
//! Everything is read once, before the first request; a missing or malformed value is a
//! [`ConfigError`] and nothing touches the network.

use chrono::{NaiveDate, NaiveTime};
use jira_api::JiraConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::env;
use std::num::NonZeroUsize;
use std::time::Duration;
use thiserror::Error;

use crate::dates::month_name;

pub const ENV_DOMAIN: &str = "JIRA_DOMAIN";
pub const ENV_PROJECT_KEY: &str = "JIRA_PROJECT_KEY";
pub const ENV_USERNAME: &str = "JIRA_USERNAME";
pub const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";
pub const ENV_ASSIGNEE: &str = "JIRA_ASSIGNEE";
pub const ENV_IDENTITY: &str = "TIMESHEET_IDENTITY";
pub const ENV_API_VERSION: &str = "JIRA_API_VERSION";
pub const ENV_DONE_TRANSITION: &str = "TIMESHEET_DONE_TRANSITION";
pub const ENV_WORKLOG_DURATION: &str = "TIMESHEET_WORKLOG_DURATION";
pub const ENV_WORKDAY_START: &str = "TIMESHEET_WORKDAY_START";
pub const ENV_REQUEST_COOLDOWN_MS: &str = "JIRA_REQUEST_COOLDOWN_MS";

pub const REQUIRED_VARS: [&str; 6] = [
    ENV_DOMAIN,
    ENV_PROJECT_KEY,
    ENV_USERNAME,
    ENV_API_TOKEN,
    ENV_ASSIGNEE,
    ENV_IDENTITY,
];

pub const PARENT_ISSUE_TYPE: &str = "Story";
pub const CHILD_ISSUE_TYPE: &str = "Sub-task";

static WORKLOG_DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\d+\s*[wdhm](\s+\d+\s*[wdhm])*\s*$").expect("invalid duration regex")
});

fn default_api_version() -> String {
    jira_api::config::DEFAULT_API_VERSION.to_string()
}

fn default_done_transition() -> String {
    "Done".to_string()
}

fn default_worklog_duration() -> String {
    "8h".to_string()
}

/// Default workday start, used as the worklog start time.
fn default_workday_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

fn default_request_cooldown() -> Duration {
    Duration::from_millis(jira_api::config::DEFAULT_COOLDOWN_MS)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingVars(Vec<&'static str>),
    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("--limit must be a positive number, got {0}")]
    InvalidLimit(i64),
}

/// Identity, credentials and tuning knobs of one timesheet.
#[derive(Clone)]
pub struct Settings {
    pub domain: String,
    pub project_key: String,
    pub username: String,
    pub api_token: String,
    pub assignee_account_id: String,
    pub identity: String,
    pub api_version: String,
    pub done_transition: String,
    pub worklog_duration: String,
    pub workday_start: NaiveTime,
    pub request_cooldown: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable source. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let missing: Vec<&'static str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| read(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVars(missing));
        }
        let required = |name: &'static str| read(name).unwrap_or_default();

        let worklog_duration = read(ENV_WORKLOG_DURATION).unwrap_or_else(default_worklog_duration);
        if !WORKLOG_DURATION_REGEX.is_match(&worklog_duration) {
            return Err(ConfigError::InvalidVar {
                name: ENV_WORKLOG_DURATION,
                value: worklog_duration,
                reason: "expected a Jira duration such as `8h` or `7h 30m`".to_string(),
            });
        }

        let workday_start = match read(ENV_WORKDAY_START) {
            Some(value) => NaiveTime::parse_from_str(&value, "%H:%M").map_err(|err| {
                ConfigError::InvalidVar {
                    name: ENV_WORKDAY_START,
                    value: value.clone(),
                    reason: err.to_string(),
                }
            })?,
            None => default_workday_start(),
        };

        let request_cooldown = match read(ENV_REQUEST_COOLDOWN_MS) {
            Some(value) => value
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|err| ConfigError::InvalidVar {
                    name: ENV_REQUEST_COOLDOWN_MS,
                    value: value.clone(),
                    reason: err.to_string(),
                })?,
            None => default_request_cooldown(),
        };

        Ok(Self {
            domain: required(ENV_DOMAIN),
            project_key: required(ENV_PROJECT_KEY),
            username: required(ENV_USERNAME),
            api_token: required(ENV_API_TOKEN),
            assignee_account_id: required(ENV_ASSIGNEE),
            identity: required(ENV_IDENTITY),
            api_version: read(ENV_API_VERSION).unwrap_or_else(default_api_version),
            done_transition: read(ENV_DONE_TRANSITION).unwrap_or_else(default_done_transition),
            worklog_duration,
            workday_start,
            request_cooldown,
        })
    }

    pub fn jira_config(&self) -> JiraConfig {
        JiraConfig::new(&self.domain, &self.username, &self.api_token)
            .with_api_version(&self.api_version)
            .with_cooldown(self.request_cooldown)
    }

    /// Summary that identifies the parent issue of the month containing `reference`.
    pub fn parent_summary(&self, reference: NaiveDate) -> String {
        format!(
            "Time Tracking {} for {}",
            month_name(reference),
            self.identity
        )
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("domain", &self.domain)
            .field("project_key", &self.project_key)
            .field("username", &self.username)
            .field("api_token", &"<redacted>")
            .field("assignee_account_id", &self.assignee_account_id)
            .field("identity", &self.identity)
            .field("api_version", &self.api_version)
            .field("done_transition", &self.done_transition)
            .field("worklog_duration", &self.worklog_duration)
            .field("workday_start", &self.workday_start)
            .field("request_cooldown", &self.request_cooldown)
            .finish()
    }
}

/// Validates a `--limit` argument; only positive counts are accepted.
pub fn parse_limit(raw: Option<i64>) -> Result<Option<NonZeroUsize>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(value) => usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Some)
            .ok_or(ConfigError::InvalidLimit(value)),
    }
}
