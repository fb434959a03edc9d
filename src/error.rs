use jira_api::JiraError;
use thiserror::Error;

use crate::settings::ConfigError;

pub type Result<T> = std::result::Result<T, AppError>;

/// Anything that ends a run with a non-zero exit status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("jira request failed: {0}")]
    Jira(#[from] JiraError),
}

impl AppError {
    /// One-line description for the final log line; Jira bodies are reduced to their first message.
    pub fn describe(&self) -> String {
        match self {
            AppError::Jira(JiraError::Http { status, message }) => {
                match jira_api::error_summary(message) {
                    Some(summary) => format!("jira request failed: http {}: {}", status, summary),
                    None => self.to_string(),
                }
            }
            _ => self.to_string(),
        }
    }
}
