//! Pre-flight check of credentials and project access.

use jira_api::{JiraClient, Project, User};
use log::{info, warn};

use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct AccessReport {
    pub project: Project,
    pub user: User,
    /// Whether the authenticated account is the configured assignee.
    pub assignee_is_self: bool,
}

impl AccessReport {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "Project: {} ({})",
                self.project.key,
                self.project.name.as_deref().unwrap_or("unnamed")
            ),
            format!(
                "User: {} ({})",
                self.user.display_name.as_deref().unwrap_or("unknown"),
                self.user.account_id
            ),
        ];
        if !self.assignee_is_self {
            lines.push("Assignee: tickets will be assigned to another account".to_string());
        }
        lines
    }
}

/// Fetches the configured project and the authenticated user.
pub async fn check_access(client: &JiraClient, settings: &Settings) -> jira_api::Result<AccessReport> {
    info!("Domain: {}", settings.domain);
    info!("Project key: {}", settings.project_key);
    info!("Username is set: {}", !settings.username.is_empty());
    info!("API token is set: {}", !settings.api_token.is_empty());

    let project = client.get_project(&settings.project_key).await?;
    let user = client.get_myself().await?;
    let assignee_is_self = user.account_id == settings.assignee_account_id;
    if !assignee_is_self {
        warn!(
            "Configured assignee {} differs from the authenticated account {}",
            settings.assignee_account_id, user.account_id
        );
    }
    Ok(AccessReport {
        project,
        user,
        assignee_is_self,
    })
}
