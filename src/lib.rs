//! Monthly Jira timesheet automation.
//!
//! `create` makes sure the month has a parent story and one sub-task per working day; `complete`
//! closes the sub-tasks dated up to today and logs a workday on each.

pub mod check;
pub mod cli;
pub mod dates;
pub mod error;
pub mod executor;
pub mod report;
pub mod settings;
pub mod sync;
pub mod tracker;

#[cfg(test)]
mod testing;

use chrono::Local;
use jira_api::JiraClient;
use log::info;

pub use cli::{Cli, Command};
pub use error::{AppError, Result};

use executor::executor_for;
use report::Reporter;
use settings::{parse_limit, Settings};
use sync::{CompletionSync, CreationSync};

/// Runs one command against the tracker configured in the environment.
pub async fn run(command: Command) -> Result<()> {
    // Argument errors must surface before any configuration or network access.
    let limit = match &command {
        Command::Create { limit, .. } => parse_limit(*limit)?,
        _ => None,
    };

    let settings = Settings::from_env()?;
    let client = JiraClient::new(settings.jira_config())?;

    if command == Command::Check {
        let report = check::check_access(&client, &settings).await?;
        for line in report.lines() {
            println!("{}", line);
        }
        println!(
            "Working days this month: {}",
            dates::working_days_of_current_month().len()
        );
        return Ok(());
    }

    let dry_run = command.is_dry_run();
    if dry_run {
        info!("Dry run: no changes will be made in Jira");
    }

    let reference = Local::now().date_naive();
    let executor = executor_for(dry_run, &client);
    let mut reporter = Reporter::stdout();

    match command {
        Command::Create { .. } => {
            let report = CreationSync::new(&client, executor.as_ref(), &settings)
                .run(reference, limit, &mut reporter)
                .await?;
            info!(
                "Parent {}: {} of {} processed sub-tasks created",
                report.parent.key(),
                report.created_children(),
                report.children.len()
            );
        }
        Command::Complete { .. } => {
            let report = CompletionSync::new(&client, executor.as_ref(), &settings)
                .run(reference, &mut reporter)
                .await?;
            let skipped = report.children.iter().filter(|child| child.is_skipped()).count();
            info!(
                "Processed {} sub-tasks: {} worklogs added, {} skipped",
                report.children.len(),
                report.worklogs_added(),
                skipped
            );
        }
        Command::Check => {}
    }

    if executor.is_dry_run() {
        info!("Dry run complete; re-run without dry run to apply these changes");
    }
    Ok(())
}
