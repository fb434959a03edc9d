//! Ensures the month's parent story and one sub-task per working day exist.

use std::num::NonZeroUsize;

use chrono::{Datelike, NaiveDate};
use jira_api::{Document, IssueCreateRequest};
use log::info;

use super::{child_query, find_parent};
use crate::dates::{format_date, month_name, working_days};
use crate::executor::{Applied, MutationExecutor};
use crate::report::{Outcome, ProgressLine, Reporter};
use crate::settings::{Settings, CHILD_ISSUE_TYPE, PARENT_ISSUE_TYPE};
use crate::tracker::IssueTracker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentResolution {
    Existing(String),
    Created(String),
    Simulated(String),
}

impl ParentResolution {
    pub fn key(&self) -> &str {
        match self {
            ParentResolution::Existing(key)
            | ParentResolution::Created(key)
            | ParentResolution::Simulated(key) => key,
        }
    }

    fn outcome(&self) -> Outcome {
        match self {
            ParentResolution::Existing(_) => Outcome::Exists,
            ParentResolution::Created(_) => Outcome::Created,
            ParentResolution::Simulated(_) => Outcome::WouldCreate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildCreation {
    pub date: NaiveDate,
    pub key: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationReport {
    pub parent: ParentResolution,
    pub working_days: usize,
    pub children: Vec<ChildCreation>,
}

impl CreationReport {
    pub fn created_children(&self) -> usize {
        self.children
            .iter()
            .filter(|child| child.outcome == Outcome::Created)
            .count()
    }

    pub fn child_keys(&self) -> Vec<&str> {
        self.children.iter().map(|child| child.key.as_str()).collect()
    }
}

pub struct CreationSync<'a> {
    tracker: &'a dyn IssueTracker,
    executor: &'a dyn MutationExecutor,
    settings: &'a Settings,
}

impl<'a> CreationSync<'a> {
    pub fn new(
        tracker: &'a dyn IssueTracker,
        executor: &'a dyn MutationExecutor,
        settings: &'a Settings,
    ) -> Self {
        Self {
            tracker,
            executor,
            settings,
        }
    }

    /// Creates whatever is missing for the month containing `reference`. With `limit`, only the
    /// first `limit` working days are considered.
    pub async fn run(
        &self,
        reference: NaiveDate,
        limit: Option<NonZeroUsize>,
        reporter: &mut Reporter,
    ) -> jira_api::Result<CreationReport> {
        let days = working_days(reference);
        info!(
            "Found {} working days in {} {}",
            days.len(),
            month_name(reference),
            reference.year()
        );

        let parent = self.resolve_parent(reference).await?;
        reporter.emit(ProgressLine::new(
            Some(reference),
            parent.key(),
            parent.outcome(),
        ));

        let selected = match limit {
            Some(limit) => {
                let count = limit.get().min(days.len());
                info!("Processing {} working days (limited to {})", count, limit);
                &days[..count]
            }
            None => {
                info!("Processing all {} working days", days.len());
                &days[..]
            }
        };

        let mut children = Vec::with_capacity(selected.len());
        for &date in selected {
            let child = self.ensure_child(&parent, date).await?;
            reporter.emit(ProgressLine::new(Some(date), child.key.as_str(), child.outcome));
            children.push(child);
        }

        Ok(CreationReport {
            parent,
            working_days: days.len(),
            children,
        })
    }

    async fn resolve_parent(&self, reference: NaiveDate) -> jira_api::Result<ParentResolution> {
        if let Some(key) = find_parent(self.tracker, self.settings, reference).await? {
            return Ok(ParentResolution::Existing(key));
        }

        let request = IssueCreateRequest::new(
            &self.settings.project_key,
            PARENT_ISSUE_TYPE,
            self.settings.parent_summary(reference),
            Document::paragraph(format!(
                "Time tracking tickets for {} {}",
                month_name(reference),
                reference.year()
            )),
            &self.settings.assignee_account_id,
        );
        Ok(match self.executor.create_issue(&request).await? {
            Applied::Performed(key) => ParentResolution::Created(key),
            Applied::Simulated(key) => ParentResolution::Simulated(key),
        })
    }

    async fn ensure_child(
        &self,
        parent: &ParentResolution,
        date: NaiveDate,
    ) -> jira_api::Result<ChildCreation> {
        // A simulated parent has no remote children to search for.
        if !matches!(parent, ParentResolution::Simulated(_)) {
            let query = child_query(parent.key(), date);
            if let Some(key) = self.tracker.find_issue(&query).await? {
                return Ok(ChildCreation {
                    date,
                    key,
                    outcome: Outcome::Exists,
                });
            }
        }

        let formatted = format_date(date);
        let request = IssueCreateRequest::new(
            &self.settings.project_key,
            CHILD_ISSUE_TYPE,
            formatted.as_str(),
            Document::paragraph(format!("Time tracking for {}", formatted)),
            &self.settings.assignee_account_id,
        )
        .with_parent(parent.key());

        let (key, outcome) = match self.executor.create_issue(&request).await? {
            Applied::Performed(key) => (key, Outcome::Created),
            Applied::Simulated(key) => (key, Outcome::WouldCreate),
        };
        Ok(ChildCreation { date, key, outcome })
    }
}
