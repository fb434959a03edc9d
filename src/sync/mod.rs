//! Month synchronizers. Both resolve the month's parent issue the same way, then walk its
//! children strictly one at a time.

pub mod completion;
pub mod creation;

use chrono::NaiveDate;
use jira_api::{IssueQuery, MAX_SEARCH_RESULTS};

use crate::dates::format_date;
use crate::settings::{Settings, CHILD_ISSUE_TYPE, PARENT_ISSUE_TYPE};
use crate::tracker::IssueTracker;

pub use completion::{ChildCompletion, CompletionReport, CompletionSync, TransitionOutcome, WorklogOutcome};
pub use creation::{ChildCreation, CreationReport, CreationSync, ParentResolution};

/// Page size used when listing a parent's sub-tasks.
pub const CHILD_PAGE_SIZE: u32 = MAX_SEARCH_RESULTS;

pub fn parent_query(settings: &Settings, reference: NaiveDate) -> IssueQuery {
    IssueQuery::new()
        .project(&settings.project_key)
        .summary_contains(settings.parent_summary(reference))
        .issue_type(PARENT_ISSUE_TYPE)
}

pub fn child_query(parent_key: &str, date: NaiveDate) -> IssueQuery {
    IssueQuery::new()
        .parent(parent_key)
        .summary_contains(format_date(date))
        .issue_type(CHILD_ISSUE_TYPE)
}

pub fn children_query(parent_key: &str) -> IssueQuery {
    IssueQuery::new()
        .parent(parent_key)
        .issue_type(CHILD_ISSUE_TYPE)
        .ordered_by_key()
}

/// Key of the parent issue for the month containing `reference`.
pub async fn find_parent(
    tracker: &dyn IssueTracker,
    settings: &Settings,
    reference: NaiveDate,
) -> jira_api::Result<Option<String>> {
    tracker.find_issue(&parent_query(settings, reference)).await
}
