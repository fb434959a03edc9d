//! Closes past and current sub-tasks of the month and logs one workday on each.

use chrono::NaiveDate;
use jira_api::{Document, Issue, JiraError, WorklogCreateRequest};
use log::{info, warn};

use super::{children_query, find_parent, CHILD_PAGE_SIZE};
use crate::dates::{format_date, parse_summary_date, started_date, worklog_started};
use crate::executor::{Applied, MutationExecutor};
use crate::report::{Outcome, ProgressLine, Reporter};
use crate::settings::Settings;
use crate::tracker::IssueTracker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    WouldApply,
    /// The workflow offers no transition with the configured name.
    Unavailable,
    /// The tracker rejected the transition id it had just offered.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorklogOutcome {
    Added,
    WouldAdd,
    AlreadyLogged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildCompletion {
    Processed {
        key: String,
        date: NaiveDate,
        transition: TransitionOutcome,
        worklog: WorklogOutcome,
    },
    FutureDate {
        key: String,
        date: NaiveDate,
    },
    MalformedSummary {
        key: String,
        summary: String,
    },
}

impl ChildCompletion {
    pub fn key(&self) -> &str {
        match self {
            ChildCompletion::Processed { key, .. }
            | ChildCompletion::FutureDate { key, .. }
            | ChildCompletion::MalformedSummary { key, .. } => key,
        }
    }

    /// True when the run neither transitioned nor logged anything for this child.
    pub fn is_skipped(&self) -> bool {
        match self {
            ChildCompletion::Processed {
                transition,
                worklog,
                ..
            } => {
                !matches!(transition, TransitionOutcome::Applied | TransitionOutcome::WouldApply)
                    && *worklog == WorklogOutcome::AlreadyLogged
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionReport {
    /// `None` when the month has no parent issue yet.
    pub parent: Option<String>,
    pub children: Vec<ChildCompletion>,
}

impl CompletionReport {
    pub fn worklogs_added(&self) -> usize {
        self.children
            .iter()
            .filter(|child| {
                matches!(
                    child,
                    ChildCompletion::Processed {
                        worklog: WorklogOutcome::Added,
                        ..
                    }
                )
            })
            .count()
    }
}

pub struct CompletionSync<'a> {
    tracker: &'a dyn IssueTracker,
    executor: &'a dyn MutationExecutor,
    settings: &'a Settings,
}

impl<'a> CompletionSync<'a> {
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

    /// Completes every child of the month containing `reference` dated on or before it.
    /// The first tracker error aborts the run.
    pub async fn run(
        &self,
        reference: NaiveDate,
        reporter: &mut Reporter,
    ) -> jira_api::Result<CompletionReport> {
        let Some(parent) = find_parent(self.tracker, self.settings, reference).await? else {
            info!("No parent ticket found for the current month; nothing to do");
            return Ok(CompletionReport::default());
        };

        let children = self
            .tracker
            .search_issues(&children_query(&parent), CHILD_PAGE_SIZE)
            .await?;
        info!("Found {} child tickets under {}", children.len(), parent);

        let mut report = CompletionReport {
            parent: Some(parent),
            children: Vec::with_capacity(children.len()),
        };
        for child in &children {
            let completion = self.complete_child(child, reference, reporter).await?;
            report.children.push(completion);
        }
        Ok(report)
    }

    async fn complete_child(
        &self,
        child: &Issue,
        reference: NaiveDate,
        reporter: &mut Reporter,
    ) -> jira_api::Result<ChildCompletion> {
        let key = child.key.clone();
        let Some(date) = parse_summary_date(child.summary()) else {
            warn!("[{}] Could not extract date from summary: {}", key, child.summary());
            reporter.emit(
                ProgressLine::new(None, key.as_str(), Outcome::Skipped).with_detail(format!(
                    "could not extract date from summary: {}",
                    child.summary()
                )),
            );
            return Ok(ChildCompletion::MalformedSummary {
                key,
                summary: child.summary().to_string(),
            });
        };

        if date > reference {
            reporter.emit(
                ProgressLine::new(Some(date), key.as_str(), Outcome::Skipped)
                    .with_detail("future date"),
            );
            return Ok(ChildCompletion::FutureDate { key, date });
        }

        let transition = self.close(&key, date, reporter).await?;
        let worklog = self.log_work(&key, date, reporter).await?;
        Ok(ChildCompletion::Processed {
            key,
            date,
            transition,
            worklog,
        })
    }

    async fn close(
        &self,
        key: &str,
        date: NaiveDate,
        reporter: &mut Reporter,
    ) -> jira_api::Result<TransitionOutcome> {
        let wanted = self.settings.done_transition.as_str();
        let transitions = self.tracker.transitions(key).await?;
        let Some(transition) = transitions.iter().find(|t| t.is_named(wanted)) else {
            reporter.emit(
                ProgressLine::new(Some(date), key, Outcome::Skipped)
                    .with_detail(format!("no '{}' transition available", wanted)),
            );
            return Ok(TransitionOutcome::Unavailable);
        };

        match self.executor.apply_transition(key, transition).await {
            Ok(applied) => {
                let (outcome, result) = if applied.is_simulated() {
                    (Outcome::WouldUpdate, TransitionOutcome::WouldApply)
                } else {
                    (Outcome::Updated, TransitionOutcome::Applied)
                };
                reporter.emit(
                    ProgressLine::new(Some(date), key, outcome)
                        .with_detail(format!("status: {}", transition.name.trim())),
                );
                Ok(result)
            }
            Err(JiraError::StaleTransition { message, .. }) => {
                warn!("[{}] transition '{}' rejected: {}", key, transition.name, message);
                reporter.emit(
                    ProgressLine::new(Some(date), key, Outcome::Skipped)
                        .with_detail(format!("'{}' transition no longer available", wanted)),
                );
                Ok(TransitionOutcome::Stale)
            }
            Err(err) => Err(err),
        }
    }

    async fn log_work(
        &self,
        key: &str,
        date: NaiveDate,
        reporter: &mut Reporter,
    ) -> jira_api::Result<WorklogOutcome> {
        let worklogs = self.tracker.worklogs(key).await?;
        let already_logged = worklogs
            .iter()
            .filter_map(|worklog| worklog.started.as_deref())
            .any(|started| started_date(started) == Some(date));
        if already_logged {
            reporter.emit(
                ProgressLine::new(Some(date), key, Outcome::Skipped)
                    .with_detail("worklog already exists"),
            );
            return Ok(WorklogOutcome::AlreadyLogged);
        }

        let duration = self.settings.worklog_duration.as_str();
        let entry = WorklogCreateRequest {
            time_spent: duration.to_string(),
            started: worklog_started(date, self.settings.workday_start),
            comment: Document::paragraph(format!("Time tracking for {}", format_date(date))),
        };
        let applied = self.executor.add_worklog(key, &entry).await?;
        let (outcome, result, detail) = match applied {
            Applied::Performed(()) => (
                Outcome::Updated,
                WorklogOutcome::Added,
                format!("added worklog: {}", duration),
            ),
            Applied::Simulated(()) => (
                Outcome::WouldUpdate,
                WorklogOutcome::WouldAdd,
                format!("would add worklog: {}", duration),
            ),
        };
        reporter.emit(ProgressLine::new(Some(date), key, outcome).with_detail(detail));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{DryRunExecutor, LiveExecutor};
    use crate::testing::{test_settings, FakeTracker};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    /// Parent plus sub-tasks for 1, 4, 5 and 6 March.
    fn seeded_month() -> (FakeTracker, Vec<String>) {
        let tracker = FakeTracker::new();
        let parent = tracker.seed("Time Tracking March for Jane D", "Story", None);
        let children = ["01.03.2024", "04.03.2024", "05.03.2024", "06.03.2024"]
            .iter()
            .map(|summary| tracker.seed(summary, "Sub-task", Some(parent.as_str())))
            .collect();
        (tracker, children)
    }

    #[tokio::test]
    async fn missing_parent_means_nothing_to_do() {
        let tracker = FakeTracker::new();
        let settings = test_settings();
        let executor = LiveExecutor::new(&tracker);
        let mut reporter = Reporter::silent();

        let report = CompletionSync::new(&tracker, &executor, &settings)
            .run(day(5), &mut reporter)
            .await
            .unwrap();

        assert_eq!(report, CompletionReport::default());
        assert!(reporter.lines().is_empty());
        assert_eq!(tracker.calls().len(), 1);
    }

    #[tokio::test]
    async fn past_and_current_children_are_closed_and_logged() {
        let (tracker, children) = seeded_month();
        let settings = test_settings();
        let executor = LiveExecutor::new(&tracker);
        let mut reporter = Reporter::silent();

        let report = CompletionSync::new(&tracker, &executor, &settings)
            .run(day(5), &mut reporter)
            .await
            .unwrap();

        assert_eq!(report.worklogs_added(), 3);
        for key in &children[..3] {
            let issue = tracker.issue(key);
            assert_eq!(issue.status, "Done");
            assert_eq!(issue.worklogs.len(), 1);
            assert_eq!(issue.worklogs[0].time_spent, "8h");
        }
        let first = tracker.issue(&children[0]);
        assert!(first.worklogs[0].started.starts_with("2024-03-01T09:00:00.000"));
        assert_eq!(
            first.worklogs[0].comment.plain_text(),
            "Time tracking for 01.03.2024"
        );

        let future = tracker.issue(&children[3]);
        assert_eq!(future.status, "To Do");
        assert!(future.worklogs.is_empty());
        assert_eq!(
            report.children[3],
            ChildCompletion::FutureDate {
                key: children[3].clone(),
                date: day(6)
            }
        );
        assert_eq!(
            reporter.rendered()[..2],
            [
                format!("[01.03.2024] [{}] [updated] status: Done", children[0]),
                format!("[01.03.2024] [{}] [updated] added worklog: 8h", children[0]),
            ]
        );
        assert_eq!(
            reporter.rendered().last().cloned(),
            Some(format!("[06.03.2024] [{}] [skipped] future date", children[3]))
        );
    }

    #[tokio::test]
    async fn second_run_skips_everything_it_completed() {
        let (tracker, children) = seeded_month();
        let settings = test_settings();
        let executor = LiveExecutor::new(&tracker);
        let sync = CompletionSync::new(&tracker, &executor, &settings);

        sync.run(day(5), &mut Reporter::silent()).await.unwrap();
        let second = sync.run(day(5), &mut Reporter::silent()).await.unwrap();

        assert!(second.children.iter().all(ChildCompletion::is_skipped));
        assert_eq!(second.worklogs_added(), 0);
        for key in &children[..3] {
            assert_eq!(tracker.issue(key).worklogs.len(), 1);
        }
        assert_eq!(tracker.count_calls("add-worklog "), 3);
        assert_eq!(tracker.count_calls("transition "), 3);
    }

    #[tokio::test]
    async fn future_children_are_never_touched() {
        let (tracker, children) = seeded_month();
        let settings = test_settings();
        let executor = LiveExecutor::new(&tracker);
        let sync = CompletionSync::new(&tracker, &executor, &settings);

        for _ in 0..3 {
            sync.run(day(1), &mut Reporter::silent()).await.unwrap();
        }

        for key in &children[1..] {
            assert_eq!(tracker.count_calls(&format!("transitions {key}")), 0);
            assert_eq!(tracker.count_calls(&format!("worklogs {key}")), 0);
            assert!(tracker.issue(key).worklogs.is_empty());
        }
    }

    #[tokio::test]
    async fn malformed_summary_is_reported_and_skipped() {
        let tracker = FakeTracker::new();
        let parent = tracker.seed("Time Tracking March for Jane D", "Story", None);
        let broken = tracker.seed("not-a-date", "Sub-task", Some(parent.as_str()));
        let valid = tracker.seed("04.03.2024", "Sub-task", Some(parent.as_str()));
        let settings = test_settings();
        let executor = LiveExecutor::new(&tracker);
        let mut reporter = Reporter::silent();

        let report = CompletionSync::new(&tracker, &executor, &settings)
            .run(day(5), &mut reporter)
            .await
            .unwrap();

        assert_eq!(
            report.children[0],
            ChildCompletion::MalformedSummary {
                key: broken.clone(),
                summary: "not-a-date".to_string()
            }
        );
        assert_eq!(
            reporter.rendered()[0],
            format!(
                "[--.--.----] [{}] [skipped] could not extract date from summary: not-a-date",
                broken
            )
        );
        assert_eq!(tracker.issue(&valid).worklogs.len(), 1);
    }

    #[tokio::test]
    async fn missing_done_transition_still_logs_work() {
        let (tracker, children) = seeded_month();
        tracker.set_status(&children[0], "Done");
        let settings = test_settings();
        let executor = LiveExecutor::new(&tracker);

        let report = CompletionSync::new(&tracker, &executor, &settings)
            .run(day(1), &mut Reporter::silent())
            .await
            .unwrap();

        assert_eq!(
            report.children[0],
            ChildCompletion::Processed {
                key: children[0].clone(),
                date: day(1),
                transition: TransitionOutcome::Unavailable,
                worklog: WorklogOutcome::Added,
            }
        );
    }

    #[tokio::test]
    async fn existing_worklog_for_the_day_blocks_a_second_one() {
        let (tracker, children) = seeded_month();
        let settings = test_settings();
        let executor = LiveExecutor::new(&tracker);
        tracker
            .add_worklog(
                &children[0],
                &WorklogCreateRequest {
                    time_spent: "4h".to_string(),
                    started: worklog_started(day(1), settings.workday_start),
                    comment: Document::paragraph("manual"),
                },
            )
            .await
            .unwrap();

        let report = CompletionSync::new(&tracker, &executor, &settings)
            .run(day(1), &mut Reporter::silent())
            .await
            .unwrap();

        assert!(matches!(
            report.children[0],
            ChildCompletion::Processed {
                transition: TransitionOutcome::Applied,
                worklog: WorklogOutcome::AlreadyLogged,
                ..
            }
        ));
        assert_eq!(tracker.issue(&children[0]).worklogs.len(), 1);
    }

    #[tokio::test]
    async fn dry_run_reads_but_does_not_write() {
        let (tracker, children) = seeded_month();
        let settings = test_settings();
        let mut reporter = Reporter::silent();

        let report = CompletionSync::new(&tracker, &DryRunExecutor, &settings)
            .run(day(5), &mut reporter)
            .await
            .unwrap();

        assert_eq!(tracker.count_calls("transition "), 0);
        assert_eq!(tracker.count_calls("add-worklog "), 0);
        assert_eq!(tracker.count_calls("transitions "), 3);
        assert_eq!(tracker.count_calls("worklogs "), 3);
        assert_eq!(tracker.issue(&children[0]).status, "To Do");
        assert_eq!(reporter.count(Outcome::WouldUpdate), 6);
        assert_eq!(
            reporter.rendered()[1],
            format!("[01.03.2024] [{}] [would update] would add worklog: 8h", children[0])
        );
        assert!(report.children.iter().take(3).all(|child| matches!(
            child,
            ChildCompletion::Processed {
                transition: TransitionOutcome::WouldApply,
                worklog: WorklogOutcome::WouldAdd,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn stale_transition_is_skipped_not_fatal() {
        let (tracker, children) = seeded_month();
        tracker.set_status(&children[0], "Done");
        tracker.offer_stale_done(&children[0]);
        let settings = test_settings();
        let executor = LiveExecutor::new(&tracker);
        let mut reporter = Reporter::silent();

        let report = CompletionSync::new(&tracker, &executor, &settings)
            .run(day(1), &mut reporter)
            .await
            .unwrap();

        assert_eq!(
            report.children[0],
            ChildCompletion::Processed {
                key: children[0].clone(),
                date: day(1),
                transition: TransitionOutcome::Stale,
                worklog: WorklogOutcome::Added,
            }
        );
        assert_eq!(
            reporter.rendered()[0],
            format!("[01.03.2024] [{}] [skipped] 'Done' transition no longer available", children[0])
        );
    }

    #[tokio::test]
    async fn tracker_failure_aborts_remaining_children() {
        let (tracker, children) = seeded_month();
        tracker.fail_on(&format!("worklogs {}", children[1]));
        let settings = test_settings();
        let executor = LiveExecutor::new(&tracker);

        let result = CompletionSync::new(&tracker, &executor, &settings)
            .run(day(5), &mut Reporter::silent())
            .await;

        assert!(result.is_err());
        assert_eq!(tracker.issue(&children[0]).worklogs.len(), 1);
        assert_eq!(tracker.count_calls(&format!("transitions {}", children[2])), 0);
    }

    #[tokio::test]
    async fn rejected_transition_aborts_the_run() {
        let (tracker, children) = seeded_month();
        tracker.fail_on(&format!("transition {}", children[0]));
        let settings = test_settings();
        let executor = LiveExecutor::new(&tracker);
        let mut reporter = Reporter::silent();

        let err = CompletionSync::new(&tracker, &executor, &settings)
            .run(day(5), &mut reporter)
            .await
            .unwrap_err();

        assert!(matches!(err, JiraError::Http { .. }));
        assert!(reporter.lines().is_empty());
        assert_eq!(tracker.count_calls(&format!("worklogs {}", children[0])), 0);
    }
}
