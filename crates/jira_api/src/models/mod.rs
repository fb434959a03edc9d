mod document;
mod issue;
mod project;
mod transition;
mod user;
mod worklog;

pub use document::{Document, DocumentNode};
pub use issue::{
    AccountRef, CreatedIssue, Issue, IssueCreateRequest, IssueFields, KeyRef, NameRef,
    NewIssueFields, SearchResults, StatusRef,
};
pub use project::Project;
pub use transition::{Transition, TransitionId, TransitionList, TransitionRequest};
pub use user::User;
pub use worklog::{Worklog, WorklogCreateRequest, WorklogPage};
