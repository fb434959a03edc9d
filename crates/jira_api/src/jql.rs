//! Structured issue queries rendered to JQL.

/// Conjunction of the filters the timesheet needs: project, summary text, issue type and parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueQuery {
    pub project: Option<String>,
    pub parent: Option<String>,
    pub summary_contains: Option<String>,
    pub issue_type: Option<String>,
    pub order_by_key: bool,
}

impl IssueQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(mut self, key: impl Into<String>) -> Self {
        self.project = Some(key.into());
        self
    }

    pub fn parent(mut self, key: impl Into<String>) -> Self {
        self.parent = Some(key.into());
        self
    }

    pub fn summary_contains(mut self, text: impl Into<String>) -> Self {
        self.summary_contains = Some(text.into());
        self
    }

    pub fn issue_type(mut self, name: impl Into<String>) -> Self {
        self.issue_type = Some(name.into());
        self
    }

    pub fn ordered_by_key(mut self) -> Self {
        self.order_by_key = true;
        self
    }

    pub fn to_jql(&self) -> String {
        let mut clauses = Vec::new();
        if let Some(project) = &self.project {
            clauses.push(format!("project = {}", quote(project)));
        }
        if let Some(parent) = &self.parent {
            clauses.push(format!("parent = {}", quote(parent)));
        }
        if let Some(text) = &self.summary_contains {
            clauses.push(format!("summary ~ {}", quote(text)));
        }
        if let Some(issue_type) = &self.issue_type {
            clauses.push(format!("issuetype = {}", quote(issue_type)));
        }

        let mut jql = clauses.join(" AND ");
        if self.order_by_key {
            if !jql.is_empty() {
                jql.push(' ');
            }
            jql.push_str("ORDER BY key ASC");
        }
        jql
    }
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}
