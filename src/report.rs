//! Per-issue progress lines: `[<date>] [<key-or-status>] [<outcome>]`.

use chrono::NaiveDate;
use std::fmt;

use crate::dates::format_date;

const UNKNOWN_DATE: &str = "--.--.----";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Exists,
    WouldCreate,
    Updated,
    WouldUpdate,
    Skipped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Created => "created",
            Outcome::Exists => "exists",
            Outcome::WouldCreate => "would create",
            Outcome::Updated => "updated",
            Outcome::WouldUpdate => "would update",
            Outcome::Skipped => "skipped",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressLine {
    pub date: Option<NaiveDate>,
    pub subject: String,
    pub outcome: Outcome,
    pub detail: Option<String>,
}

impl ProgressLine {
    pub fn new(date: Option<NaiveDate>, subject: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            date,
            subject: subject.into(),
            outcome,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for ProgressLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self
            .date
            .map(format_date)
            .unwrap_or_else(|| UNKNOWN_DATE.to_string());
        write!(f, "[{}] [{}] [{}]", date, self.subject, self.outcome)?;
        if let Some(detail) = &self.detail {
            write!(f, " {}", detail)?;
        }
        Ok(())
    }
}

/// Collects progress lines of a run and optionally echoes them to stdout.
#[derive(Debug, Default)]
pub struct Reporter {
    echo: bool,
    lines: Vec<ProgressLine>,
}

impl Reporter {
    pub fn stdout() -> Self {
        Self {
            echo: true,
            lines: Vec::new(),
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, line: ProgressLine) {
        if self.echo {
            println!("{}", line);
        }
        log::debug!("progress: {}", line);
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[ProgressLine] {
        &self.lines
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.lines.iter().filter(|line| line.outcome == outcome).count()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }
}
