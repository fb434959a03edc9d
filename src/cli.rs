use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "jira-timesheet")]
#[command(about = "Keeps a monthly Jira timesheet: one story per month, one sub-task per working day")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create the month's parent story and its missing daily sub-tasks
    Create {
        /// Only process the first N working days of the month
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Search without creating anything
        #[arg(
            long,
            action = ArgAction::Set,
            num_args = 0..=1,
            default_value_t = false,
            default_missing_value = "true"
        )]
        dry_run: bool,
    },

    /// Close past sub-tasks of the month and log a day of work on each
    Complete {
        /// Report what would change; pass `--dry-run false` to apply
        #[arg(
            long,
            action = ArgAction::Set,
            num_args = 0..=1,
            default_value_t = true,
            default_missing_value = "true"
        )]
        dry_run: bool,
    },

    /// Verify credentials and access to the configured project
    Check,
}

impl Command {
    pub fn is_dry_run(&self) -> bool {
        match self {
            Command::Create { dry_run, .. } | Command::Complete { dry_run } => *dry_run,
            Command::Check => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    fn parse(args: &[&str]) -> Command {
        let mut argv = vec!["jira-timesheet"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn create_defaults_to_a_live_unlimited_run() {
        assert_eq!(
            parse(&["create"]),
            Command::Create {
                limit: None,
                dry_run: false
            }
        );
    }

    #[test]
    fn create_accepts_limit_and_bare_dry_run_flag() {
        assert_eq!(
            parse(&["create", "--limit", "3", "--dry-run"]),
            Command::Create {
                limit: Some(3),
                dry_run: true
            }
        );
    }

    #[test]
    fn negative_limit_reaches_validation() {
        assert_eq!(
            parse(&["create", "--limit", "-1"]),
            Command::Create {
                limit: Some(-1),
                dry_run: false
            }
        );
    }

    #[test]
    fn complete_is_a_dry_run_unless_disabled() {
        assert!(parse(&["complete"]).is_dry_run());
        assert!(parse(&["complete", "--dry-run"]).is_dry_run());
        assert!(!parse(&["complete", "--dry-run", "false"]).is_dry_run());
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["jira-timesheet", "sync"]).is_err());
    }
}
