//! View subcommand: print the filtered dashboard without starting a server.

use super::FormatArg;
use crate::config::DisplayConfig;
use crate::normalize::{DATE_NOT_RECORDED, parse_date_tolerant};
use crate::types::{DateRange, FilterState};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the view subcommand
#[derive(Args, Debug, Default)]
pub struct ViewArgs {
    /// Select a project by id
    #[arg(long, value_name = "ID")]
    pub project: Option<String>,

    /// Select a task, as a bare id or an "id | subject" label
    #[arg(long, value_name = "TASK")]
    pub task: Option<String>,

    /// Keep projects with this status (repeatable)
    #[arg(long = "status", value_name = "STATUS")]
    pub statuses: Vec<String>,

    /// Keep projects with this priority (repeatable)
    #[arg(long = "priority", value_name = "PRIORITY")]
    pub priorities: Vec<String>,

    /// Start of the date range (inclusive)
    #[arg(long, value_name = "DATE", value_parser = parse_cli_date)]
    pub from: Option<NaiveDate>,

    /// End of the date range (inclusive)
    #[arg(long, value_name = "DATE", value_parser = parse_cli_date)]
    pub to: Option<NaiveDate>,

    /// Leave the project pane out
    #[arg(long)]
    pub hide_projects: bool,

    /// Leave the task pane out
    #[arg(long)]
    pub hide_tasks: bool,

    /// Include tasks without a project key
    #[arg(long)]
    pub standalone: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Markdown)]
    pub format: FormatArg,

    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl ViewArgs {
    /// Selection state described by the flags, on top of the configured
    /// display defaults.
    pub fn to_filter(&self, display: &DisplayConfig) -> FilterState {
        let mut state = display.initial_filter();

        if let Some(ref project) = self.project {
            state = state.with_project(project);
        }
        if let Some(ref task) = self.task {
            state = state.with_task(task);
        }
        state.statuses = self.statuses.clone();
        state.priorities = self.priorities.clone();
        state.date_range = match (self.from, self.to) {
            (None, None) => None,
            (from, to) => Some(DateRange::new(
                from.unwrap_or(NaiveDate::MIN),
                to.unwrap_or(NaiveDate::MAX),
            )),
        };
        state.show_projects &= !self.hide_projects;
        state.show_tasks &= !self.hide_tasks;
        state.include_standalone |= self.standalone;

        state
    }
}

/// Parse a date flag using the same formats the exports accept.
pub fn parse_cli_date(value: &str) -> Result<NaiveDate, String> {
    parse_date_tolerant(value, DATE_NOT_RECORDED)
        .ok_or_else(|| format!("unrecognised date '{}', expected e.g. 2024-03-31", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_flags_to_filter() {
        let args = ViewArgs {
            project: Some(" Water ".into()),
            task: Some("T-100 | Survey".into()),
            statuses: vec!["Open".into(), "On Hold".into()],
            from: Some(date(2024, 1, 1)),
            hide_tasks: true,
            standalone: true,
            ..Default::default()
        };
        let state = args.to_filter(&DisplayConfig::default());

        assert_eq!(state.project.as_deref(), Some("Water"));
        assert_eq!(state.task.unwrap().id, "T-100");
        assert_eq!(state.statuses.len(), 2);
        assert_eq!(state.date_range.unwrap().start, date(2024, 1, 1));
        assert_eq!(state.date_range.unwrap().end, NaiveDate::MAX);
        assert!(state.show_projects);
        assert!(!state.show_tasks);
        assert!(state.include_standalone);
    }

    #[test]
    fn test_no_flags_is_default_selection() {
        let state = ViewArgs::default().to_filter(&DisplayConfig::default());
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn test_parse_cli_date() {
        assert_eq!(parse_cli_date("2024-03-31"), Ok(date(2024, 3, 31)));
        assert!(parse_cli_date("someday").is_err());
    }
}
