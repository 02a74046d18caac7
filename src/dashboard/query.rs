//! Selection state carried in the request query string.
//!
//! The sidebar is a plain GET form, so every control maps to a query key:
//! `project`, `task`, `status` (repeatable), `priority` (repeatable), `from`,
//! `to`, and the checkboxes `show_projects`, `show_tasks`, `standalone`.
//! Browsers omit unchecked checkboxes, so the form also sends a hidden
//! `submitted` field; when it is present a missing checkbox means "off".

use crate::config::DisplayConfig;
use crate::types::{DateRange, FilterState};
use chrono::NaiveDate;

/// Selector value meaning "no selection".
pub const ALL: &str = "All";

/// Raw sidebar parameters parsed from a query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParams {
    pub project: Option<String>,
    pub task: Option<String>,
    pub statuses: Vec<String>,
    pub priorities: Vec<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub show_projects: Option<bool>,
    pub show_tasks: Option<bool>,
    pub standalone: Option<bool>,
    pub submitted: bool,
}

impl FilterParams {
    /// Fold decoded query pairs, as produced by `Query<Vec<(String, String)>>`.
    ///
    /// Unknown keys are ignored. Repeated `status` and `priority` keys
    /// accumulate; for all other keys the last value wins.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = Self::default();

        for (key, value) in pairs {
            match key.as_str() {
                "project" => params.project = Some(value),
                "task" => params.task = Some(value),
                "status" => push_value(&mut params.statuses, value),
                "priority" => push_value(&mut params.priorities, value),
                "from" => params.from = Some(value),
                "to" => params.to = Some(value),
                "show_projects" => params.show_projects = Some(checkbox_on(&value)),
                "show_tasks" => params.show_tasks = Some(checkbox_on(&value)),
                "standalone" => params.standalone = Some(checkbox_on(&value)),
                "submitted" => params.submitted = true,
                _ => {}
            }
        }

        params
    }

    /// Build the selection state, starting from the configured toggles.
    pub fn into_filter(self, display: &DisplayConfig) -> FilterState {
        let mut state = display.initial_filter();

        if let Some(project) = self.project.as_deref().and_then(selected) {
            state = state.with_project(project);
        }
        if let Some(task) = self.task.as_deref().and_then(selected) {
            state = state.with_task(task);
        }
        state.statuses = self.statuses;
        state.priorities = self.priorities;
        state.date_range = date_range(self.from.as_deref(), self.to.as_deref());

        let toggle = |value: Option<bool>, default: bool| match value {
            Some(v) => v,
            None if self.submitted => false,
            None => default,
        };
        state.show_projects = toggle(self.show_projects, state.show_projects);
        state.show_tasks = toggle(self.show_tasks, state.show_tasks);
        state.include_standalone = toggle(self.standalone, state.include_standalone);

        state
    }
}

/// Serialize a selection back into a query string.
pub fn to_query(state: &FilterState) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::new();

    if let Some(ref project) = state.project {
        pairs.push(("project", project.clone()));
    }
    if let Some(ref task) = state.task {
        pairs.push(("task", task.id.clone()));
    }
    for status in &state.statuses {
        pairs.push(("status", status.clone()));
    }
    for priority in &state.priorities {
        pairs.push(("priority", priority.clone()));
    }
    if let Some(range) = state.date_range {
        if range.start != NaiveDate::MIN {
            pairs.push(("from", range.start.to_string()));
        }
        if range.end != NaiveDate::MAX {
            pairs.push(("to", range.end.to_string()));
        }
    }
    pairs.push(("submitted", "1".to_string()));
    for (key, on) in [
        ("show_projects", state.show_projects),
        ("show_tasks", state.show_tasks),
        ("standalone", state.include_standalone),
    ] {
        if on {
            pairs.push((key, "on".to_string()));
        }
    }

    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(&v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn push_value(values: &mut Vec<String>, value: String) {
    let value = value.trim().to_string();
    if !value.is_empty() && !values.contains(&value) {
        values.push(value);
    }
}

fn checkbox_on(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "on" | "true" | "1" | "yes" | ""
    )
}

fn selected(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() || value == ALL {
        None
    } else {
        Some(value)
    }
}

fn parse_day(value: Option<&str>) -> Option<NaiveDate> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
}

/// Either bound may be missing; an open side extends to the calendar limit.
fn date_range(from: Option<&str>, to: Option<&str>) -> Option<DateRange> {
    match (parse_day(from), parse_day(to)) {
        (None, None) => None,
        (start, end) => Some(DateRange::new(
            start.unwrap_or(NaiveDate::MIN),
            end.unwrap_or(NaiveDate::MAX),
        )),
    }
}
