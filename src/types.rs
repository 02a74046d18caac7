//! Core types for the projects and tasks dashboard.

use crate::normalize::{normalize_identifier, normalize_lower};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the project export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Identifier as it appears in the export.
    pub id: String,
    /// NFC + trimmed identifier used for joins and ordering.
    pub id_clean: String,
    /// Linking key shared with tasks.
    pub key: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub project_type: Option<String>,
    pub department: Option<String>,
    pub funding_agency: Option<String>,
    pub beneficiary_count: Option<String>,
    pub estimated_cost: Option<String>,
    /// Raw date text, kept for display.
    pub expected_start: Option<String>,
    pub expected_end: Option<String>,
    /// Parsed dates; `None` when absent or unparseable.
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Project {
    /// Minimal project, mostly for tests and fixtures.
    pub fn new(id: &str, key: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            id_clean: normalize_identifier(id),
            key: key.map(normalize_identifier).filter(|k| !k.is_empty()),
            ..Default::default()
        }
    }

    /// True when the status reads "open", ignoring case.
    pub fn is_open(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case("open"))
    }
}

/// One row of the task export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub subject: Option<String>,
    /// Description with markup removed.
    pub description: Option<String>,
    pub owner: Option<String>,
    pub task_type: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub outcome: Option<String>,
    pub verification: Option<String>,
    pub completed_date: Option<String>,
    pub potential_risk: Option<String>,
    pub risk_mitigation: Option<String>,
    pub expected_start: Option<String>,
    pub expected_end: Option<String>,
    pub approved_budget: Option<String>,
    pub accrued_budget: Option<String>,
    pub expected_cost: Option<String>,
    pub actual_cost: Option<String>,
    pub annual_target: Option<String>,
    pub project_name: Option<String>,
    /// Linking key to the owning project; `None` for standalone tasks.
    pub key: Option<String>,
    /// Raw parent reference.
    pub parent: Option<String>,
}

impl Task {
    /// Minimal task, mostly for tests and fixtures.
    pub fn new(id: &str, key: Option<&str>, parent: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            key: key.map(normalize_identifier).filter(|k| !k.is_empty()),
            parent: parent.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.trim().to_string());
        self
    }

    /// Selector label in the `"id | subject"` form.
    pub fn label(&self) -> String {
        format!("{} | {}", self.id, self.subject.as_deref().unwrap_or(""))
    }

    /// Trimmed, lowercased identifier.
    pub fn id_lower(&self) -> String {
        normalize_lower(&self.id)
    }

    /// Trimmed, lowercased parent reference (empty when absent).
    pub fn parent_lower(&self) -> String {
        self.parent.as_deref().map(normalize_lower).unwrap_or_default()
    }

    pub fn is_standalone(&self) -> bool {
        self.key.is_none()
    }
}

/// The task chosen in the task selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSelection {
    /// Trimmed identifier as entered.
    pub id: String,
}

impl TaskSelection {
    /// Parse a selector value. Accepts `"id | subject"` or a bare id.
    ///
    /// Returns `None` when the id part is empty.
    pub fn parse(value: &str) -> Option<Self> {
        let id = value.split(" | ").next().unwrap_or("").trim();
        if id.is_empty() {
            None
        } else {
            Some(Self { id: id.to_string() })
        }
    }

    /// Lowercased id used for case-insensitive matching.
    pub fn id_lower(&self) -> String {
        normalize_lower(&self.id)
    }
}

/// Inclusive date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the bounds if they are inverted.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Complete selection state for one dashboard render.
///
/// Passed by reference into the pure pipeline in [`crate::data::view`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Normalized project identifier, or `None` for all projects.
    pub project: Option<String>,
    pub task: Option<TaskSelection>,
    /// Accepted project statuses; empty means no status filter.
    pub statuses: Vec<String>,
    /// Accepted project priorities; empty means no priority filter.
    pub priorities: Vec<String>,
    pub date_range: Option<DateRange>,
    pub show_projects: bool,
    pub show_tasks: bool,
    /// Keep tasks without a linking key in the task view.
    pub include_standalone: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            project: None,
            task: None,
            statuses: Vec::new(),
            priorities: Vec::new(),
            date_range: None,
            show_projects: true,
            show_tasks: true,
            include_standalone: false,
        }
    }
}

impl FilterState {
    pub fn with_project(mut self, project: &str) -> Self {
        let project = normalize_identifier(project);
        self.project = (!project.is_empty()).then_some(project);
        self
    }

    pub fn with_task(mut self, selector: &str) -> Self {
        self.task = TaskSelection::parse(selector);
        self
    }

    pub fn with_statuses(mut self, statuses: Vec<String>) -> Self {
        self.statuses = statuses;
        self
    }

    pub fn with_priorities(mut self, priorities: Vec<String>) -> Self {
        self.priorities = priorities;
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_standalone(mut self, include: bool) -> Self {
        self.include_standalone = include;
        self
    }
}
