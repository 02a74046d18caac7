//! Headline counts and selector choices derived from a dataset.

use super::Dataset;
use super::hierarchy::compare_task_ids;
use crate::normalize::normalize_identifier;
use crate::types::{DateRange, Project};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// KPI counts shown above the two panes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub total_projects: usize,
    pub open_projects: usize,
}

/// Count all projects and the open ones.
pub fn kpis(projects: &[Project]) -> Kpis {
    Kpis {
        total_projects: projects.len(),
        open_projects: projects.iter().filter(|p| p.is_open()).count(),
    }
}

/// Choices offered by the project, task, status, priority and date selectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    /// Distinct normalized project ids, ascending.
    pub project_ids: Vec<String>,
    /// Distinct `"id | subject"` labels, descending by id.
    pub task_labels: Vec<String>,
    /// Distinct project statuses in first-seen order.
    pub statuses: Vec<String>,
    /// Distinct project priorities in first-seen order.
    pub priorities: Vec<String>,
    /// Earliest start to latest end, when both exist.
    pub date_bounds: Option<DateRange>,
}

pub fn filter_options(dataset: &Dataset) -> FilterOptions {
    let project_ids: BTreeSet<String> = dataset
        .projects
        .iter()
        .map(|p| p.id_clean.clone())
        .filter(|id| !id.is_empty())
        .collect();

    let mut labelled: Vec<(&str, String)> = Vec::new();
    let mut seen = HashSet::new();
    for task in &dataset.tasks {
        let label = task.label();
        if seen.insert(label.clone()) {
            labelled.push((task.id.as_str(), label));
        }
    }
    labelled.sort_by(|(a_id, a), (b_id, b)| compare_task_ids(b_id, a_id).then_with(|| a.cmp(b)));

    let start = dataset.projects.iter().filter_map(|p| p.start).min();
    let end = dataset.projects.iter().filter_map(|p| p.end).max();

    FilterOptions {
        project_ids: project_ids.into_iter().collect(),
        task_labels: labelled.into_iter().map(|(_, label)| label).collect(),
        statuses: distinct_in_order(dataset.projects.iter().map(|p| p.status.as_deref())),
        priorities: distinct_in_order(dataset.projects.iter().map(|p| p.priority.as_deref())),
        date_bounds: start.zip(end).map(|(s, e)| DateRange::new(s, e)),
    }
}

fn distinct_in_order<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .flatten()
        .map(normalize_identifier)
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Task;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset() -> Dataset {
        let mut water = Project::new("Water", Some("PRJ-1"));
        water.status = Some("Open".into());
        water.priority = Some("High".into());
        water.start = Some(date(2023, 3, 1));
        water.end = Some(date(2024, 3, 1));

        let mut roads = Project::new("Roads", Some("PRJ-2"));
        roads.status = Some("closed".into());
        roads.priority = Some("High".into());
        roads.end = Some(date(2025, 1, 1));

        let mut schools = Project::new(" Schools", Some("PRJ-3"));
        schools.status = Some("OPEN".into());

        Dataset::new(
            vec![water, roads, schools, Project::new("Roads", Some("PRJ-4"))],
            vec![
                Task::new("9", Some("PRJ-1"), None).with_subject("Survey"),
                Task::new("10", Some("PRJ-1"), Some("9")).with_subject("Drill"),
                Task::new("10", Some("PRJ-1"), Some("9")).with_subject("Drill"),
                Task::new("T-1", None, None),
            ],
        )
    }

    #[test]
    fn test_kpis_count_open_case_insensitively() {
        let k = kpis(&dataset().projects);
        assert_eq!(k.total_projects, 4);
        assert_eq!(k.open_projects, 2);
    }

    #[test]
    fn test_kpis_of_empty_dataset() {
        assert_eq!(kpis(&[]), Kpis::default());
    }

    #[test]
    fn test_filter_options() {
        let options = filter_options(&dataset());
        assert_eq!(options.project_ids, vec!["Roads", "Schools", "Water"]);
        assert_eq!(options.task_labels, vec!["T-1 | ", "10 | Drill", "9 | Survey"]);
        assert_eq!(options.statuses, vec!["Open", "closed", "OPEN"]);
        assert_eq!(options.priorities, vec!["High"]);
        assert_eq!(
            options.date_bounds,
            Some(DateRange::new(date(2023, 3, 1), date(2025, 1, 1)))
        );
    }

    #[test]
    fn test_no_date_bounds_without_both_ends() {
        let mut p = Project::new("A", Some("K"));
        p.start = Some(date(2024, 1, 1));
        let options = filter_options(&Dataset::new(vec![p], Vec::new()));
        assert!(options.date_bounds.is_none());
    }
}
