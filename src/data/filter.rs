//! Record filtering: apply a resolved key set and the project predicates to
//! produce the visible project and task subsets.

use super::resolve::KeySet;
use crate::normalize::normalize_identifier;
use crate::types::{DateRange, FilterState, Project, Task};

/// True when the project overlaps the range.
///
/// A project with neither date is never excluded.
pub fn in_date_range(project: &Project, range: &DateRange) -> bool {
    match (project.start, project.end) {
        (None, None) => true,
        (start, end) => {
            start.is_some_and(|d| range.contains(d)) || end.is_some_and(|d| range.contains(d))
        }
    }
}

/// Cells and selections compare in NFC, the form the selector choices use.
fn value_selected(value: Option<&str>, selected: &[String]) -> bool {
    if selected.is_empty() {
        return true;
    }
    value.is_some_and(|v| {
        let v = normalize_identifier(v);
        selected.iter().any(|s| normalize_identifier(s) == v)
    })
}

/// Projects whose key is in `keys` and that pass the status, priority and
/// date predicates of `state`.
pub fn filter_projects<'a>(
    projects: &'a [Project],
    keys: &KeySet,
    state: &FilterState,
) -> Vec<&'a Project> {
    projects
        .iter()
        .filter(|p| p.key.as_ref().is_some_and(|k| keys.contains(k)))
        .filter(|p| value_selected(p.status.as_deref(), &state.statuses))
        .filter(|p| value_selected(p.priority.as_deref(), &state.priorities))
        .filter(|p| state.date_range.is_none_or(|range| in_date_range(p, &range)))
        .collect()
}

/// Distinct keys of already-filtered projects.
pub fn keys_of(projects: &[&Project]) -> KeySet {
    projects.iter().filter_map(|p| p.key.clone()).collect()
}

/// Tasks whose key is in `keys`, narrowed by the task selector when set.
///
/// With a selector, a task survives if its id equals the selected id or its
/// parent reference contains the selected id (both case-insensitive).
/// Tasks without a key survive the key check only when
/// `state.include_standalone` is set.
pub fn filter_tasks<'a>(tasks: &'a [Task], keys: &KeySet, state: &FilterState) -> Vec<&'a Task> {
    let selected = state.task.as_ref().map(|s| s.id_lower());

    tasks
        .iter()
        .filter(|t| match &t.key {
            Some(key) => keys.contains(key),
            None => state.include_standalone,
        })
        .filter(|t| match &selected {
            Some(id) => t.id_lower() == *id || t.parent_lower().contains(id.as_str()),
            None => true,
        })
        .collect()
}
