//! Key resolution: reconcile the project selector and the task selector into a
//! single set of linking keys.

use crate::normalize::{normalize_identifier, strip_key_prefix};
use crate::types::{Project, Task, TaskSelection};
use std::collections::BTreeSet;

/// Set of linking keys, ordered for stable output.
pub type KeySet = BTreeSet<String>;

/// Distinct keys of the projects matching `selected`, or of every project.
pub fn keys_from_project(projects: &[Project], selected: Option<&str>) -> KeySet {
    match selected {
        Some(id) => {
            let id = normalize_identifier(id);
            projects
                .iter()
                .filter(|p| p.id_clean == id)
                .filter_map(|p| p.key.clone())
                .collect()
        }
        None => all_project_keys(projects),
    }
}

/// Distinct keys of the tasks whose id matches `selected` (case-insensitive),
/// or of every task.
pub fn keys_from_task(tasks: &[Task], selected: Option<&TaskSelection>) -> KeySet {
    match selected {
        Some(selection) => {
            let id = selection.id_lower();
            tasks
                .iter()
                .filter(|t| t.id_lower() == id)
                .filter_map(|t| t.key.clone())
                .collect()
        }
        None => tasks.iter().filter_map(|t| t.key.clone()).collect(),
    }
}

/// Every distinct key that appears on a project.
pub fn all_project_keys(projects: &[Project]) -> KeySet {
    projects.iter().filter_map(|p| p.key.clone()).collect()
}

/// Resolve both selectors into one key set.
///
/// Both set: intersection. One set: that side only. Neither: all project keys.
/// Positional prefixes such as `"0:"` are removed from the result.
pub fn resolve_keys(
    projects: &[Project],
    tasks: &[Task],
    project: Option<&str>,
    task: Option<&TaskSelection>,
) -> KeySet {
    let resolved = match (project, task) {
        (Some(_), Some(_)) => {
            let from_project = keys_from_project(projects, project);
            let from_task = keys_from_task(tasks, task);
            from_project.intersection(&from_task).cloned().collect()
        }
        (Some(_), None) => keys_from_project(projects, project),
        (None, Some(_)) => keys_from_task(tasks, task),
        (None, None) => all_project_keys(projects),
    };
    clean_keys(resolved)
}

/// Strip positional prefixes and drop keys that end up empty.
pub fn clean_keys(keys: KeySet) -> KeySet {
    keys.iter()
        .map(|k| strip_key_prefix(k))
        .filter(|k| !k.is_empty())
        .collect()
}
