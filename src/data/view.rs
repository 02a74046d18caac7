//! The selection pipeline: resolve keys, filter projects, narrow keys,
//! filter tasks, group tasks.

use super::Dataset;
use super::filter::{filter_projects, filter_tasks, keys_of};
use super::hierarchy::TaskHierarchy;
use super::resolve::{KeySet, resolve_keys};
use super::stats::{Kpis, kpis};
use crate::types::{FilterState, Project, Task};
use serde::Serialize;
use tracing::debug;

/// Everything the two panes need for one selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView<'a> {
    pub filter: FilterState,
    /// Computed over the whole dataset, not the selection.
    pub kpis: Kpis,
    /// Keys after selector resolution.
    pub resolved_keys: KeySet,
    /// Keys of the projects that survived the project predicates.
    pub final_keys: KeySet,
    /// Visible projects, ascending by normalized id.
    pub projects: Vec<&'a Project>,
    pub tasks: TaskHierarchy<'a>,
    pub unattached: Vec<&'a Task>,
}

impl DashboardView<'_> {
    pub fn visible_task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn show_projects(&self) -> bool {
        self.filter.show_projects
    }

    pub fn show_tasks(&self) -> bool {
        self.filter.show_tasks
    }
}

/// Run the full pipeline for one selection.
pub fn build_view<'a>(dataset: &'a Dataset, state: &FilterState) -> DashboardView<'a> {
    let resolved_keys = resolve_keys(
        &dataset.projects,
        &dataset.tasks,
        state.project.as_deref(),
        state.task.as_ref(),
    );

    let mut projects = filter_projects(&dataset.projects, &resolved_keys, state);
    projects.sort_by(|a, b| a.id_clean.cmp(&b.id_clean));

    let final_keys = keys_of(&projects);
    let tasks = filter_tasks(&dataset.tasks, &final_keys, state);
    let hierarchy = TaskHierarchy::build(&tasks);
    let unattached = hierarchy.unattached();

    debug!(
        resolved = resolved_keys.len(),
        final_keys = final_keys.len(),
        projects = projects.len(),
        tasks = hierarchy.len(),
        "Built dashboard view"
    );

    DashboardView {
        filter: state.clone(),
        kpis: kpis(&dataset.projects),
        resolved_keys,
        final_keys,
        projects,
        tasks: hierarchy,
        unattached,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        let mut water = Project::new("Water", Some("PRJ-1"));
        water.status = Some("Open".into());
        let mut roads = Project::new("Roads", Some("PRJ-2"));
        roads.status = Some("Closed".into());

        Dataset::new(
            vec![water, roads],
            vec![
                Task::new("T-100", Some("PRJ-1"), Some("")).with_subject("Survey"),
                Task::new("T-101", Some("PRJ-1"), Some("T-100")).with_subject("Drill"),
                Task::new("T-200", Some("PRJ-2"), None).with_subject("Grade"),
                Task::new("T-300", None, Some("T-100")).with_subject("Loose"),
            ],
        )
    }

    fn project_ids(projects: &[&Project]) -> Vec<String> {
        projects.iter().map(|p| p.id.clone()).collect()
    }

    fn task_ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_empty_selection_shows_everything_linked() {
        let data = dataset();
        let view = build_view(&data, &FilterState::default());
        assert_eq!(project_ids(&view.projects), vec!["Roads", "Water"]);
        assert_eq!(view.visible_task_count(), 3);
        assert!(view.tasks.standalone.is_empty());
        assert_eq!(view.kpis.open_projects, 1);
    }

    #[test]
    fn test_task_selection_example() {
        let data = dataset();
        let state = FilterState::default().with_task("T-100 | Survey");
        let view = build_view(&data, &state);

        assert!(view.resolved_keys.contains("PRJ-1"));
        assert_eq!(view.tasks.roots.len(), 1);
        assert_eq!(view.tasks.roots[0].task.id, "T-100");
        assert_eq!(task_ids(&view.tasks.roots[0].subtasks), vec!["T-101"]);
        assert!(view.unattached.is_empty());
    }

    #[test]
    fn test_status_filter_narrows_tasks() {
        let data = dataset();
        let state = FilterState::default().with_statuses(vec!["Closed".into()]);
        let view = build_view(&data, &state);

        assert_eq!(view.resolved_keys.len(), 2);
        assert_eq!(view.final_keys.len(), 1);
        assert_eq!(view.tasks.roots.len(), 1);
        assert_eq!(view.tasks.roots[0].task.id, "T-200");
        // KPIs ignore the selection
        assert_eq!(view.kpis.total_projects, 2);
    }

    #[test]
    fn test_standalone_opt_in() {
        let data = dataset();
        let view = build_view(&data, &FilterState::default().with_standalone(true));
        assert_eq!(task_ids(&view.tasks.standalone), vec!["T-300"]);
    }

    #[test]
    fn test_disjoint_selection_is_empty_not_error() {
        let data = dataset();
        let state = FilterState::default()
            .with_project("Roads")
            .with_task("T-100");
        let view = build_view(&data, &state);
        assert!(view.resolved_keys.is_empty());
        assert!(view.projects.is_empty());
        assert!(view.tasks.is_empty());
    }

    #[test]
    fn test_selecting_child_shows_it_unattached() {
        let data = dataset();
        let view = build_view(&data, &FilterState::default().with_task("T-101"));
        assert!(view.tasks.roots.is_empty());
        assert_eq!(task_ids(&view.unattached), vec!["T-101"]);
    }
}
