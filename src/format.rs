//! Output formatting utilities for markdown and JSON.

use crate::data::{DashboardView, FilterOptions, KeySet, TaskGroup};
use crate::types::{Project, Task};
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Markdown,
}

/// Placeholder for an absent cell.
pub const EMPTY_CELL: &str = "-";

/// Labelled detail lines shown for one project.
pub fn project_fields(project: &Project) -> Vec<(&'static str, String)> {
    vec![
        ("Status", cell(&project.status)),
        ("Type", cell(&project.project_type)),
        ("Start", cell(&project.expected_start)),
        ("End", cell(&project.expected_end)),
        ("Priority", cell(&project.priority)),
        ("Department", cell(&project.department)),
        ("Funding Agency", cell(&project.funding_agency)),
        ("Beneficiaries", cell(&project.beneficiary_count)),
        ("Est. Cost", cell(&project.estimated_cost)),
    ]
}

/// Labelled detail lines shown for a root or standalone task.
pub fn task_fields(task: &Task) -> Vec<(&'static str, String)> {
    vec![
        ("Task Subject", cell(&task.subject)),
        ("Project Mapping", cell(&task.project_name)),
        ("Task Owner", cell(&task.owner)),
        ("Annual Target", cell(&task.annual_target)),
        ("Task Type", cell(&task.task_type)),
        ("Task Status", cell(&task.status)),
        ("Task Priority", cell(&task.priority)),
        ("Task Outcome", cell(&task.outcome)),
        ("Means of Verification", cell(&task.verification)),
        ("Task Completed Date", cell(&task.completed_date)),
        ("Potential Risk", cell(&task.potential_risk)),
        ("Risk Mitigation Plan", cell(&task.risk_mitigation)),
        ("Expected Start Date", cell(&task.expected_start)),
        ("Expected End Date", cell(&task.expected_end)),
        ("Task Description", cell(&task.description)),
        ("Approved Budget", cell(&task.approved_budget)),
        ("Accrued Budget", cell(&task.accrued_budget)),
        ("Expected Cost", cell(&task.expected_cost)),
        ("Actual Cost", cell(&task.actual_cost)),
    ]
}

/// Short summary shown for a subtask under its root.
pub fn subtask_fields(task: &Task) -> Vec<(&'static str, String)> {
    vec![
        ("Task ID", task.id.clone()),
        ("Subject", cell(&task.subject)),
        ("Owner", cell(&task.owner)),
        ("Type", cell(&task.task_type)),
        ("Status", cell(&task.status)),
        ("Approved Budget", cell(&task.approved_budget)),
    ]
}

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| EMPTY_CELL.to_string())
}

/// Pretty JSON for any serializable result.
pub fn to_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Render a dashboard view as markdown.
pub fn format_view_markdown(view: &DashboardView<'_>) -> String {
    let mut md = String::new();

    md.push_str("# Dashboard\n\n");
    md.push_str(&format!("- **Open Projects**: {}\n", view.kpis.open_projects));
    md.push_str(&format!("- **Total Projects**: {}\n", view.kpis.total_projects));
    md.push_str(&format!("- **Resolved keys**: {}\n", key_list(&view.resolved_keys)));
    md.push_str(&format!("- **Visible project keys**: {}\n", key_list(&view.final_keys)));
    md.push('\n');

    if view.show_projects() {
        md.push_str(&format_projects_markdown(&view.projects));
    } else {
        md.push_str("_Projects view is hidden._\n\n");
    }

    if view.show_tasks() {
        md.push_str(&format_tasks_markdown(view));
    } else {
        md.push_str("_Tasks view is hidden._\n");
    }

    md
}

fn key_list(keys: &KeySet) -> String {
    if keys.is_empty() {
        return "_none_".to_string();
    }
    keys.iter().map(|k| format!("`{}`", k)).collect::<Vec<_>>().join(", ")
}

/// Format the project pane.
pub fn format_projects_markdown(projects: &[&Project]) -> String {
    let mut md = format!("## Projects ({})\n\n", projects.len());

    if projects.is_empty() {
        md.push_str("No projects found with the selected filters.\n\n");
        return md;
    }

    for project in projects {
        md.push_str(&format!("### {}\n", project.id_clean));
        if let Some(ref key) = project.key {
            md.push_str(&format!("- **Key**: `{}`\n", key));
        }
        push_fields(&mut md, &project_fields(project));
        md.push('\n');
    }

    md
}

/// Format the task pane: roots with their subtasks, then unattached
/// subtasks, then standalone tasks.
pub fn format_tasks_markdown(view: &DashboardView<'_>) -> String {
    let tasks = &view.tasks;
    let mut md = format!("## Tasks ({})\n\n", tasks.len());

    if tasks.is_empty() {
        md.push_str("No tasks found for the selected filter(s).\n");
        return md;
    }

    md.push_str(&format!(
        "Parent tasks: {} | Sub-tasks: {} | Standalone: {}\n\n",
        tasks.roots.len(),
        tasks.children.len(),
        tasks.standalone.len()
    ));

    for group in &tasks.roots {
        md.push_str(&format_group_markdown(group));
    }

    if !view.unattached.is_empty() {
        md.push_str("### Sub-tasks without a visible parent\n\n");
        for task in &view.unattached {
            md.push_str(&format_subtask_line(task));
        }
        md.push('\n');
    }

    if !tasks.standalone.is_empty() {
        md.push_str("### Standalone Tasks (No Project Mapped)\n\n");
        for task in &tasks.standalone {
            md.push_str(&format!("#### {}\n", task.label()));
            push_fields(&mut md, &task_fields(task));
            md.push('\n');
        }
    }

    md
}

fn format_group_markdown(group: &TaskGroup<'_>) -> String {
    let mut md = format!("### {}\n", group.task.label());
    push_fields(&mut md, &task_fields(group.task));

    if !group.subtasks.is_empty() {
        md.push_str("\n#### Subtasks\n");
        for child in &group.subtasks {
            md.push_str(&format_subtask_line(child));
        }
    }
    md.push('\n');
    md
}

fn format_subtask_line(task: &Task) -> String {
    let parts: Vec<String> = subtask_fields(task)
        .into_iter()
        .map(|(label, value)| format!("**{}:** {}", label, value))
        .collect();
    format!("- {}\n", parts.join(" · "))
}

fn push_fields(md: &mut String, fields: &[(&'static str, String)]) {
    for (label, value) in fields {
        md.push_str(&format!("- **{}**: {}\n", label, value));
    }
}

/// Render selector choices as markdown.
pub fn format_options_markdown(options: &FilterOptions) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Projects ({})\n\n", options.project_ids.len()));
    for id in &options.project_ids {
        md.push_str(&format!("- {}\n", id));
    }

    md.push_str(&format!("\n# Tasks ({})\n\n", options.task_labels.len()));
    for label in &options.task_labels {
        md.push_str(&format!("- {}\n", label));
    }

    md.push_str("\n# Statuses\n\n");
    md.push_str(&format_list(&options.statuses));
    md.push_str("\n# Priorities\n\n");
    md.push_str(&format_list(&options.priorities));

    md.push_str("\n# Date range\n\n");
    match options.date_bounds {
        Some(range) => md.push_str(&format!("{} to {}\n", range.start, range.end)),
        None => md.push_str("No project has both a start and an end date.\n"),
    }

    md
}

fn format_list(values: &[String]) -> String {
    if values.is_empty() {
        return "_none_\n".to_string();
    }
    values.iter().map(|v| format!("- {}\n", v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dataset, build_view, filter_options};
    use crate::types::FilterState;

    fn dataset() -> Dataset {
        let mut water = Project::new("Water", Some("PRJ-1"));
        water.status = Some("Open".into());
        water.estimated_cost = Some("1200000".into());
        Dataset::new(
            vec![water],
            vec![
                Task::new("T-100", Some("PRJ-1"), None).with_subject("Survey"),
                Task::new("T-101", Some("PRJ-1"), Some("T-100")).with_subject("Drill"),
                Task::new("T-900", None, None).with_subject("Orphan"),
            ],
        )
    }

    #[test]
    fn test_key_lines_follow_their_sets() {
        let data = dataset();
        let md = format_view_markdown(&build_view(&data, &FilterState::default()));
        assert!(md.contains("- **Resolved keys**: `PRJ-1`"));
        assert!(md.contains("- **Visible project keys**: `PRJ-1`"));

        let closed = FilterState::default().with_statuses(vec!["Closed".into()]);
        let md = format_view_markdown(&build_view(&data, &closed));
        assert!(md.contains("- **Resolved keys**: `PRJ-1`"));
        assert!(md.contains("- **Visible project keys**: _none_"));
    }

    #[test]
    fn test_view_markdown_sections() {
        let data = dataset();
        let view = build_view(&data, &FilterState::default().with_standalone(true));
        let md = format_view_markdown(&view);

        assert!(md.contains("- **Open Projects**: 1"));
        assert!(md.contains("### Water"));
        assert!(md.contains("- **Est. Cost**: 1200000"));
        assert!(md.contains("### T-100 | Survey"));
        assert!(md.contains("#### Subtasks"));
        assert!(md.contains("**Task ID:** T-101"));
        assert!(md.contains("### Standalone Tasks (No Project Mapped)"));
        assert!(md.contains("#### T-900 | Orphan"));
    }

    #[test]
    fn test_empty_and_hidden_panes() {
        let data = dataset();
        let state = FilterState {
            show_tasks: false,
            ..FilterState::default().with_project("Nowhere")
        };
        let md = format_view_markdown(&build_view(&data, &state));
        assert!(md.contains("No projects found with the selected filters."));
        assert!(md.contains("_Tasks view is hidden._"));
    }

    #[test]
    fn test_missing_cells_use_placeholder() {
        let task = Task::new("1", None, None);
        let fields = task_fields(&task);
        assert!(fields.iter().all(|(_, v)| v == EMPTY_CELL));
    }

    #[test]
    fn test_options_markdown() {
        let md = format_options_markdown(&filter_options(&dataset()));
        assert!(md.contains("# Projects (1)"));
        assert!(md.contains("- T-900 | Orphan"));
        assert!(md.contains("No project has both a start and an end date."));
    }

    #[test]
    fn test_view_json() {
        let data = dataset();
        let view = build_view(&data, &FilterState::default());
        let json = to_json(&view).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kpis"]["total_projects"], 1);
        assert_eq!(value["tasks"]["roots"][0]["task"]["id"], "T-100");
        assert_eq!(value["tasks"]["roots"][0]["subtasks"][0]["id"], "T-101");
    }
}
