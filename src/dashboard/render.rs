//! HTML fragment builders for the dashboard panes.

use super::query::{ALL, to_query};
use super::templates;
use crate::data::{DashboardView, FilterOptions, Kpis, TaskGroup};
use crate::format::{project_fields, subtask_fields, task_fields};
use crate::types::{FilterState, Project, Task};
use chrono::NaiveDate;
use regex_lite::{Captures, Regex};
use std::sync::LazyLock;

static SLOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid slot pattern"));

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Full page: sidebar plus both panes.
///
/// Slots are filled in a single pass, so rendered data is never rescanned
/// for slot markers.
pub fn render_page(view: &DashboardView<'_>, options: &FilterOptions) -> String {
    SLOT_RE
        .replace_all(templates::INDEX_TEMPLATE, |caps: &Captures<'_>| match &caps[1] {
            "version" => env!("CARGO_PKG_VERSION").to_string(),
            "sidebar" => render_filters(options, &view.filter),
            "selection" => render_selection(view),
            "kpis" => render_kpis(&view.kpis),
            "projects_pane" => render_projects(view),
            "tasks_pane" => render_tasks(view),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

/// Sidebar summary: resolved keys, matching task count when a task is
/// selected, and a link that reproduces the selection.
pub fn render_selection(view: &DashboardView<'_>) -> String {
    let keys = if view.resolved_keys.is_empty() {
        r#"<span class="muted">none</span>"#.to_string()
    } else {
        view.resolved_keys
            .iter()
            .map(|k| format!("<code>{}</code>", html_escape(k)))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut html = format!("<div class=\"selection-keys\">Project keys: {}</div>\n", keys);
    if view.filter.task.is_some() {
        html.push_str(&format!(
            "<div class=\"selection-count\">Filtered tasks: {}</div>\n",
            view.visible_task_count()
        ));
    }
    html.push_str(&format!(
        "<a class=\"permalink\" href=\"/?{}\">Link to this view</a>",
        html_escape(&to_query(&view.filter))
    ));
    html
}

pub fn render_kpis(kpis: &Kpis) -> String {
    format!(
        r#"<div class="grid grid-stats">
    <div class="card stat">
        <div class="stat-value">{}</div>
        <div class="stat-label">Open Projects</div>
    </div>
    <div class="card stat">
        <div class="stat-value">{}</div>
        <div class="stat-label">Total Projects</div>
    </div>
</div>"#,
        kpis.open_projects, kpis.total_projects
    )
}

/// Project pane: one expander per visible project.
pub fn render_projects(view: &DashboardView<'_>) -> String {
    if !view.show_projects() {
        return r#"<div class="empty-state">Projects view is hidden. Enable it from the sidebar.</div>"#
            .to_string();
    }

    let mut html = format!("<h2>Projects ({})</h2>\n", view.projects.len());
    if view.projects.is_empty() {
        html.push_str(r#"<div class="empty-state">No projects found with the selected filters.</div>"#);
        return html;
    }

    for project in &view.projects {
        html.push_str(&render_project(project));
    }
    html
}

fn render_project(project: &Project) -> String {
    let fields = project_fields(project);
    let (left, right) = fields.split_at(fields.len().min(5));
    format!(
        r#"<details class="card expander">
    <summary>{}</summary>
    <div class="columns">
        {}
        {}
    </div>
</details>
"#,
        html_escape(&project.id_clean),
        render_field_list(left),
        render_field_list(right)
    )
}

/// Task pane: roots with subtasks, unattached subtasks, standalone tasks.
pub fn render_tasks(view: &DashboardView<'_>) -> String {
    if !view.show_tasks() {
        return r#"<div class="empty-state">Tasks view is hidden. Enable it from the sidebar.</div>"#
            .to_string();
    }

    let tasks = &view.tasks;
    let mut html = format!("<h2>Tasks ({})</h2>\n", tasks.len());
    if tasks.is_empty() {
        html.push_str(r#"<div class="empty-state">No tasks found for the selected filter(s).</div>"#);
        return html;
    }

    html.push_str(&format!(
        r#"<div class="task-counts">Parent tasks: {} &middot; Sub-tasks: {} &middot; Standalone: {}</div>
"#,
        tasks.roots.len(),
        tasks.children.len(),
        tasks.standalone.len()
    ));

    for group in &tasks.roots {
        html.push_str(&render_group(group));
    }

    if !view.unattached.is_empty() {
        html.push_str("<h3>Sub-tasks without a visible parent</h3>\n<ul class=\"subtasks\">\n");
        for task in &view.unattached {
            html.push_str(&render_subtask(task));
        }
        html.push_str("</ul>\n");
    }

    if !tasks.standalone.is_empty() {
        html.push_str("<h3>Standalone Tasks (No Project Mapped)</h3>\n");
        for task in &tasks.standalone {
            html.push_str(&render_task_expander(task, ""));
        }
    }

    html
}

fn render_group(group: &TaskGroup<'_>) -> String {
    let subtasks = if group.subtasks.is_empty() {
        String::new()
    } else {
        let items: String = group.subtasks.iter().map(|t| render_subtask(t)).collect();
        format!("<h4>Subtasks</h4>\n<ul class=\"subtasks\">\n{}</ul>\n", items)
    };
    render_task_expander(group.task, &subtasks)
}

fn render_task_expander(task: &Task, extra: &str) -> String {
    format!(
        r#"<details class="card expander">
    <summary>{}</summary>
    {}
    {}
</details>
"#,
        html_escape(&task.label()),
        render_field_list(&task_fields(task)),
        extra
    )
}

fn render_subtask(task: &Task) -> String {
    let parts: Vec<String> = subtask_fields(task)
        .iter()
        .map(|(label, value)| format!("<strong>{}:</strong> {}", label, html_escape(value)))
        .collect();
    format!("<li>{}</li>\n", parts.join("<br>"))
}

fn render_field_list(fields: &[(&'static str, String)]) -> String {
    let rows: String = fields
        .iter()
        .map(|(label, value)| format!("<dt>{}</dt><dd>{}</dd>", label, html_escape(value)))
        .collect();
    format!("<dl class=\"fields\">{}</dl>", rows)
}

/// Sidebar form with every selector pre-filled from `state`.
pub fn render_filters(options: &FilterOptions, state: &FilterState) -> String {
    let project_choices = select_options(
        options.project_ids.iter().map(|id| (id.as_str(), id.as_str())),
        |value| state.project.as_deref() == Some(value),
    );
    let task_choices = select_options(
        options
            .task_labels
            .iter()
            .map(|label| (label_id(label), label.as_str())),
        |value| {
            state
                .task
                .as_ref()
                .is_some_and(|t| t.id_lower() == value.trim().to_lowercase())
        },
    );

    let (from, to) = match state.date_range {
        Some(range) => (date_value(range.start), date_value(range.end)),
        None => (String::new(), String::new()),
    };
    let (min, max) = match options.date_bounds {
        Some(range) => (range.start.to_string(), range.end.to_string()),
        None => (String::new(), String::new()),
    };

    format!(
        r#"<form id="filters" method="get" action="/">
    <input type="hidden" name="submitted" value="1">
    <label>Project
        <select name="project">
            <option value="{all}">{all}</option>
            {project_choices}
        </select>
    </label>
    <label>Task
        <select name="task">
            <option value="{all}">{all}</option>
            {task_choices}
        </select>
    </label>
    <fieldset><legend>Project Status</legend>{statuses}</fieldset>
    <fieldset><legend>Project Priority</legend>{priorities}</fieldset>
    <fieldset><legend>Date Range</legend>
        <input type="date" name="from" value="{from}" min="{min}" max="{max}">
        <input type="date" name="to" value="{to}" min="{min}" max="{max}">
    </fieldset>
    {show_projects}
    {show_tasks}
    {standalone}
    <div class="actions">
        <button type="submit">Apply</button>
        <a href="/">Reset</a>
    </div>
</form>"#,
        all = ALL,
        project_choices = project_choices,
        task_choices = task_choices,
        statuses = checkbox_group("status", &options.statuses, &state.statuses),
        priorities = checkbox_group("priority", &options.priorities, &state.priorities),
        from = from,
        to = to,
        min = min,
        max = max,
        show_projects = checkbox("show_projects", "Show Projects", state.show_projects),
        show_tasks = checkbox("show_tasks", "Show Tasks", state.show_tasks),
        standalone = checkbox("standalone", "Include standalone tasks", state.include_standalone),
    )
}

fn label_id(label: &str) -> &str {
    label.split(" | ").next().unwrap_or(label)
}

fn date_value(date: NaiveDate) -> String {
    if date == NaiveDate::MIN || date == NaiveDate::MAX {
        String::new()
    } else {
        date.to_string()
    }
}

fn select_options<'s>(
    choices: impl Iterator<Item = (&'s str, &'s str)>,
    is_selected: impl Fn(&str) -> bool,
) -> String {
    choices
        .map(|(value, text)| {
            let selected = if is_selected(value) { " selected" } else { "" };
            format!(
                "<option value=\"{}\"{}>{}</option>",
                html_escape(value),
                selected,
                html_escape(text)
            )
        })
        .collect::<Vec<_>>()
        .join("\n            ")
}

fn checkbox_group(name: &str, choices: &[String], selected: &[String]) -> String {
    if choices.is_empty() {
        return r#"<span class="muted">none</span>"#.to_string();
    }
    choices
        .iter()
        .map(|choice| {
            let checked = if selected.contains(choice) { " checked" } else { "" };
            format!(
                "<label class=\"check\"><input type=\"checkbox\" name=\"{}\" value=\"{}\"{}> {}</label>",
                name,
                html_escape(choice),
                checked,
                html_escape(choice)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn checkbox(name: &str, text: &str, on: bool) -> String {
    format!(
        "<label class=\"check\"><input type=\"checkbox\" name=\"{}\"{}> {}</label>",
        name,
        if on { " checked" } else { "" },
        text
    )
}
