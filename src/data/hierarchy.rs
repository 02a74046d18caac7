//! Grouping of visible tasks into root tasks with their subtasks, child
//! tasks, and standalone tasks.

use crate::normalize::{is_no_parent, normalize_lower};
use crate::types::Task;
use serde::Serialize;
use std::cmp::Ordering;

/// A root task and the child tasks that point at it.
#[derive(Debug, Clone, Serialize)]
pub struct TaskGroup<'a> {
    pub task: &'a Task,
    pub subtasks: Vec<&'a Task>,
}

/// Partition of a task list.
///
/// Every input task lands in exactly one of `roots` (as a group head),
/// `children` or `standalone`. Subtask lists are views into `children`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskHierarchy<'a> {
    pub roots: Vec<TaskGroup<'a>>,
    pub children: Vec<&'a Task>,
    pub standalone: Vec<&'a Task>,
}

impl<'a> TaskHierarchy<'a> {
    /// Build the hierarchy. Input order is irrelevant; every list comes out in
    /// descending task-id order.
    pub fn build(tasks: &[&'a Task]) -> Self {
        let mut sorted: Vec<&'a Task> = tasks.to_vec();
        sort_tasks_desc(&mut sorted);

        let mut root_tasks = Vec::new();
        let mut children = Vec::new();
        let mut standalone = Vec::new();

        for task in sorted {
            if task.is_standalone() {
                standalone.push(task);
            } else if is_no_parent(task.parent.as_deref()) {
                root_tasks.push(task);
            } else {
                children.push(task);
            }
        }

        let roots = root_tasks
            .into_iter()
            .map(|task| {
                let root_id = normalize_lower(&task.id);
                let subtasks = children
                    .iter()
                    .copied()
                    .filter(|child| child.parent_lower() == root_id)
                    .collect();
                TaskGroup { task, subtasks }
            })
            .collect();

        Self {
            roots,
            children,
            standalone,
        }
    }

    /// Child tasks whose parent is not among the visible roots.
    pub fn unattached(&self) -> Vec<&'a Task> {
        self.children
            .iter()
            .copied()
            .filter(|child| {
                let parent = child.parent_lower();
                !self
                    .roots
                    .iter()
                    .any(|group| normalize_lower(&group.task.id) == parent)
            })
            .collect()
    }

    /// Total number of tasks in the partition.
    pub fn len(&self) -> usize {
        self.roots.len() + self.children.len() + self.standalone.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sort key for task ids: numeric ids compare numerically, everything else
/// lexically, and numeric ids sort below text ids.
#[derive(Debug, PartialEq)]
enum IdKey<'s> {
    Number(f64),
    Text(&'s str),
}

impl<'s> IdKey<'s> {
    fn of(id: &'s str) -> Self {
        let id = id.trim();
        match id.parse::<f64>() {
            Ok(n) if n.is_finite() => IdKey::Number(n),
            _ => IdKey::Text(id),
        }
    }
}

/// Ascending comparison of two task ids.
pub fn compare_task_ids(a: &str, b: &str) -> Ordering {
    match (IdKey::of(a), IdKey::of(b)) {
        (IdKey::Number(x), IdKey::Number(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (IdKey::Number(_), IdKey::Text(_)) => Ordering::Less,
        (IdKey::Text(_), IdKey::Number(_)) => Ordering::Greater,
        (IdKey::Text(x), IdKey::Text(y)) => x.cmp(y),
    }
}

/// Sort tasks in descending id order (most recent first).
pub fn sort_tasks_desc(tasks: &mut [&Task]) {
    tasks.sort_by(|a, b| compare_task_ids(&b.id, &a.id));
}
