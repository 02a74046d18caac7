//! Dataset loading and the selection pipeline.
//!
//! A [`Dataset`] is an immutable snapshot of both exports. [`DatasetStore`]
//! holds the current snapshot behind an `ArcSwap` so the file watcher can
//! replace it while requests keep reading the old one.

pub mod filter;
pub mod hierarchy;
pub mod loader;
pub mod resolve;
pub mod stats;
pub mod view;

pub use filter::{filter_projects, filter_tasks, in_date_range, keys_of};
pub use hierarchy::{TaskGroup, TaskHierarchy, compare_task_ids, sort_tasks_desc};
pub use loader::{load_projects, load_tasks, read_text};
pub use resolve::{KeySet, clean_keys, keys_from_project, keys_from_task, resolve_keys};
pub use stats::{FilterOptions, Kpis, filter_options, kpis};
pub use view::{DashboardView, build_view};

use crate::config::DataConfig;
use crate::error::DataResult;
use crate::types::{Project, Task};
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::{info, warn};

/// Read-only snapshot of the project and task exports.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
}

impl Dataset {
    pub fn new(projects: Vec<Project>, tasks: Vec<Task>) -> Self {
        Self { projects, tasks }
    }

    /// Load both exports named in `config`.
    pub fn load(config: &DataConfig) -> DataResult<Self> {
        let projects = load_projects(&config.projects_path, config)?;
        let tasks = load_tasks(&config.tasks_path, config)?;
        Ok(Self { projects, tasks })
    }
}

/// Holder for the current dataset snapshot.
pub struct DatasetStore {
    current: ArcSwap<Dataset>,
    config: DataConfig,
}

impl DatasetStore {
    pub fn new(dataset: Dataset, config: DataConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(dataset),
            config,
        }
    }

    /// Load the initial snapshot from disk.
    pub fn load(config: DataConfig) -> DataResult<Self> {
        let dataset = Dataset::load(&config)?;
        Ok(Self::new(dataset, config))
    }

    pub fn snapshot(&self) -> Arc<Dataset> {
        self.current.load_full()
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// Re-read both exports and swap them in.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn reload(&self) -> DataResult<()> {
        match Dataset::load(&self.config) {
            Ok(dataset) => {
                info!(
                    projects = dataset.projects.len(),
                    tasks = dataset.tasks.len(),
                    "Dataset reloaded"
                );
                self.current.store(Arc::new(dataset));
                Ok(())
            }
            Err(e) => {
                warn!("Dataset reload failed: {}. Keeping current snapshot.", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_exports(dir: &TempDir, project_rows: &str) -> DataConfig {
        let projects = dir.path().join("projects.csv");
        let tasks = dir.path().join("tasks.csv");
        fs::write(&projects, format!("Project ID,Project Key,Status\n{project_rows}")).unwrap();
        fs::write(&tasks, "Task ID,Project Key,Parent Task\nT-1,PRJ-1,\n").unwrap();
        DataConfig {
            projects_path: projects,
            tasks_path: tasks,
            ..Default::default()
        }
    }

    #[test]
    fn test_store_reload_swaps_snapshot() {
        let dir = TempDir::new().unwrap();
        let config = write_exports(&dir, "Water,PRJ-1,Open\n");
        let store = DatasetStore::load(config).unwrap();
        let before = store.snapshot();
        assert_eq!(before.projects.len(), 1);

        write_exports(&dir, "Water,PRJ-1,Open\nRoads,PRJ-2,Closed\n");
        store.reload().unwrap();
        assert_eq!(store.snapshot().projects.len(), 2);
        // Readers holding the old snapshot are unaffected
        assert_eq!(before.projects.len(), 1);
    }

    #[test]
    fn test_failed_reload_keeps_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let config = write_exports(&dir, "Water,PRJ-1,Open\n");
        let store = DatasetStore::load(config.clone()).unwrap();

        fs::remove_file(&config.tasks_path).unwrap();
        assert!(store.reload().is_err());
        assert_eq!(store.snapshot().projects.len(), 1);
        assert_eq!(store.snapshot().tasks.len(), 1);
    }
}
