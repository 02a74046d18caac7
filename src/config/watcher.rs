//! File watcher for the project and task exports.
//!
//! Watches the directories holding the two data files and emits a reload
//! event through a tokio watch channel when either file changes. Rapid writes
//! (editors, export tools writing in chunks) are coalesced by the debouncer.

use notify_debouncer_mini::{DebouncedEvent, DebouncedEventKind, new_debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Event emitted when a data file changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataChangeEvent {
    /// The project export changed.
    Projects(PathBuf),
    /// The task export changed.
    Tasks(PathBuf),
    /// Both exports changed in the same debounce window.
    Both,
    /// Watcher encountered an error
    Error(String),
}

impl DataChangeEvent {
    /// Returns true if this event requires a dataset reload.
    pub fn requires_reload(&self) -> bool {
        !matches!(self, DataChangeEvent::Error(_))
    }
}

/// Files to watch.
#[derive(Debug, Clone)]
pub struct WatchPaths {
    pub projects: PathBuf,
    pub tasks: PathBuf,
}

impl WatchPaths {
    /// Directories that must be registered with the OS watcher.
    ///
    /// Watching the parent directory catches editors that replace the file
    /// via rename.
    fn directories(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = [&self.projects, &self.tasks]
            .into_iter()
            .map(|p| parent_dir(p))
            .collect();
        dirs.sort();
        dirs.dedup();
        dirs
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Handle to control the data watcher.
///
/// The blocking watcher task owns the debouncer. Dropping the handle drops
/// `events`; the task then exits at the next change it tries to report.
pub struct DataWatcherHandle {
    /// Receiver for change events.
    pub events: watch::Receiver<Option<DataChangeEvent>>,
    _task_handle: tokio::task::JoinHandle<()>,
}

impl DataWatcherHandle {
    /// Wait for the next change event. Returns `None` once the watcher stops.
    pub async fn wait_for_change(&mut self) -> Option<DataChangeEvent> {
        loop {
            if self.events.changed().await.is_err() {
                return None;
            }
            let event = self.events.borrow().clone();
            if event.is_some() {
                return event;
            }
        }
    }
}

/// Start watching the data files.
///
/// Must be called from within a tokio runtime.
pub fn start_data_watcher(
    paths: WatchPaths,
    debounce: Duration,
) -> Result<DataWatcherHandle, notify::Error> {
    let (event_tx, event_rx) = watch::channel(None);
    let (notify_tx, notify_rx) = mpsc::channel();

    let mut debouncer = new_debouncer(debounce, notify_tx)?;
    let watcher = debouncer.watcher();

    for dir in paths.directories() {
        if dir.exists() {
            info!("Watching data directory: {}", dir.display());
            watcher.watch(&dir, notify::RecursiveMode::NonRecursive)?;
        } else {
            warn!("Data directory does not exist, skipping watch: {}", dir.display());
        }
    }

    let task_handle = tokio::task::spawn_blocking(move || {
        // Keep the debouncer alive for the lifetime of the task
        let _debouncer = debouncer;
        process_notify_events(notify_rx, event_tx, &paths);
    });

    Ok(DataWatcherHandle {
        events: event_rx,
        _task_handle: task_handle,
    })
}

fn process_notify_events(
    rx: mpsc::Receiver<Result<Vec<DebouncedEvent>, notify::Error>>,
    tx: watch::Sender<Option<DataChangeEvent>>,
    paths: &WatchPaths,
) {
    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                if let Some(event) = classify_events(events, paths) {
                    debug!("Data change detected: {:?}", event);
                    if tx.send(Some(event)).is_err() {
                        info!("Data watcher receiver dropped, stopping");
                        return;
                    }
                }
            }
            Ok(Err(e)) => {
                error!("File watcher error: {}", e);
                let _ = tx.send(Some(DataChangeEvent::Error(e.to_string())));
            }
            Err(_) => {
                info!("Data watcher channel closed, stopping");
                return;
            }
        }
    }
}

/// Fold one debounce batch into at most one event.
fn classify_events(events: Vec<DebouncedEvent>, paths: &WatchPaths) -> Option<DataChangeEvent> {
    let mut projects = None;
    let mut tasks = None;

    for event in events {
        if !matches!(
            event.kind,
            DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
        ) {
            continue;
        }
        match classify_path(&event.path, paths) {
            Some(DataChangeEvent::Projects(p)) => projects = Some(p),
            Some(DataChangeEvent::Tasks(p)) => tasks = Some(p),
            _ => {}
        }
    }

    match (projects, tasks) {
        (Some(_), Some(_)) => Some(DataChangeEvent::Both),
        (Some(p), None) => Some(DataChangeEvent::Projects(p)),
        (None, Some(t)) => Some(DataChangeEvent::Tasks(t)),
        (None, None) => None,
    }
}

/// Match a changed path against the watched files.
///
/// Events carry absolute paths while configured paths may be relative, so the
/// comparison uses the file name plus the name of the enclosing directory.
fn classify_path(path: &Path, paths: &WatchPaths) -> Option<DataChangeEvent> {
    let same_file = |target: &Path| {
        if path.file_name() != target.file_name() {
            return false;
        }
        match target.parent().and_then(Path::file_name) {
            Some(dir_name) => path.parent().and_then(Path::file_name) == Some(dir_name),
            None => true,
        }
    };
    if same_file(&paths.projects) {
        Some(DataChangeEvent::Projects(path.to_path_buf()))
    } else if same_file(&paths.tasks) {
        Some(DataChangeEvent::Tasks(path.to_path_buf()))
    } else {
        None
    }
}
