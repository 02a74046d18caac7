//! Projects and Tasks Dashboard
//!
//! Loads a project export and a task export, then serves a two-pane filtered
//! view over HTTP or prints it from the command line.

use anyhow::{Context, Result};
use clap::Parser;
use project_dashboard::cli::options::OptionsArgs;
use project_dashboard::cli::view::ViewArgs;
use project_dashboard::cli::{Cli, Command, ServeArgs};
use project_dashboard::config::watcher::{WatchPaths, start_data_watcher};
use project_dashboard::config::{Config, ConfigLoader};
use project_dashboard::dashboard;
use project_dashboard::data::{Dataset, DatasetStore, build_view, filter_options};
use project_dashboard::format::{self, OutputFormat};
use project_dashboard::logging::{self, LogTarget};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Quiet period before a burst of file events triggers a reload.
const WATCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    // If explicit config path given, set it as env var for ConfigLoader to pick up
    // SAFETY: This is safe at program startup before any other threads are spawned
    if let Some(config_path) = &cli.config {
        unsafe {
            std::env::set_var("DASHBOARD_CONFIG_PATH", config_path);
        }
    }
    let mut loader = ConfigLoader::load()?;
    if let Some(path) = loader.config_path() {
        info!("Using config file {}", path.display());
    }

    let config = loader.config_mut();
    if let Some(projects) = &cli.projects {
        config.data.projects_path = projects.into();
    }
    if let Some(tasks) = &cli.tasks {
        config.data.tasks_path = tasks.into();
    }
    if let Some(encoding) = &cli.encoding {
        config.data.encoding = encoding.clone();
    }

    match cli.command {
        Some(Command::View(args)) => run_view(loader.config(), args)?,
        Some(Command::Options(args)) => run_options(loader.config(), args)?,
        Some(Command::Serve(args)) => run_server(loader.into_config(), args).await?,
        None => run_server(loader.into_config(), ServeArgs::default()).await?,
    }

    Ok(())
}

fn run_view(config: &Config, args: ViewArgs) -> Result<()> {
    config.validate()?;
    let dataset = Dataset::load(&config.data)?;
    let state = args.to_filter(&config.display);
    let view = build_view(&dataset, &state);

    let output = match OutputFormat::from(args.format) {
        OutputFormat::Json => format::to_json(&view)?,
        OutputFormat::Markdown => format::format_view_markdown(&view),
    };
    write_output(&output, args.output)
}

fn run_options(config: &Config, args: OptionsArgs) -> Result<()> {
    config.validate()?;
    let dataset = Dataset::load(&config.data)?;
    let options = filter_options(&dataset);

    let output = match OutputFormat::from(args.format) {
        OutputFormat::Json => format::to_json(&options)?,
        OutputFormat::Markdown => format::format_options_markdown(&options),
    };
    write_output(&output, args.output)
}

fn write_output(content: &str, path: Option<PathBuf>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

async fn run_server(mut config: Config, args: ServeArgs) -> Result<()> {
    if let Some(port) = args.port {
        config.server.ui.port = port;
    }
    let watch = args.watch || config.server.watch;
    config.validate()?;

    info!(
        "Starting project dashboard v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Projects: {:?}", config.data.projects_path);
    info!("Tasks: {:?}", config.data.tasks_path);

    let store = Arc::new(DatasetStore::load(config.data.clone())?);
    let display = Arc::new(config.display.clone());

    if watch {
        start_data_file_watcher(&store);
    }

    let handle = dashboard::start_server_with_retry(Arc::clone(&store), &config.server.ui, display);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    handle.shutdown();

    Ok(())
}

/// Watch both exports and reload the store on change.
///
/// If the watcher cannot start the server keeps serving the initial snapshot.
fn start_data_file_watcher(store: &Arc<DatasetStore>) {
    let paths = WatchPaths {
        projects: store.config().projects_path.clone(),
        tasks: store.config().tasks_path.clone(),
    };

    match start_data_watcher(paths, WATCH_DEBOUNCE) {
        Ok(mut handle) => {
            info!("Data file watcher started");
            let store = Arc::clone(store);

            tokio::spawn(async move {
                loop {
                    match handle.wait_for_change().await {
                        Some(event) => {
                            if event.requires_reload() {
                                info!("Data change detected: {:?}", event);
                                // A failed reload is logged and the old snapshot stays
                                let _ = store.reload();
                            }
                        }
                        None => {
                            info!("Data file watcher stopped");
                            break;
                        }
                    }
                }
            });
        }
        Err(e) => {
            warn!(
                "Failed to start data file watcher: {}. \
                 Dashboard will continue without reloading.",
                e
            );
        }
    }
}
