//! Configuration types and structures.

use crate::normalize::DATE_NOT_RECORDED;
use crate::types::FilterState;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default port for the web dashboard.
pub const DEFAULT_UI_PORT: u16 = 31980;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from a single YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<()> {
        if encoding_rs::Encoding::for_label(self.data.encoding.trim().as_bytes()).is_none() {
            return Err(anyhow!("unknown data.encoding '{}'", self.data.encoding));
        }
        if self.server.ui.retry_multiplier < 1.0 {
            return Err(anyhow!(
                "server.ui.retry_multiplier must be >= 1.0, got {}",
                self.server.ui.retry_multiplier
            ));
        }
        Ok(())
    }
}

/// Where the two exports live and how to read them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Project export (CSV, optionally `.gz`).
    #[serde(default = "default_projects_path")]
    pub projects_path: PathBuf,

    /// Task export (CSV, optionally `.gz`).
    #[serde(default = "default_tasks_path")]
    pub tasks_path: PathBuf,

    /// Text encoding label understood by `encoding_rs`.
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Cell values treated as "no value".
    #[serde(default = "default_missing_values")]
    pub missing_values: Vec<String>,

    /// Literal the exports use for an unknown date.
    #[serde(default = "default_date_not_recorded")]
    pub date_not_recorded: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            projects_path: default_projects_path(),
            tasks_path: default_tasks_path(),
            encoding: default_encoding(),
            missing_values: default_missing_values(),
            date_not_recorded: default_date_not_recorded(),
        }
    }
}

fn default_projects_path() -> PathBuf {
    PathBuf::from("Project_Snip.csv")
}

fn default_tasks_path() -> PathBuf {
    PathBuf::from("Task_Snip.csv")
}

fn default_encoding() -> String {
    "ISO-8859-1".to_string()
}

fn default_missing_values() -> Vec<String> {
    vec!["n.a".to_string()]
}

fn default_date_not_recorded() -> String {
    DATE_NOT_RECORDED.to_string()
}

/// HTTP server settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub ui: UiConfig,

    /// Reload the exports when they change on disk.
    #[serde(default)]
    pub watch: bool,
}

/// UI configuration for the web dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Port for the web dashboard (default: 31980).
    #[serde(default = "default_ui_port")]
    pub port: u16,

    /// Initial retry delay in milliseconds when the port is busy (default: 5000).
    #[serde(default = "default_retry_initial_ms")]
    pub retry_initial_ms: u64,

    /// Maximum retry interval in milliseconds (default: 60000).
    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,

    /// Exponential backoff multiplier (default: 2.0).
    #[serde(default = "default_retry_multiplier")]
    pub retry_multiplier: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            port: default_ui_port(),
            retry_initial_ms: default_retry_initial_ms(),
            retry_max_ms: default_retry_max_ms(),
            retry_multiplier: default_retry_multiplier(),
        }
    }
}

fn default_ui_port() -> u16 {
    DEFAULT_UI_PORT
}

fn default_retry_initial_ms() -> u64 {
    5_000
}

fn default_retry_max_ms() -> u64 {
    60_000
}

fn default_retry_multiplier() -> f64 {
    2.0
}

/// Initial state of the visibility toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_projects: bool,

    #[serde(default = "default_true")]
    pub show_tasks: bool,

    /// Show tasks that have no project mapping.
    #[serde(default)]
    pub include_standalone: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_projects: true,
            show_tasks: true,
            include_standalone: false,
        }
    }
}

fn default_true() -> bool {
    true
}

impl DisplayConfig {
    /// Selection state a fresh session starts from.
    pub fn initial_filter(&self) -> FilterState {
        FilterState {
            show_projects: self.show_projects,
            show_tasks: self.show_tasks,
            include_standalone: self.include_standalone,
            ..FilterState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data.encoding, "ISO-8859-1");
        assert_eq!(config.data.missing_values, vec!["n.a".to_string()]);
        assert_eq!(config.server.ui.port, DEFAULT_UI_PORT);
        assert!(config.display.show_projects);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str(
            r#"
data:
  tasks_path: exports/tasks.csv.gz
display:
  show_projects: false
"#,
        )
        .unwrap();
        assert_eq!(config.data.tasks_path, PathBuf::from("exports/tasks.csv.gz"));
        assert_eq!(config.data.projects_path, PathBuf::from("Project_Snip.csv"));
        assert!(!config.display.show_projects);
        assert!(config.display.show_tasks);
    }

    #[test]
    fn test_validate_rejects_unknown_encoding() {
        let mut config = Config::default();
        config.data.encoding = "not-an-encoding".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_initial_filter_follows_display() {
        let display = DisplayConfig {
            show_projects: false,
            show_tasks: true,
            include_standalone: true,
        };
        let filter = display.initial_filter();
        assert!(!filter.show_projects);
        assert!(filter.include_standalone);
        assert!(filter.project.is_none());
    }
}
