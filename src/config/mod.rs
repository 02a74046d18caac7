//! Unified configuration system.
//!
//! Consolidates configuration from three tiers with field-by-field YAML merging:
//! 1. **Defaults** - built into the binary
//! 2. **Project** - `$CWD/dashboard/config.yaml`
//! 3. **User** - `~/.project-dashboard/config.yaml` and environment variables
//!
//! ## Environment Variables
//! - `DASHBOARD_CONFIG_PATH` - Explicit config file (overrides all tiers)
//! - `DASHBOARD_PROJECTS_CSV` - Project export path
//! - `DASHBOARD_TASKS_CSV` - Task export path
//! - `DASHBOARD_ENCODING` - Text encoding label for both exports
//! - `DASHBOARD_USER_DIR` - User config dir (default: `~/.project-dashboard`)
//! - `DASHBOARD_PROJECT_DIR` - Project config dir (default: `./dashboard`)

mod loader;
mod merge;
mod types;
pub mod watcher;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::deep_merge;
pub use types::*;
